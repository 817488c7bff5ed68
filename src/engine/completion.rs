use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use serde::Serialize;

/// Which way a transition runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Grid cell toward panel.
    Forward,
    /// Panel back toward grid.
    Reverse,
}

/// How a transition request ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransitionOutcome {
    /// The full choreography ran.
    Completed {
        /// Direction of the session.
        direction: Direction,
        /// Session id.
        session: u64,
        /// Clock time from acceptance to completion.
        duration: f64,
    },
    /// The request was never started.
    Skipped {
        /// Requested direction.
        direction: Direction,
        /// Why it was skipped.
        reason: String,
    },
    /// The session stopped early and its remaining work was dropped.
    Aborted {
        /// Direction of the session.
        direction: Direction,
        /// Session id.
        session: u64,
        /// Why it stopped.
        reason: String,
    },
}

impl TransitionOutcome {
    /// Direction the outcome refers to.
    pub fn direction(&self) -> Direction {
        match self {
            Self::Completed { direction, .. }
            | Self::Skipped { direction, .. }
            | Self::Aborted { direction, .. } => *direction,
        }
    }

    /// Whether the choreography ran to the end.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Debug, Default)]
struct Shared {
    outcome: Option<TransitionOutcome>,
    wakers: Vec<Waker>,
}

/// Completion signal of one transition request.
///
/// Clones observe the same session; it resolves exactly once. Awaiting it yields the
/// [`TransitionOutcome`]. The signal is driven by the engine's clock, so an executor only
/// makes progress if something keeps calling [`crate::Engine::tick`].
#[derive(Clone, Debug, Default)]
pub struct Completion {
    shared: Rc<RefCell<Shared>>,
}

impl Completion {
    pub(crate) fn pending() -> Self {
        Self::default()
    }

    pub(crate) fn resolved(outcome: TransitionOutcome) -> Self {
        let c = Self::pending();
        c.resolve(outcome);
        c
    }

    /// First call wins; later calls return `false` and change nothing.
    pub(crate) fn resolve(&self, outcome: TransitionOutcome) -> bool {
        let wakers = {
            let mut shared = self.shared.borrow_mut();
            if shared.outcome.is_some() {
                return false;
            }
            shared.outcome = Some(outcome);
            std::mem::take(&mut shared.wakers)
        };
        for w in wakers {
            w.wake();
        }
        true
    }

    /// Whether the outcome is known.
    pub fn is_resolved(&self) -> bool {
        self.shared.borrow().outcome.is_some()
    }

    /// The outcome, once resolved.
    pub fn outcome(&self) -> Option<TransitionOutcome> {
        self.shared.borrow().outcome.clone()
    }

    /// Whether two handles observe the same request.
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Future for Completion {
    type Output = TransitionOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut shared = self.shared.borrow_mut();
        if let Some(outcome) = &shared.outcome {
            return Poll::Ready(outcome.clone());
        }
        if !shared.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            shared.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/completion.rs"]
mod tests;
