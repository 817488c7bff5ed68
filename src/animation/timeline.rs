//! Shared animation clock with scheduled continuations.
//!
//! A [`Timeline`] owns a monotonically advancing clock, a set of [`Tween`]s, and a queue of
//! cues (opaque actions fired once the clock passes their time). Nothing blocks: callers
//! advance the clock by a delta and receive the property writes and fired cues for that step.
//!
//! # Invariants
//!
//! 1. Cues are kept sorted by `(at, insertion order)`; equal-time cues fire in the order
//!    they were scheduled.
//! 2. Within one [`Timeline::advance`], tween samples are produced before cues fire.
//! 3. A tween emits its final value exactly once, on the first step where the clock
//!    reaches its end, and is then dropped.
//! 4. Every tween and cue carries a tag; [`Timeline::cancel`] and [`Timeline::settle`]
//!    act on a single tag without disturbing others.

use crate::animation::tween::{Sample, Tween};

#[derive(Clone, Debug)]
struct TweenSlot {
    tag: u64,
    tween: Tween,
}

#[derive(Clone, Debug)]
struct CueSlot<A> {
    tag: u64,
    at: f64,
    action: A,
}

/// Output of one clock step.
#[derive(Debug)]
pub struct Step<A> {
    /// Property writes, in tween insertion order.
    pub samples: Vec<Sample>,
    /// Cues whose time was reached, in schedule order.
    pub fired: Vec<A>,
}

/// Single-threaded animation clock.
#[derive(Debug)]
pub struct Timeline<A> {
    now: f64,
    tweens: Vec<TweenSlot>,
    cues: Vec<CueSlot<A>>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Timeline<A> {
    /// Empty timeline at time zero.
    pub fn new() -> Self {
        Self {
            now: 0.0,
            tweens: Vec::new(),
            cues: Vec::new(),
        }
    }

    /// Current clock time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule a tween. Its `start` is absolute clock time.
    pub fn add_tween(&mut self, tag: u64, tween: Tween) {
        self.tweens.push(TweenSlot { tag, tween });
    }

    /// Schedule `action` to fire once the clock reaches `at`.
    pub fn add_cue(&mut self, tag: u64, at: f64, action: A) {
        let idx = self.cues.partition_point(|c| c.at <= at);
        self.cues.insert(idx, CueSlot { tag, at, action });
    }

    /// Number of tweens not yet finished.
    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    /// Number of cues not yet fired.
    pub fn pending_cues(&self) -> usize {
        self.cues.len()
    }

    /// Latest end time over everything still scheduled, or `now` when empty.
    pub fn horizon(&self) -> f64 {
        let tween_end = self.tweens.iter().map(|s| s.tween.end());
        let cue_end = self.cues.iter().map(|c| c.at);
        tween_end.chain(cue_end).fold(self.now, f64::max)
    }

    /// Advance the clock by `dt` seconds. Negative or non-finite deltas do not move the clock
    /// but still flush anything already due.
    pub fn advance(&mut self, dt: f64) -> Step<A> {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
        let now = self.now;

        let mut samples = Vec::new();
        self.tweens.retain(|slot| {
            let tw = &slot.tween;
            if tw.start > now {
                return true;
            }
            samples.push(Sample {
                target: tw.target,
                channel: tw.channel,
                value: tw.value_at(now),
            });
            now < tw.end()
        });

        let due = self.cues.partition_point(|c| c.at <= now);
        let fired = self.cues.drain(..due).map(|c| c.action).collect();

        Step { samples, fired }
    }

    /// Snap every tween tagged `tag` to its end value and drop it. Cues are left alone.
    pub fn settle(&mut self, tag: u64) -> Vec<Sample> {
        let mut samples = Vec::new();
        self.tweens.retain(|slot| {
            if slot.tag != tag {
                return true;
            }
            samples.push(Sample {
                target: slot.tween.target,
                channel: slot.tween.channel,
                value: slot.tween.to,
            });
            false
        });
        samples
    }

    /// Drop every tween and cue tagged `tag` without applying them.
    pub fn cancel(&mut self, tag: u64) {
        self.tweens.retain(|s| s.tag != tag);
        self.cues.retain(|c| c.tag != tag);
    }

    /// Keep only the cues for which `keep` returns true.
    pub fn retain_cues(&mut self, mut keep: impl FnMut(&A) -> bool) {
        self.cues.retain(|c| keep(&c.action));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
