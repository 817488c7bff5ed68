use crate::animation::ease::Ease;
use crate::animation::tween::{Channel, Target, Tween};
use crate::config::model::{BlendMode, TransitionConfig};
use crate::foundation::core::{MotionFrame, MoverId};
use crate::stage::scene::{ContentRef, Style};

/// Scale a mover shrinks to while exiting.
pub const EXIT_SCALE: f64 = 0.8;

/// What a mover displays.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum MoverContent {
    /// Snapshot of the source element's image.
    Image(ContentRef),
    /// Neutral placeholder used when the source had no resolvable content.
    Empty,
}

/// Transient proxy of the source content, placed at one motion frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Mover {
    /// Session that spawned the mover.
    pub session: u64,
    /// Visual payload.
    pub content: MoverContent,
    /// Placement.
    pub frame: MotionFrame,
    /// Animated style; starts fully masked and transparent.
    pub style: Style,
    /// Compositing mode.
    pub blend: Option<BlendMode>,
}

/// Counters for pool activity.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct MoverPoolStats {
    /// Movers currently in the visual tree.
    pub live: usize,
    /// Highest simultaneous live count.
    pub peak_live: usize,
    /// Total acquisitions.
    pub acquired: u64,
    /// Releases through a mover's own exit completion.
    pub released: u64,
    /// Releases performed by a cleanup sweep or an abort.
    pub forced: u64,
    /// Slots allocated beyond reuse of free slots.
    pub slots_allocated: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    mover: Option<Mover>,
}

/// Arena of live movers with explicit acquire/release.
///
/// Handles are generational: releasing a slot bumps its generation, so a stale [`MoverId`]
/// can never reach a mover acquired later into the same slot.
#[derive(Debug, Default)]
pub struct MoverPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    stats: MoverPoolStats,
}

impl MoverPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> MoverPoolStats {
        self.stats.clone()
    }

    /// Number of movers currently live.
    pub fn live_count(&self) -> usize {
        self.stats.live
    }

    /// Insert a mover into the visual tree.
    pub fn acquire(&mut self, mover: Mover) -> MoverId {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    mover: None,
                });
                self.stats.slots_allocated = self.stats.slots_allocated.saturating_add(1);
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.mover = Some(mover);
        self.stats.acquired = self.stats.acquired.saturating_add(1);
        self.stats.live += 1;
        self.stats.peak_live = self.stats.peak_live.max(self.stats.live);
        MoverId {
            index,
            generation: slot.generation,
        }
    }

    /// Remove a mover after its exit completes. Stale or already released ids return `None`.
    pub fn release(&mut self, id: MoverId) -> Option<Mover> {
        let mover = self.take(id)?;
        self.stats.released = self.stats.released.saturating_add(1);
        Some(mover)
    }

    /// Remove every live mover spawned by `session`; returns how many were removed.
    pub fn force_release_session(&mut self, session: u64) -> usize {
        let ids: Vec<MoverId> = self
            .iter()
            .filter(|(_, m)| m.session == session)
            .map(|(id, _)| id)
            .collect();
        for &id in &ids {
            self.take(id);
        }
        self.stats.forced = self.stats.forced.saturating_add(ids.len() as u64);
        ids.len()
    }

    /// Live mover behind `id`.
    pub fn get(&self, id: MoverId) -> Option<&Mover> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.mover.as_ref()
    }

    /// Mutable live mover behind `id`.
    pub fn get_mut(&mut self, id: MoverId) -> Option<&mut Mover> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.mover.as_mut()
    }

    /// Live movers in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (MoverId, &Mover)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.mover.as_ref().map(|m| {
                (
                    MoverId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    m,
                )
            })
        })
    }

    fn take(&mut self, id: MoverId) -> Option<Mover> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let mover = slot.mover.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.stats.live = self.stats.live.saturating_sub(1);
        Some(mover)
    }
}

/// Enter, hold and exit windows of one mover on the shared clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoverTiming {
    /// Absolute start of the enter phase.
    pub start: f64,
    /// Enter length.
    pub enter: f64,
    /// Hold length.
    pub hold: f64,
    /// Exit length.
    pub exit: f64,
    /// Enter ease.
    pub enter_ease: Ease,
    /// Exit ease.
    pub exit_ease: Ease,
}

impl MoverTiming {
    /// Timing for a mover starting at `start` under `cfg`.
    pub fn from_config(cfg: &TransitionConfig, start: f64) -> Self {
        Self {
            start,
            enter: cfg.step_duration,
            hold: cfg.mover_pause_before_exit,
            exit: cfg.step_duration,
            enter_ease: cfg.mover_enter_ease,
            exit_ease: cfg.mover_exit_ease,
        }
    }

    /// Absolute start of the exit phase.
    pub fn exit_start(&self) -> f64 {
        self.start + self.enter + self.hold
    }

    /// Absolute time the exit completes and the mover is released.
    pub fn release_at(&self) -> f64 {
        self.exit_start() + self.exit
    }
}

/// Tweens driving one mover through enter (mask `from -> reveal`, opacity up, rotation
/// settling to zero), hold, and exit (mask back to `from`, opacity down, shrink).
pub fn lifecycle_tweens(id: MoverId, timing: &MoverTiming, rotation_deg: f64) -> Vec<Tween> {
    let target = Target::Mover(id);
    let enter = |channel, from, to| {
        Tween::new(target, channel, from, to)
            .at(timing.start, timing.enter)
            .eased(timing.enter_ease)
    };
    let exit = |channel, from, to| {
        Tween::new(target, channel, from, to)
            .at(timing.exit_start(), timing.exit)
            .eased(timing.exit_ease)
    };

    let mut tweens = vec![enter(Channel::Opacity, 0.0, 1.0), enter(Channel::Reveal, 0.0, 1.0)];
    if rotation_deg != 0.0 {
        tweens.push(enter(Channel::Rotation, rotation_deg, 0.0));
    }
    tweens.extend([
        exit(Channel::Opacity, 1.0, 0.0),
        exit(Channel::Reveal, 1.0, 0.0),
        exit(Channel::Scale, 1.0, EXIT_SCALE),
    ]);
    tweens
}

#[cfg(test)]
#[path = "../../tests/unit/stage/mover.rs"]
mod tests;
