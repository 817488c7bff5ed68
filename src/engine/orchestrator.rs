//! Transition orchestrator.
//!
//! An [`Engine`] sequences path synthesis, stagger delays, mover lifecycles and panel masking
//! onto one [`Timeline`], and guards it with a single-flight session.
//!
//! # Invariants
//!
//! 1. At most one session is open. It is opened synchronously when a request is accepted and
//!    closed only by its own completion cue or by an abort.
//! 2. A request that arrives while a session is open starts nothing and returns the open
//!    session's [`Completion`].
//! 3. Every mover a session acquires is released by its exit cue, or at the latest by the
//!    session's sweep cue at `forward_duration + cleanup_grace`.
//! 4. A session whose panel leaves the scene is aborted on the next tick: its tweens and cues
//!    are dropped and its movers released.
//! 5. Grid styles are saved by the first forward run after a completed reverse and survive
//!    further forward runs and aborts until a reverse completes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::animation::ease::Ease;
use crate::animation::timeline::Timeline;
use crate::animation::tween::{Channel, Target, Tween};
use crate::config::model::{ConfigPatch, TransitionConfig};
use crate::effects::mask::RevealDirection;
use crate::engine::completion::{Completion, Direction, TransitionOutcome};
use crate::foundation::core::{ElementId, Fps, MoverId, Rect};
use crate::foundation::error::{RepriseError, RepriseResult};
use crate::foundation::math::is_left_half;
use crate::motion::path::synthesize;
use crate::motion::stagger::stagger_delays_sparse;
use crate::stage::mover::{Mover, MoverContent, MoverTiming, lifecycle_tweens};
use crate::stage::scene::{ElementRole, Scene, Style};

/// Scale grid items shrink to while the panel is open.
pub const HIDDEN_ITEM_SCALE: f64 = 0.8;

/// Observable engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EngineState {
    /// No session open.
    Idle,
    /// A grid-to-panel session is open.
    RunningForward,
    /// A panel-to-grid session is open.
    RunningReverse,
}

/// Viewport half the panel occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelSide {
    /// Left half.
    Left,
    /// Right half.
    Right,
}

impl PanelSide {
    /// Side opposite the half that contains `source`.
    pub fn facing(source: Rect, viewport_width: f64) -> Self {
        if is_left_half(source, viewport_width) {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// Horizontal reveal direction that sweeps away from the clicked side.
    pub fn reveal_direction(self) -> RevealDirection {
        match self {
            Self::Right => RevealDirection::LeftRight,
            Self::Left => RevealDirection::RightLeft,
        }
    }
}

/// Elements taking part in a grid-to-panel transition.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardRequest {
    /// The clicked grid item.
    pub source: ElementId,
    /// The panel overlay.
    pub panel: ElementId,
    /// Slot inside the panel that receives the revealed content.
    pub content_slot: ElementId,
    /// Every grid item, the clicked one included.
    pub grid_items: Vec<ElementId>,
    /// Companion chrome faded out alongside.
    pub chrome: Vec<ElementId>,
}

impl ForwardRequest {
    /// Request with no grid items or chrome.
    pub fn new(source: ElementId, panel: ElementId, content_slot: ElementId) -> Self {
        Self {
            source,
            panel,
            content_slot,
            grid_items: Vec::new(),
            chrome: Vec::new(),
        }
    }

    /// Set the grid items.
    pub fn with_grid_items(mut self, items: Vec<ElementId>) -> Self {
        self.grid_items = items;
        self
    }

    /// Set the chrome.
    pub fn with_chrome(mut self, chrome: Vec<ElementId>) -> Self {
        self.chrome = chrome;
        self
    }

    /// Build a request from element roles: the first panel and panel content, every grid
    /// item, every chrome element.
    pub fn from_roles(scene: &Scene, source: ElementId) -> RepriseResult<Self> {
        let first = |role: ElementRole| {
            scene
                .ids_with_role(role)
                .first()
                .copied()
                .ok_or_else(|| RepriseError::validation(format!("scene has no {role:?} element")))
        };
        Ok(Self::new(source, first(ElementRole::Panel)?, first(ElementRole::PanelContent)?)
            .with_grid_items(scene.ids_with_role(ElementRole::GridItem))
            .with_chrome(scene.ids_with_role(ElementRole::Chrome)))
    }
}

/// Elements taking part in a panel-to-grid transition.
#[derive(Clone, Debug, PartialEq)]
pub struct ReverseRequest {
    /// The panel overlay.
    pub panel: ElementId,
    /// Slot inside the panel holding the revealed content.
    pub content_slot: ElementId,
    /// Grid items to restore.
    pub grid_items: Vec<ElementId>,
    /// Companion chrome faded back in.
    pub chrome: Vec<ElementId>,
}

impl From<&ForwardRequest> for ReverseRequest {
    fn from(fwd: &ForwardRequest) -> Self {
        Self {
            panel: fwd.panel,
            content_slot: fwd.content_slot,
            grid_items: fwd.grid_items.clone(),
            chrome: fwd.chrome.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Action {
    ReleaseMover(MoverId),
    Sweep(u64),
    SetInteractive(ElementId, bool),
    Hide(ElementId),
    Complete(u64),
}

#[derive(Debug)]
struct Session {
    id: u64,
    direction: Direction,
    started_at: f64,
    watch: ElementId,
    completion: Completion,
}

/// Single-flight transition engine driven by an external clock.
#[derive(Debug)]
pub struct Engine {
    config: TransitionConfig,
    timeline: Timeline<Action>,
    session: Option<Session>,
    next_session: u64,
    rng: SmallRng,
    last_reference: Option<ElementId>,
    saved_grid: Vec<(ElementId, Style)>,
    panel_side: Option<PanelSide>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(TransitionConfig::default(), SmallRng::from_os_rng())
    }
}

impl Engine {
    /// Engine with OS-seeded randomness for wobble and rotation.
    pub fn new(config: TransitionConfig) -> RepriseResult<Self> {
        config.validate()?;
        Ok(Self::build(config, SmallRng::from_os_rng()))
    }

    /// Engine with reproducible randomness.
    pub fn with_seed(config: TransitionConfig, seed: u64) -> RepriseResult<Self> {
        config.validate()?;
        Ok(Self::build(config, SmallRng::seed_from_u64(seed)))
    }

    fn build(config: TransitionConfig, rng: SmallRng) -> Self {
        Self {
            config,
            timeline: Timeline::new(),
            session: None,
            next_session: 0,
            rng,
            last_reference: None,
            saved_grid: Vec::new(),
            panel_side: None,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Merge `patch` into the configuration. An open session keeps the config it started with.
    pub fn update_config(&mut self, patch: &ConfigPatch) -> RepriseResult<()> {
        self.config = self.config.merged(patch)?;
        debug!(?patch, "configuration updated");
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        match self.session.as_ref().map(|s| s.direction) {
            None => EngineState::Idle,
            Some(Direction::Forward) => EngineState::RunningForward,
            Some(Direction::Reverse) => EngineState::RunningReverse,
        }
    }

    /// Whether a session is open.
    pub fn is_busy(&self) -> bool {
        self.session.is_some()
    }

    /// Completion of the open session.
    pub fn in_flight(&self) -> Option<Completion> {
        self.session.as_ref().map(|s| s.completion.clone())
    }

    /// Panel side chosen by the most recent forward run.
    pub fn panel_side(&self) -> Option<PanelSide> {
        self.panel_side
    }

    /// Clock time in seconds.
    pub fn now(&self) -> f64 {
        self.timeline.now()
    }

    /// Nothing open and nothing scheduled.
    pub fn is_quiet(&self) -> bool {
        self.session.is_none()
            && self.timeline.active_tweens() == 0
            && self.timeline.pending_cues() == 0
    }

    #[tracing::instrument(skip(self, scene, req), fields(source = req.source.0))]
    /// Start a grid-to-panel transition.
    pub fn forward(&mut self, scene: &mut Scene, req: &ForwardRequest) -> Completion {
        if let Some(busy) = self.busy(Direction::Forward) {
            return busy;
        }
        let (Some(source_rect), Some(panel_rect)) = (scene.rect(req.source), scene.rect(req.panel))
        else {
            return skipped(
                Direction::Forward,
                RepriseError::geometry("forward needs laid-out source and panel rectangles"),
            );
        };

        let cfg = self.config.clone();
        let (id, completion) = self.open(Direction::Forward, req.panel);
        let t0 = self.timeline.now();
        let sd = cfg.step_duration;

        let side = PanelSide::facing(source_rect, scene.viewport().width);
        self.panel_side = Some(side);
        let dir = if cfg.auto_adjust_horizontal_clip_path {
            side.reveal_direction()
        } else {
            cfg.clip_path_direction
        };

        if let Some(p) = scene.style_mut(req.panel) {
            p.opacity = 1.0;
            p.reveal = 0.0;
            p.reveal_dir = dir;
            p.interactive = true;
        }
        if let Some(c) = scene.style_mut(req.content_slot) {
            c.opacity = 0.0;
            c.interactive = false;
        }

        for &c in &req.chrome {
            self.tween_to(scene, id, c, Channel::Opacity, 0.0, t0, sd, cfg.grid_item_ease);
        }

        // Items already saved keep the style they had before the first unrestored forward.
        for &g in &req.grid_items {
            if self.saved_grid.iter().any(|(saved, _)| *saved == g) {
                continue;
            }
            if let Some(s) = scene.style(g) {
                self.saved_grid.push((g, *s));
            }
        }
        let rects: Vec<Option<Rect>> = req.grid_items.iter().map(|&g| scene.rect(g)).collect();
        let delays = stagger_delays_sparse(Some(source_rect), &rects, cfg.grid_item_stagger_factor);
        for (&g, delay) in req.grid_items.iter().zip(delays) {
            if let Some(s) = scene.style_mut(g) {
                s.interactive = false;
            }
            if g == req.source {
                continue;
            }
            let start = t0 + delay;
            self.tween_to(scene, id, g, Channel::Opacity, 0.0, start, sd, cfg.grid_item_ease);
            self.tween_to(scene, id, g, Channel::Scale, HIDDEN_ITEM_SCALE, start, sd, cfg.grid_item_ease);
        }

        if let Some(s) = scene.style_mut(req.source) {
            s.reveal_dir = dir;
            s.interactive = false;
        }
        let clicked = cfg.clicked_item_duration();
        for channel in [Channel::Opacity, Channel::Reveal] {
            self.tween_to(scene, id, req.source, channel, 0.0, t0, clicked, cfg.grid_item_ease);
        }

        self.spawn_movers(scene, &cfg, id, t0, source_rect, panel_rect, req.source, dir);

        let reveal = cfg.panel_reveal_duration();
        self.timeline.add_tween(
            id,
            Tween::new(Target::Element(req.panel), Channel::Reveal, 0.0, 1.0)
                .at(t0 + cfg.panel_reveal_start(), reveal)
                .eased(cfg.panel_reveal_ease),
        );

        // Content fades in over the tail of the reveal and lands with it.
        let end = t0 + cfg.forward_duration();
        let fade = sd.min(reveal);
        self.timeline.add_tween(
            id,
            Tween::new(Target::Element(req.content_slot), Channel::Opacity, 0.0, 1.0)
                .at(end - fade, fade)
                .eased(cfg.grid_item_ease),
        );
        self.timeline
            .add_cue(id, end, Action::SetInteractive(req.content_slot, true));
        self.timeline.add_cue(id, end, Action::Complete(id));
        self.timeline
            .add_cue(id, end + cfg.cleanup_grace, Action::Sweep(id));

        self.last_reference = Some(req.source);
        info!(
            session = id,
            movers = cfg.steps,
            ?side,
            direction = %dir,
            duration = cfg.forward_duration(),
            "forward transition started"
        );
        completion
    }

    #[tracing::instrument(skip(self, scene, req), fields(panel = req.panel.0))]
    /// Start a panel-to-grid transition.
    pub fn reverse(&mut self, scene: &mut Scene, req: &ReverseRequest) -> Completion {
        if let Some(busy) = self.busy(Direction::Reverse) {
            return busy;
        }
        if scene.rect(req.panel).is_none() {
            return skipped(
                Direction::Reverse,
                RepriseError::geometry("reverse needs a laid-out panel rectangle"),
            );
        }

        let cfg = self.config.clone();
        let (id, completion) = self.open(Direction::Reverse, req.panel);
        let t0 = self.timeline.now();
        let sd = cfg.step_duration;
        let hide = cfg.panel_reveal_duration();

        self.tween_to(scene, id, req.panel, Channel::Reveal, 0.0, t0, hide, cfg.panel_reveal_ease);
        self.timeline.add_cue(id, t0 + hide, Action::Hide(req.panel));

        if let Some(c) = scene.style_mut(req.content_slot) {
            c.interactive = false;
        }
        self.tween_to(
            scene,
            id,
            req.content_slot,
            Channel::Opacity,
            0.0,
            t0,
            sd.min(hide),
            cfg.grid_item_ease,
        );
        for &c in &req.chrome {
            self.tween_to(scene, id, c, Channel::Opacity, 1.0, t0, sd, cfg.grid_item_ease);
        }

        let reference = self.last_reference.and_then(|r| scene.rect(r));
        if reference.is_none() {
            debug!(session = id, "no previous reference element, grid restores without stagger");
        }
        let rects: Vec<Option<Rect>> = req.grid_items.iter().map(|&g| scene.rect(g)).collect();
        let delays = stagger_delays_sparse(reference, &rects, cfg.grid_item_stagger_factor);
        let end = t0 + cfg.reverse_duration();
        for (&g, delay) in req.grid_items.iter().zip(delays) {
            let target = self
                .saved_grid
                .iter()
                .find(|(saved, _)| *saved == g)
                .map(|(_, style)| *style)
                .unwrap_or_default();
            let start = t0 + hide + delay;
            for channel in [Channel::Opacity, Channel::Scale, Channel::Reveal] {
                let to = target.read(channel);
                self.tween_to(scene, id, g, channel, to, start, sd, cfg.grid_item_ease);
            }
            self.timeline
                .add_cue(id, end, Action::SetInteractive(g, target.interactive));
        }
        self.timeline.add_cue(id, end, Action::Complete(id));

        info!(
            session = id,
            items = req.grid_items.len(),
            duration = cfg.reverse_duration(),
            "reverse transition started"
        );
        completion
    }

    /// Advance the clock by `dt` seconds and apply everything due.
    ///
    /// Returns the outcome of a session that finished during this step.
    pub fn tick(&mut self, scene: &mut Scene, dt: f64) -> Option<TransitionOutcome> {
        if let Some(watch) = self.session.as_ref().map(|s| s.watch)
            && !scene.is_attached(watch)
        {
            return self.abort(
                scene,
                RepriseError::detached(format!("element {} left the scene", watch.0)),
            );
        }

        let step = self.timeline.advance(dt);
        for sample in &step.samples {
            scene.apply(sample);
        }

        let mut outcome = None;
        for action in step.fired {
            match action {
                Action::ReleaseMover(m) => {
                    if scene.movers_mut().release(m).is_none() {
                        debug!(?m, "mover already released");
                    }
                }
                Action::Sweep(session) => {
                    let released = scene.movers_mut().force_release_session(session);
                    if released > 0 {
                        warn!(session, released, "cleanup sweep removed leftover movers");
                    }
                }
                Action::SetInteractive(e, on) => {
                    if let Some(s) = scene.style_mut(e) {
                        s.interactive = on;
                    }
                }
                Action::Hide(e) => {
                    if let Some(s) = scene.style_mut(e) {
                        s.opacity = 0.0;
                        s.interactive = false;
                    }
                }
                Action::Complete(session) => {
                    if let Some(done) = self.complete(scene, session) {
                        outcome = Some(done);
                    }
                }
            }
        }
        outcome
    }

    /// Advance by one frame at `fps`.
    pub fn tick_frame(&mut self, scene: &mut Scene, fps: Fps) -> Option<TransitionOutcome> {
        self.tick(scene, fps.frame_duration_secs())
    }

    /// Tick at `fps` until nothing is open or scheduled; returns the outcomes seen on the way.
    pub fn run_until_quiet(&mut self, scene: &mut Scene, fps: Fps) -> Vec<TransitionOutcome> {
        let mut outcomes = Vec::new();
        let frames = fps.secs_to_frames_ceil(self.timeline.horizon() - self.timeline.now());
        for _ in 0..frames {
            if self.is_quiet() {
                return outcomes;
            }
            outcomes.extend(self.tick_frame(scene, fps));
        }
        if !self.is_quiet() {
            let rest = self.timeline.horizon() - self.timeline.now();
            outcomes.extend(self.tick(scene, rest));
        }
        outcomes
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_movers(
        &mut self,
        scene: &mut Scene,
        cfg: &TransitionConfig,
        session: u64,
        t0: f64,
        from: Rect,
        to: Rect,
        source: ElementId,
        dir: RevealDirection,
    ) {
        let frames = synthesize(from, to, cfg.steps as usize, &cfg.path_params(), &mut self.rng);
        if frames.is_empty() {
            return;
        }
        let content = match scene.content(source) {
            Some(c) => MoverContent::Image(c.clone()),
            None => {
                warn!(session, "source has no content, movers use an empty placeholder");
                MoverContent::Empty
            }
        };

        for (i, frame) in frames.into_iter().enumerate() {
            let rotation = if cfg.rotation_range > 0.0 {
                self.rng
                    .random_range(-cfg.rotation_range..=cfg.rotation_range)
            } else {
                0.0
            };
            let mover = scene.movers_mut().acquire(Mover {
                session,
                content: content.clone(),
                frame,
                style: Style {
                    rotation,
                    reveal_dir: dir,
                    ..Style::hidden()
                },
                blend: cfg.mover_blend_mode,
            });
            let timing = MoverTiming::from_config(cfg, t0 + i as f64 * cfg.step_interval);
            for tween in lifecycle_tweens(mover, &timing, rotation) {
                self.timeline.add_tween(session, tween);
            }
            self.timeline
                .add_cue(session, timing.release_at(), Action::ReleaseMover(mover));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn tween_to(
        &mut self,
        scene: &Scene,
        tag: u64,
        id: ElementId,
        channel: Channel,
        to: f64,
        start: f64,
        duration: f64,
        ease: Ease,
    ) {
        let Some(style) = scene.style(id) else {
            return;
        };
        let tween = Tween::new(Target::Element(id), channel, style.read(channel), to)
            .at(start, duration)
            .eased(ease);
        self.timeline.add_tween(tag, tween);
    }

    fn busy(&self, requested: Direction) -> Option<Completion> {
        let s = self.session.as_ref()?;
        debug!(
            ?requested,
            running = ?s.direction,
            session = s.id,
            "transition in flight, request ignored"
        );
        Some(s.completion.clone())
    }

    fn open(&mut self, direction: Direction, watch: ElementId) -> (u64, Completion) {
        self.next_session += 1;
        let completion = Completion::pending();
        self.session = Some(Session {
            id: self.next_session,
            direction,
            started_at: self.timeline.now(),
            watch,
            completion: completion.clone(),
        });
        (self.next_session, completion)
    }

    fn complete(&mut self, scene: &mut Scene, session: u64) -> Option<TransitionOutcome> {
        let s = self.session.take_if(|s| s.id == session)?;
        for sample in self.timeline.settle(s.id) {
            scene.apply(&sample);
        }
        if s.direction == Direction::Reverse {
            self.saved_grid.clear();
        }
        let outcome = TransitionOutcome::Completed {
            direction: s.direction,
            session: s.id,
            duration: self.timeline.now() - s.started_at,
        };
        info!(session = s.id, direction = ?s.direction, "transition completed");
        s.completion.resolve(outcome.clone());
        Some(outcome)
    }

    fn abort(&mut self, scene: &mut Scene, err: RepriseError) -> Option<TransitionOutcome> {
        let s = self.session.take()?;
        self.timeline.cancel(s.id);
        let released = scene.movers_mut().force_release_session(s.id);
        warn!(
            session = s.id,
            direction = ?s.direction,
            released,
            error = %err,
            "transition aborted"
        );
        let outcome = TransitionOutcome::Aborted {
            direction: s.direction,
            session: s.id,
            reason: err.to_string(),
        };
        s.completion.resolve(outcome.clone());
        Some(outcome)
    }
}

fn skipped(direction: Direction, err: RepriseError) -> Completion {
    warn!(?direction, error = %err, "transition skipped");
    Completion::resolved(TransitionOutcome::Skipped {
        direction,
        reason: err.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/engine/orchestrator.rs"]
mod tests;
