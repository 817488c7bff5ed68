//! Reprise choreographs the transition between a grid cell and a panel overlay.
//!
//! A click on a grid item sends a trail of transient copies of its image ("movers") along a
//! computed path toward the panel. Each mover reveals through a directional mask, holds, and
//! masks away again; the rest of the grid fades out with distance-based stagger, and finally
//! the panel reveals its content. The reverse run hides the panel and restores the grid.
//!
//! # Pipeline overview
//!
//! 1. **Plan**: [`synthesize`] places one [`MotionFrame`] per mover and [`stagger_delays`]
//!    spreads grid fades by distance from the clicked item.
//! 2. **Schedule**: [`Engine::forward`] / [`Engine::reverse`] turn the plan into [`Tween`]s and
//!    cues on a shared [`Timeline`], tagged with the session that owns them.
//! 3. **Drive**: the host calls [`Engine::tick`] (or [`Engine::tick_frame`]) from its frame
//!    clock; samples are written into the [`Scene`] and due cues run.
//! 4. **Render**: the host reads the [`Scene`] or its [`SceneSnapshot`] and draws it.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single flight**: one session at a time; concurrent requests collapse onto it.
//! - **Deterministic-by-default**: everything except wobble and rotation is a pure function of
//!   geometry and configuration, and those two draw from a seedable RNG.
//! - **Bounded cleanup**: every mover is gone by `forward_duration + cleanup_grace`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod config;
mod effects;
mod engine;
mod foundation;
mod motion;
mod stage;

pub use animation::ease::{Curve, Ease, EaseDir};
pub use animation::timeline::{Step, Timeline};
pub use animation::tween::{Channel, Sample, Target, Tween};
pub use config::model::{BlendMode, ConfigPatch, MAX_STEPS, TransitionConfig};
pub use config::presets::Preset;
pub use effects::mask::{ClipRegion, MaskPhase, RevealDirection, mask, phase};
pub use engine::completion::{Completion, Direction, TransitionOutcome};
pub use engine::orchestrator::{
    Engine, EngineState, ForwardRequest, HIDDEN_ITEM_SCALE, PanelSide, ReverseRequest,
};
pub use foundation::core::{
    ElementId, Fps, MotionFrame, MoverId, Point, Rect, Size, Vec2, rect_ltwh,
};
pub use foundation::error::{RepriseError, RepriseResult};
pub use foundation::math::{center, distance, is_left_half, lerp, lerp_point};
pub use motion::path::{PathMotion, PathParams, synthesize};
pub use motion::stagger::{stagger_delays, stagger_delays_sparse};
pub use stage::mover::{
    EXIT_SCALE, Mover, MoverContent, MoverPool, MoverPoolStats, MoverTiming, lifecycle_tweens,
};
pub use stage::scene::{
    ContentRef, Element, ElementRole, ElementSnapshot, MoverSnapshot, Scene, SceneSnapshot, Style,
};
