//! Walk-game engine.
//!
//! The tier is chosen once per session from the previous session's tier and
//! result. Only a loss at the hardest tier consults the generator, which may
//! also recommend a one-off ball speed for the next session.

pub mod engine;
pub mod plan;
pub mod result;
pub mod transition;

pub use engine::{WalkDecision, WalkEngine};
pub use plan::{BallColor, SessionPlan, baseline, plan_session};
pub use result::WalkSessionResult;
pub use transition::{Transition, fallback_tier, transition};
