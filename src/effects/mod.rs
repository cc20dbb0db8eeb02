//! Card text and how it runs.
//!
//! - `EffectDef` / `EffectStep`: declarative text, one step per entry
//! - `TargetFilter` / `LaneRestriction`: what a step may touch
//! - `EffectContext` / `EffectSource`: who is acting, on whose behalf
//! - `Engine::execute_step`: interprets one step, suspending when the
//!   acting player has to choose
//!
//! The board primitives (delete, return, flip, shift, draw, discard, ...)
//! are `Engine` methods too; each one raises its reactive event and then
//! runs the chained follow-up of the step that called it.

mod context;
mod effect;
mod interpreter;
mod primitives;
mod targeting;

pub use context::{EffectContext, EffectSource};
pub use effect::{
    BoxSlot, Count, EffectBundle, EffectDef, EffectStep, EffectTrigger, FollowUp, FollowUpCondition,
    LaneRef, LaneSelector, ShiftTarget, ValueModifier, Whose,
};
pub use interpreter::StepResult;
pub use targeting::{
    candidates, legal_shift_lanes, FaceFilter, LaneFilter, LaneRestriction, OwnerFilter,
    PositionFilter, TargetFilter,
};
