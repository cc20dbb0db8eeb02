//! The rules engine.
//!
//! [`Engine`] owns the configuration and the builtin catalog and exposes
//! the turn actions: play, refresh, compile, start and end of turn, and
//! answering a suspended question. Each returns a new board or an
//! [`IllegalMove`].

mod engine;
mod error;
mod executor;
mod turn;
pub mod values;

pub use engine::Engine;
pub use error::IllegalMove;
