//! Cards: board instances, protocol definitions and the builtin catalog.
//!
//! ## Key Types
//!
//! - `Card`: one physical card (id, protocol, value, orientation, text)
//! - `CardEffects`: builtin text looked up by protocol and value, or a
//!   data-driven effect bundle
//! - `ProtocolDefinition`: a loadable custom protocol (six cards)
//! - `BuiltinRegistry`: handlers for builtin text

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{CardDefinition, ProtocolDefinition};
pub use instance::{Card, CardEffects};
pub use registry::{BuiltinEffect, BuiltinKey, BuiltinRegistry};
