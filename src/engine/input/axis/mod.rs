// Virtual channels: persisted definition plus runtime state machine

pub mod definition;
pub mod runtime;

pub use definition::{defaults, AxisDefinition, BindingSlot};
pub use runtime::{AxisRuntime, ButtonState};
