//! Remappable multiplayer virtual input.
//!
//! Game logic reads named axes and buttons per player through
//! [`engine::input::InputManager`], while the physical keys, mouse axes and
//! gamepad channels behind them can be rebound, persisted and re-targeted
//! as gamepads come and go.

pub mod core;
pub mod engine;
