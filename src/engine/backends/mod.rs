// Host backends feeding raw device state into `FrameInput`

pub mod window;

#[cfg(feature = "gamepad")]
pub mod gamepad;
