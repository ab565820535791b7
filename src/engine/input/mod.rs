// Input handling system
//
// Virtual input channels for up to four local players. Game logic reads named
// axes and buttons; the keys, mouse axes and gamepad channels behind them can
// be rebound, persisted per device class and re-targeted as gamepads come
// and go.
//
// ## Architecture
//
// - `codec`: canonical names for mouse axes, joystick axes and pad buttons
// - `key`: physical key identifiers (keyboard, mouse, pad button)
// - `kind`: player slots, device classes and channel kinds
// - `source`: raw input collaborators and the frame-based `FrameInput`
// - `axis`: channel definition and per-channel state machine
// - `registry`: one player's name-keyed channel collection
// - `remap`: device slot correction and presence tracking
// - `capture`: polled "press something to rebind" state
// - `notify`: configuration-changed subscriptions
// - `persist`: config store and registry encoding
// - `presets`: stock layouts for players one and two
// - `settings`: host-level knobs loaded from JSON
// - `manager`: the `InputManager` tying everything together
//
// ## Usage Example
//
// ```rust
// use rusted_input::engine::input::{InputManager, PlayerId};
//
// let mut input = InputManager::new();
// input.add_digital_axis(PlayerId::One, "Horizontal", KeyCode::KeyD.into(), KeyCode::KeyA.into())?;
//
// // Once per frame, after feeding events into `input.source_mut()`
// input.tick(Instant::now());
// let x = input.get_axis(PlayerId::One, "Horizontal");
// input.source_mut().end_frame();
// ```

pub mod axis;
pub mod capture;
pub mod codec;
pub mod key;
pub mod kind;
pub mod manager;
pub mod notify;
pub mod persist;
pub mod presets;
pub mod registry;
pub mod remap;
pub mod settings;
pub mod source;

// Re-export commonly used types
pub use axis::{AxisDefinition, AxisRuntime, BindingSlot, ButtonState};
pub use capture::{CaptureFilter, Captured, RebindCapture};
pub use codec::{DeviceChannel, GamepadButton};
pub use key::Key;
pub use kind::{ChannelKind, DeviceClass, PlayerId, MAX_PLAYERS};
pub use manager::InputManager;
pub use notify::{ConfigurationListener, SubscriptionId};
pub use persist::{ConfigKey, ConfigStore, FileConfigStore, MemoryConfigStore};
pub use registry::PlayerAxisRegistry;
pub use remap::{PresenceEvent, PresenceTracker};
pub use settings::InputSettings;
pub use source::{DevicePresenceSource, FrameInput, RawInputSource};

/// Input configuration errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Channel name already in use: {0}")]
    DuplicateChannelName(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(u8),

    #[error("Invalid {what} index {index}: expected {min}..={max}")]
    InvalidDeviceIndex {
        what: &'static str,
        index: u32,
        min: u32,
        max: u32,
    },

    #[error("{kind} needs a {expected}, got {found}")]
    IncompatibleBinding {
        kind: ChannelKind,
        expected: &'static str,
        found: String,
    },

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Unknown name: {0}")]
    UnknownName(String),

    #[error("Config store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
