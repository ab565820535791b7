// Player slots, device classes and channel kinds

use super::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of local players
pub const MAX_PLAYERS: usize = 4;

/// Identifies one of the four local player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
    Three,
    Four,
}

impl PlayerId {
    /// All player slots in order
    pub const ALL: [PlayerId; MAX_PLAYERS] =
        [PlayerId::One, PlayerId::Two, PlayerId::Three, PlayerId::Four];

    /// 1-based player number
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// 0-based index into per-player arrays
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
            PlayerId::Three => 2,
            PlayerId::Four => 3,
        }
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = InputError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1..=4 => Ok(Self::ALL[number as usize - 1]),
            _ => Err(InputError::UnknownPlayer(number)),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

/// Physical device family a player is currently using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceClass {
    #[default]
    Keyboard,
    Gamepad,
}

const DEVICE_CLASS_NAMES: [(&str, DeviceClass); 2] = [
    ("Keyboard", DeviceClass::Keyboard),
    ("Gamepad", DeviceClass::Gamepad),
];

impl DeviceClass {
    /// Name used in persisted config keys
    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::Keyboard => "Keyboard",
            DeviceClass::Gamepad => "Gamepad",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceClass {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&DEVICE_CLASS_NAMES, s)
    }
}

/// What a virtual channel reads and how it behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Keyboard, mouse or gamepad button read through key edges
    #[default]
    Button,
    /// Mouse movement delta
    MouseAxis,
    /// Two (or four) keys integrated into a smoothed axis
    DigitalAxis,
    /// Gamepad stick or trigger axis
    AnalogAxis,
    /// Gamepad axis debounced into a button
    AnalogButton,
}

const CHANNEL_KIND_NAMES: [(&str, ChannelKind); 5] = [
    ("Button", ChannelKind::Button),
    ("MouseAxis", ChannelKind::MouseAxis),
    ("DigitalAxis", ChannelKind::DigitalAxis),
    ("AnalogAxis", ChannelKind::AnalogAxis),
    ("AnalogButton", ChannelKind::AnalogButton),
];

impl ChannelKind {
    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Button => "Button",
            ChannelKind::MouseAxis => "MouseAxis",
            ChannelKind::DigitalAxis => "DigitalAxis",
            ChannelKind::AnalogAxis => "AnalogAxis",
            ChannelKind::AnalogButton => "AnalogButton",
        }
    }

    /// Whether this kind reads a named device channel (mouse or joystick axis)
    pub fn uses_device_channel(self) -> bool {
        matches!(
            self,
            ChannelKind::MouseAxis | ChannelKind::AnalogAxis | ChannelKind::AnalogButton
        )
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&CHANNEL_KIND_NAMES, s)
    }
}

/// Case-insensitive lookup in a static name table
fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Result<T, InputError> {
    table
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name.trim()))
        .map(|(_, value)| *value)
        .ok_or_else(|| InputError::UnknownName(name.to_string()))
}
