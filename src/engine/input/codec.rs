// Device index codec
//
// Canonical identifiers for mouse axes, joystick axes and joystick buttons,
// plus the (device slot, channel index) math used to re-target them.
//
// - Mouse axes are named `Mouse_Axis_<i>` with `i` in [0, 2].
// - Joystick axes are named `Joy_<slot>_Axis_<n>` where `n` is the zero-based
//   suffix of axis number `n + 1` in [1, 28] and `slot` is in [1, 4].
// - Joystick buttons live in one global code space: pad `slot` button `b`
//   is code `350 + (slot - 1) * 20 + b`, so four pads span 80 codes.

use super::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of mouse axes (x, y, wheel)
pub const MAX_MOUSE_AXES: u8 = 3;

/// Axes exposed per joystick
pub const MAX_JOYSTICK_AXES: u8 = 28;

/// Joysticks addressable by device slot
pub const MAX_JOYSTICKS: u8 = 4;

/// Code of the first button of the first pad
pub const FIRST_PAD_BUTTON: u16 = 350;

/// Buttons addressable per pad
pub const BUTTONS_PER_PAD: u16 = 20;

/// Size of the global pad button code space
pub const TOTAL_PAD_BUTTONS: u16 = BUTTONS_PER_PAD * MAX_JOYSTICKS as u16;

const MOUSE_PREFIX: &str = "Mouse_Axis_";
const JOY_PREFIX: &str = "Joy_";
const JOY_AXIS_INFIX: &str = "_Axis_";
const BUTTON_PREFIX: &str = "Joystick";
const BUTTON_INFIX: &str = "Button";

/// Whether a device channel is a mouse axis or a joystick axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelClass {
    Mouse,
    Joystick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Channel {
    Mouse { axis: u8 },
    Joystick { slot: u8, axis: u8 },
}

/// A named raw axis source: one mouse axis or one axis of one joystick
///
/// Always holds in-range indices; construct through [`mouse_axis`],
/// [`joystick_axis`] or by parsing a canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceChannel(Channel);

impl DeviceChannel {
    pub fn class(&self) -> ChannelClass {
        match self.0 {
            Channel::Mouse { .. } => ChannelClass::Mouse,
            Channel::Joystick { .. } => ChannelClass::Joystick,
        }
    }

    pub fn is_joystick(&self) -> bool {
        self.class() == ChannelClass::Joystick
    }

    pub fn is_mouse(&self) -> bool {
        self.class() == ChannelClass::Mouse
    }

    /// Device slot for joystick axes
    pub fn slot(&self) -> Option<u8> {
        match self.0 {
            Channel::Mouse { .. } => None,
            Channel::Joystick { slot, .. } => Some(slot),
        }
    }

    /// Mouse axis in [0, 2] or joystick axis number in [1, 28]
    pub fn index(&self) -> u8 {
        match self.0 {
            Channel::Mouse { axis } | Channel::Joystick { axis, .. } => axis,
        }
    }

    /// Same joystick axis on another device slot
    pub fn with_slot(self, slot: u8) -> Result<Self, InputError> {
        let (_, axis) = decode_joystick_axis(self)?;
        joystick_axis(slot, axis)
    }
}

impl fmt::Display for DeviceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Channel::Mouse { axis } => write!(f, "{MOUSE_PREFIX}{axis}"),
            Channel::Joystick { slot, axis } => {
                write!(f, "{JOY_PREFIX}{slot}{JOY_AXIS_INFIX}{}", axis - 1)
            }
        }
    }
}

impl FromStr for DeviceChannel {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InputError::MalformedIdentifier(s.to_string());

        if let Some(index) = s.strip_prefix(MOUSE_PREFIX) {
            let axis: u8 = index.parse().map_err(|_| malformed())?;
            return mouse_axis(axis).map_err(|_| malformed());
        }

        let rest = s.strip_prefix(JOY_PREFIX).ok_or_else(malformed)?;
        let (slot, suffix) = rest.split_once(JOY_AXIS_INFIX).ok_or_else(malformed)?;
        let slot: u8 = slot.parse().map_err(|_| malformed())?;
        let suffix: u8 = suffix.parse().map_err(|_| malformed())?;
        let axis = suffix.checked_add(1).ok_or_else(malformed)?;
        joystick_axis(slot, axis).map_err(|_| malformed())
    }
}

impl TryFrom<String> for DeviceChannel {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceChannel> for String {
    fn from(channel: DeviceChannel) -> Self {
        channel.to_string()
    }
}

/// One button of one pad, stored as its global code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GamepadButton(u16);

impl GamepadButton {
    /// Validate a raw global code
    pub fn from_code(code: u16) -> Result<Self, InputError> {
        if (FIRST_PAD_BUTTON..FIRST_PAD_BUTTON + TOTAL_PAD_BUTTONS).contains(&code) {
            Ok(Self(code))
        } else {
            Err(InputError::MalformedIdentifier(format!(
                "pad button code {code}"
            )))
        }
    }

    /// Global code in [350, 430)
    pub fn code(self) -> u16 {
        self.0
    }

    /// Device slot in [1, 4]
    pub fn slot(self) -> u8 {
        ((self.0 - FIRST_PAD_BUTTON) / BUTTONS_PER_PAD) as u8 + 1
    }

    /// Button id in [0, 19]
    pub fn button(self) -> u8 {
        ((self.0 - FIRST_PAD_BUTTON) % BUTTONS_PER_PAD) as u8
    }

    /// Same button on another device slot
    pub fn with_slot(self, slot: u8) -> Result<Self, InputError> {
        joystick_button(slot, self.button())
    }
}

impl fmt::Display for GamepadButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{BUTTON_PREFIX}{}{BUTTON_INFIX}{}",
            self.slot(),
            self.button()
        )
    }
}

impl FromStr for GamepadButton {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InputError::MalformedIdentifier(s.to_string());
        let rest = s.strip_prefix(BUTTON_PREFIX).ok_or_else(malformed)?;
        let (slot, button) = rest.split_once(BUTTON_INFIX).ok_or_else(malformed)?;
        let slot: u8 = slot.parse().map_err(|_| malformed())?;
        let button: u8 = button.parse().map_err(|_| malformed())?;
        joystick_button(slot, button).map_err(|_| malformed())
    }
}

fn check_slot(slot: u8) -> Result<(), InputError> {
    if (1..=MAX_JOYSTICKS).contains(&slot) {
        Ok(())
    } else {
        Err(InputError::InvalidDeviceIndex {
            what: "device slot",
            index: slot as u32,
            min: 1,
            max: MAX_JOYSTICKS as u32,
        })
    }
}

/// Encode (slot, axis number) into a joystick axis channel
pub fn joystick_axis(slot: u8, axis: u8) -> Result<DeviceChannel, InputError> {
    check_slot(slot)?;
    if !(1..=MAX_JOYSTICK_AXES).contains(&axis) {
        return Err(InputError::InvalidDeviceIndex {
            what: "joystick axis",
            index: axis as u32,
            min: 1,
            max: MAX_JOYSTICK_AXES as u32,
        });
    }
    Ok(DeviceChannel(Channel::Joystick { slot, axis }))
}

/// Encode a mouse axis index into a channel
pub fn mouse_axis(axis: u8) -> Result<DeviceChannel, InputError> {
    if axis >= MAX_MOUSE_AXES {
        return Err(InputError::InvalidDeviceIndex {
            what: "mouse axis",
            index: axis as u32,
            min: 0,
            max: MAX_MOUSE_AXES as u32 - 1,
        });
    }
    Ok(DeviceChannel(Channel::Mouse { axis }))
}

/// Encode (slot, button id) into a pad button
pub fn joystick_button(slot: u8, button: u8) -> Result<GamepadButton, InputError> {
    check_slot(slot)?;
    if button as u16 >= BUTTONS_PER_PAD {
        return Err(InputError::InvalidDeviceIndex {
            what: "joystick button",
            index: button as u32,
            min: 0,
            max: BUTTONS_PER_PAD as u32 - 1,
        });
    }
    Ok(GamepadButton(
        FIRST_PAD_BUTTON + (slot as u16 - 1) * BUTTONS_PER_PAD + button as u16,
    ))
}

/// Decode a joystick axis channel back into (slot, axis number)
pub fn decode_joystick_axis(channel: DeviceChannel) -> Result<(u8, u8), InputError> {
    match channel.0 {
        Channel::Joystick { slot, axis } => Ok((slot, axis)),
        Channel::Mouse { .. } => Err(InputError::MalformedIdentifier(format!(
            "{channel} is not a joystick axis"
        ))),
    }
}

/// Decode a global pad button code into (slot, button id)
pub fn decode_joystick_button(code: u16) -> Result<(u8, u8), InputError> {
    let button = GamepadButton::from_code(code)?;
    Ok((button.slot(), button.button()))
}

/// The three mouse axes
pub fn mouse_axes() -> impl Iterator<Item = DeviceChannel> {
    (0..MAX_MOUSE_AXES).map(|axis| DeviceChannel(Channel::Mouse { axis }))
}

/// Every axis of one joystick slot (empty for an invalid slot)
pub fn joystick_axes_for(slot: u8) -> impl Iterator<Item = DeviceChannel> {
    let valid = check_slot(slot).is_ok();
    (1..=MAX_JOYSTICK_AXES)
        .filter(move |_| valid)
        .map(move |axis| DeviceChannel(Channel::Joystick { slot, axis }))
}

/// Every axis of every joystick slot, slot-major
pub fn joystick_axes() -> impl Iterator<Item = DeviceChannel> {
    (1..=MAX_JOYSTICKS).flat_map(joystick_axes_for)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_roundtrip_over_full_range() {
        for slot in 1..=MAX_JOYSTICKS {
            for axis in 1..=MAX_JOYSTICK_AXES {
                let channel = joystick_axis(slot, axis).unwrap();
                assert_eq!(decode_joystick_axis(channel).unwrap(), (slot, axis));
                assert_eq!(channel.to_string().parse::<DeviceChannel>().unwrap(), channel);
            }
        }
    }

    #[test]
    fn test_button_roundtrip_over_full_range() {
        for slot in 1..=MAX_JOYSTICKS {
            for button in 0..BUTTONS_PER_PAD as u8 {
                let encoded = joystick_button(slot, button).unwrap();
                assert_eq!(decode_joystick_button(encoded.code()).unwrap(), (slot, button));
            }
        }
    }

    #[test]
    fn test_axis_names() {
        assert_eq!(joystick_axis(1, 1).unwrap().to_string(), "Joy_1_Axis_0");
        assert_eq!(joystick_axis(4, 28).unwrap().to_string(), "Joy_4_Axis_27");
        assert_eq!(mouse_axis(2).unwrap().to_string(), "Mouse_Axis_2");
    }

    #[test]
    fn test_button_codes() {
        assert_eq!(joystick_button(1, 0).unwrap().code(), 350);
        assert_eq!(joystick_button(2, 3).unwrap().code(), 373);
        assert_eq!(joystick_button(4, 19).unwrap().code(), 429);
        assert_eq!(joystick_button(2, 3).unwrap().to_string(), "Joystick2Button3");
    }

    #[test]
    fn test_out_of_range_encode() {
        assert!(matches!(
            joystick_axis(0, 1),
            Err(InputError::InvalidDeviceIndex { .. })
        ));
        assert!(matches!(
            joystick_axis(1, 29),
            Err(InputError::InvalidDeviceIndex { .. })
        ));
        assert!(matches!(
            joystick_axis(1, 0),
            Err(InputError::InvalidDeviceIndex { .. })
        ));
        assert!(mouse_axis(3).is_err());
        assert!(joystick_button(5, 0).is_err());
        assert!(joystick_button(1, 20).is_err());
    }

    #[test]
    fn test_malformed_decode() {
        for bad in ["Joy_x_Axis_1", "Joy_1_Axis_28", "Joy_5_Axis_0", "Mouse_Axis_3", "Pad_1", ""] {
            assert!(
                matches!(bad.parse::<DeviceChannel>(), Err(InputError::MalformedIdentifier(_))),
                "{bad} should be malformed"
            );
        }
        assert!(matches!(
            decode_joystick_button(349),
            Err(InputError::MalformedIdentifier(_))
        ));
        assert!(matches!(
            decode_joystick_button(430),
            Err(InputError::MalformedIdentifier(_))
        ));
        assert!(matches!(
            decode_joystick_axis(mouse_axis(0).unwrap()),
            Err(InputError::MalformedIdentifier(_))
        ));
        assert!("JoystickButton3".parse::<GamepadButton>().is_err());
        assert!("Joystick1Button20".parse::<GamepadButton>().is_err());
    }

    #[test]
    fn test_identifier_pool() {
        assert_eq!(mouse_axes().count(), 3);
        assert_eq!(joystick_axes().count(), 4 * 28);
        assert!(joystick_axes_for(2).all(|c| c.slot() == Some(2)));
        assert_eq!(joystick_axes_for(7).count(), 0);
    }

    #[test]
    fn test_with_slot_keeps_index() {
        let moved = joystick_axis(1, 5).unwrap().with_slot(3).unwrap();
        assert_eq!(decode_joystick_axis(moved).unwrap(), (3, 5));

        let button = joystick_button(2, 7).unwrap().with_slot(1).unwrap();
        assert_eq!((button.slot(), button.button()), (1, 7));

        assert!(mouse_axis(0).unwrap().with_slot(2).is_err());
    }

    #[test]
    fn test_channel_serializes_as_name() {
        let channel = joystick_axis(2, 4).unwrap();
        let json = serde_json::to_string(&channel).unwrap();
        assert_eq!(json, "\"Joy_2_Axis_3\"");
        let back: DeviceChannel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, channel);
        assert!(serde_json::from_str::<DeviceChannel>("\"Joy_9_Axis_0\"").is_err());
    }
}
