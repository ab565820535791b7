// Virtual channel configuration
//
// An `AxisDefinition` is everything about a channel that is persisted:
// identity, kind, key bindings, device channel, tunables and placement.

use crate::engine::input::codec::{self, DeviceChannel};
use crate::engine::input::key::Key;
use crate::engine::input::kind::ChannelKind;
use crate::engine::input::InputError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Defaults applied by the per-kind constructors
pub mod defaults {
    pub const DIGITAL_SENSITIVITY: f32 = 3.0;
    pub const GRAVITY: f32 = 1.0;
    pub const DEAD_ZONE: f32 = 0.2;
    pub const ANALOG_SENSITIVITY: f32 = 2.0;
    pub const MOUSE_SENSITIVITY: f32 = 0.1;
    pub const SENSITIVITY: f32 = 1.0;

    /// Analog axis sensitivity restored by a reset
    pub const ANALOG_RESET_SENSITIVITY: f32 = 1.0;
}

/// One of the four key binding slots of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingSlot {
    Positive,
    Negative,
    AltPositive,
    AltNegative,
}

impl BindingSlot {
    pub const ALL: [BindingSlot; 4] = [
        BindingSlot::Positive,
        BindingSlot::Negative,
        BindingSlot::AltPositive,
        BindingSlot::AltNegative,
    ];
}

/// Persistent configuration of one virtual channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDefinition {
    /// Unique within a player's registry
    pub name: String,
    pub description: String,

    kind: ChannelKind,

    pub positive: Key,
    pub negative: Key,
    pub alt_positive: Key,
    pub alt_negative: Key,

    /// Raw axis source for mouse and gamepad kinds
    device_channel: Option<DeviceChannel>,

    /// Units/sec ramp rate (digital), or scale factor (mouse, analog)
    pub sensitivity: f32,
    /// Units/sec decay toward neutral (digital)
    pub gravity: f32,
    /// Magnitude below which analog input reads as neutral
    pub dead_zone: f32,
    /// Jump to neutral before reversing direction (digital)
    pub snap: bool,
    pub invert: bool,

    /// Device slot used when the channel was created, for remapping math
    pub device_slot: u8,
    /// Axis or mouse index used when the channel was created
    pub channel_index: u8,
}

impl AxisDefinition {
    /// A blank button channel bound to nothing
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: ChannelKind::Button,
            positive: Key::None,
            negative: Key::None,
            alt_positive: Key::None,
            alt_negative: Key::None,
            device_channel: None,
            sensitivity: defaults::SENSITIVITY,
            gravity: defaults::GRAVITY,
            dead_zone: defaults::DEAD_ZONE,
            snap: true,
            invert: false,
            device_slot: 0,
            channel_index: 0,
        }
    }

    /// Button reading a key plus an optional alternate
    pub fn button(name: impl Into<String>, key: Key, alt_key: Key) -> Self {
        Self {
            positive: key,
            alt_positive: alt_key,
            ..Self::new(name)
        }
    }

    /// Axis driven by a positive and a negative key
    pub fn digital_axis(name: impl Into<String>, positive: Key, negative: Key) -> Self {
        Self {
            kind: ChannelKind::DigitalAxis,
            positive,
            negative,
            sensitivity: defaults::DIGITAL_SENSITIVITY,
            gravity: defaults::GRAVITY,
            snap: true,
            ..Self::new(name)
        }
    }

    /// Gamepad axis `axis` (1-based) on device `slot`
    pub fn analog_axis(name: impl Into<String>, slot: u8, axis: u8) -> Result<Self, InputError> {
        let channel = codec::joystick_axis(slot, axis)?;
        Ok(Self {
            kind: ChannelKind::AnalogAxis,
            device_channel: Some(channel),
            dead_zone: defaults::DEAD_ZONE,
            sensitivity: defaults::ANALOG_SENSITIVITY,
            device_slot: slot,
            channel_index: axis,
            ..Self::new(name)
        })
    }

    /// Gamepad axis debounced into a button
    pub fn analog_button(name: impl Into<String>, slot: u8, axis: u8) -> Result<Self, InputError> {
        let channel = codec::joystick_axis(slot, axis)?;
        Ok(Self {
            kind: ChannelKind::AnalogButton,
            device_channel: Some(channel),
            device_slot: slot,
            channel_index: axis,
            ..Self::new(name)
        })
    }

    /// Mouse axis `axis` in [0, 2]
    pub fn mouse_axis(name: impl Into<String>, axis: u8) -> Result<Self, InputError> {
        let channel = codec::mouse_axis(axis)?;
        Ok(Self {
            kind: ChannelKind::MouseAxis,
            device_channel: Some(channel),
            sensitivity: defaults::MOUSE_SENSITIVITY,
            channel_index: axis,
            ..Self::new(name)
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_alternates(mut self, alt_positive: Key, alt_negative: Key) -> Self {
        self.alt_positive = alt_positive;
        self.alt_negative = alt_negative;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity.max(0.0);
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity.max(0.0);
        self
    }

    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone.clamp(0.0, 0.999);
        self
    }

    pub fn with_snap(mut self, snap: bool) -> Self {
        self.snap = snap;
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn device_channel(&self) -> Option<DeviceChannel> {
        self.device_channel
    }

    /// The four key bindings in slot order
    pub fn keys(&self) -> [Key; 4] {
        [
            self.positive,
            self.negative,
            self.alt_positive,
            self.alt_negative,
        ]
    }

    pub fn key(&self, slot: BindingSlot) -> Key {
        match slot {
            BindingSlot::Positive => self.positive,
            BindingSlot::Negative => self.negative,
            BindingSlot::AltPositive => self.alt_positive,
            BindingSlot::AltNegative => self.alt_negative,
        }
    }

    pub fn key_mut(&mut self, slot: BindingSlot) -> &mut Key {
        match slot {
            BindingSlot::Positive => &mut self.positive,
            BindingSlot::Negative => &mut self.negative,
            BindingSlot::AltPositive => &mut self.alt_positive,
            BindingSlot::AltNegative => &mut self.alt_negative,
        }
    }

    /// Change kind and device channel together
    ///
    /// Button and DigitalAxis never need a channel and always succeed.
    /// AnalogAxis/AnalogButton need a joystick axis, MouseAxis a mouse axis.
    /// On error nothing is modified.
    pub fn set_type(
        &mut self,
        kind: ChannelKind,
        channel: Option<DeviceChannel>,
    ) -> Result<(), InputError> {
        let channel = match kind {
            ChannelKind::Button | ChannelKind::DigitalAxis => None,
            ChannelKind::AnalogAxis | ChannelKind::AnalogButton => match channel {
                Some(c) if c.is_joystick() => Some(c),
                other => return Err(incompatible(kind, "joystick axis", other)),
            },
            ChannelKind::MouseAxis => match channel {
                Some(c) if c.is_mouse() => Some(c),
                other => return Err(incompatible(kind, "mouse axis", other)),
            },
        };

        self.kind = kind;
        self.device_channel = channel;
        if let Some(channel) = channel {
            self.device_slot = channel.slot().unwrap_or(0);
            self.channel_index = channel.index();
        }
        Ok(())
    }

    /// Check the kind/channel pairing, e.g. after deserializing
    pub fn validate(&self) -> Result<(), InputError> {
        match (self.kind, self.device_channel) {
            (ChannelKind::Button | ChannelKind::DigitalAxis, _) => Ok(()),
            (ChannelKind::AnalogAxis | ChannelKind::AnalogButton, Some(c)) if c.is_joystick() => {
                Ok(())
            }
            (ChannelKind::MouseAxis, Some(c)) if c.is_mouse() => Ok(()),
            (ChannelKind::MouseAxis, other) => {
                Err(incompatible(self.kind, "mouse axis", other))
            }
            (kind, other) => Err(incompatible(kind, "joystick axis", other)),
        }
    }

    /// Re-target every gamepad binding to device `target_slot`
    ///
    /// Rewrites the joystick axis channel and any of the four keys that are
    /// pad buttons, keeping their axis/button index. Keyboard and mouse
    /// bindings are left alone. Returns whether anything changed.
    pub fn adjust_device_slot(&mut self, target_slot: u8) -> Result<bool, InputError> {
        let mut channel = self.device_channel;
        if let Some(current) = channel.filter(DeviceChannel::is_joystick) {
            if current.slot() != Some(target_slot) {
                channel = Some(current.with_slot(target_slot)?);
            }
        }

        let mut keys = self.keys();
        for key in keys.iter_mut() {
            if let Some(button) = key.gamepad_button() {
                if button.slot() != target_slot {
                    *key = Key::Gamepad(button.with_slot(target_slot)?);
                }
            }
        }

        // Commit only once every rewrite succeeded
        let changed = channel != self.device_channel || keys != self.keys();
        if changed {
            debug!(
                "Remapped '{}' to device slot {}",
                self.name, target_slot
            );
            self.device_channel = channel;
            [
                self.positive,
                self.negative,
                self.alt_positive,
                self.alt_negative,
            ] = keys;
            if self.device_channel.map_or(false, |c| c.is_joystick()) {
                self.device_slot = target_slot;
            }
        }
        Ok(changed)
    }

    /// Restore the kind-specific tunables, keeping name and bindings
    pub fn reset_tunables(&mut self) {
        match self.kind {
            ChannelKind::DigitalAxis => {
                self.sensitivity = defaults::DIGITAL_SENSITIVITY;
                self.gravity = defaults::GRAVITY;
                self.snap = true;
            }
            ChannelKind::AnalogButton => {
                self.invert = false;
            }
            ChannelKind::Button => {}
            ChannelKind::AnalogAxis => {
                self.dead_zone = defaults::DEAD_ZONE;
                self.sensitivity = defaults::ANALOG_RESET_SENSITIVITY;
                self.invert = false;
            }
            ChannelKind::MouseAxis => {
                self.sensitivity = defaults::MOUSE_SENSITIVITY;
                self.invert = false;
            }
        }
    }
}

fn incompatible(kind: ChannelKind, expected: &'static str, found: Option<DeviceChannel>) -> InputError {
    InputError::IncompatibleBinding {
        kind,
        expected,
        found: found.map_or_else(|| "none".to_string(), |c| c.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::codec::{joystick_axis, joystick_button, mouse_axis};
    use winit::keyboard::KeyCode;

    #[test]
    fn test_constructor_defaults() {
        let digital = AxisDefinition::digital_axis(
            "Horizontal",
            Key::from(KeyCode::KeyD),
            Key::from(KeyCode::KeyA),
        );
        assert_eq!(digital.kind(), ChannelKind::DigitalAxis);
        assert_eq!(digital.sensitivity, 3.0);
        assert_eq!(digital.gravity, 1.0);
        assert!(digital.snap);

        let analog = AxisDefinition::analog_axis("Stick", 1, 4).unwrap();
        assert_eq!(analog.dead_zone, 0.2);
        assert_eq!(analog.sensitivity, 2.0);
        assert_eq!(analog.device_channel(), Some(joystick_axis(1, 4).unwrap()));
        assert_eq!((analog.device_slot, analog.channel_index), (1, 4));

        let mouse = AxisDefinition::mouse_axis("Cam", 1).unwrap();
        assert_eq!(mouse.sensitivity, 0.1);
        assert_eq!(mouse.device_channel(), Some(mouse_axis(1).unwrap()));
    }

    #[test]
    fn test_constructors_reject_bad_indices() {
        assert!(matches!(
            AxisDefinition::analog_axis("Stick", 1, 40),
            Err(InputError::InvalidDeviceIndex { .. })
        ));
        assert!(AxisDefinition::analog_button("Trigger", 6, 9).is_err());
        assert!(AxisDefinition::mouse_axis("Cam", 3).is_err());
    }

    #[test]
    fn test_set_type_requires_matching_channel() {
        let mut axis = AxisDefinition::new("Fire");
        let before = axis.clone();

        let err = axis.set_type(ChannelKind::AnalogAxis, Some(mouse_axis(0).unwrap()));
        assert!(matches!(err, Err(InputError::IncompatibleBinding { .. })));
        assert!(axis.set_type(ChannelKind::MouseAxis, None).is_err());
        assert!(axis
            .set_type(ChannelKind::AnalogButton, Some(mouse_axis(1).unwrap()))
            .is_err());
        assert_eq!(axis, before);

        axis.set_type(ChannelKind::AnalogButton, Some(joystick_axis(2, 9).unwrap()))
            .unwrap();
        assert_eq!(axis.kind(), ChannelKind::AnalogButton);
        assert_eq!(axis.device_channel(), Some(joystick_axis(2, 9).unwrap()));
        assert_eq!((axis.device_slot, axis.channel_index), (2, 9));

        axis.set_type(ChannelKind::DigitalAxis, None).unwrap();
        assert_eq!(axis.kind(), ChannelKind::DigitalAxis);
        assert_eq!(axis.device_channel(), None);
    }

    #[test]
    fn test_adjust_device_slot_moves_axis() {
        let mut axis = AxisDefinition::analog_axis("Horizontal", 3, 1).unwrap();
        assert!(axis.adjust_device_slot(2).unwrap());
        assert_eq!(axis.device_channel(), Some(joystick_axis(2, 1).unwrap()));
        assert_eq!(axis.device_slot, 2);

        // Already on the right slot
        assert!(!axis.adjust_device_slot(2).unwrap());
    }

    #[test]
    fn test_adjust_device_slot_moves_pad_buttons_only() {
        let mut axis = AxisDefinition::button(
            "Jump",
            Key::from(joystick_button(2, 0).unwrap()),
            Key::from(KeyCode::Space),
        );
        axis.alt_negative = Key::from(joystick_button(4, 7).unwrap());

        assert!(axis.adjust_device_slot(1).unwrap());
        assert_eq!(axis.positive, Key::from(joystick_button(1, 0).unwrap()));
        assert_eq!(axis.alt_positive, Key::from(KeyCode::Space));
        assert_eq!(axis.alt_negative, Key::from(joystick_button(1, 7).unwrap()));
        assert_eq!(axis.negative, Key::None);
    }

    #[test]
    fn test_adjust_device_slot_ignores_keyboard_and_mouse() {
        let mut digital = AxisDefinition::digital_axis(
            "Horizontal",
            Key::from(KeyCode::KeyD),
            Key::from(KeyCode::KeyA),
        );
        assert!(!digital.adjust_device_slot(3).unwrap());

        let mut mouse = AxisDefinition::mouse_axis("Cam", 0).unwrap();
        assert!(!mouse.adjust_device_slot(3).unwrap());
        assert_eq!(mouse.device_channel(), Some(mouse_axis(0).unwrap()));
    }

    #[test]
    fn test_adjust_device_slot_invalid_target_leaves_channel() {
        let mut axis = AxisDefinition::analog_axis("Horizontal", 1, 1).unwrap();
        let before = axis.clone();
        assert!(matches!(
            axis.adjust_device_slot(5),
            Err(InputError::InvalidDeviceIndex { .. })
        ));
        assert_eq!(axis, before);
    }

    #[test]
    fn test_reset_analog_axis_keeps_bindings() {
        let mut axis = AxisDefinition::analog_axis("Look", 2, 4)
            .unwrap()
            .with_dead_zone(0.5)
            .with_sensitivity(4.0)
            .with_invert(true);
        axis.positive = Key::from(KeyCode::KeyI);

        axis.reset_tunables();
        assert_eq!(axis.dead_zone, 0.2);
        assert_eq!(axis.sensitivity, 1.0);
        assert!(!axis.invert);
        assert_eq!(axis.name, "Look");
        assert_eq!(axis.positive, Key::from(KeyCode::KeyI));
        assert_eq!(axis.device_channel(), Some(joystick_axis(2, 4).unwrap()));
    }

    #[test]
    fn test_reset_digital_and_mouse() {
        let mut digital = AxisDefinition::digital_axis("H", Key::None, Key::None)
            .with_sensitivity(9.0)
            .with_gravity(0.0)
            .with_snap(false);
        digital.reset_tunables();
        assert_eq!((digital.sensitivity, digital.gravity, digital.snap), (3.0, 1.0, true));

        let mut mouse = AxisDefinition::mouse_axis("Cam", 0)
            .unwrap()
            .with_sensitivity(1.5)
            .with_invert(true);
        mouse.reset_tunables();
        assert_eq!(mouse.sensitivity, 0.1);
        assert!(!mouse.invert);
    }

    #[test]
    fn test_validate() {
        assert!(AxisDefinition::analog_axis("A", 1, 1).unwrap().validate().is_ok());
        assert!(AxisDefinition::new("B").validate().is_ok());

        let mut broken = AxisDefinition::mouse_axis("C", 0).unwrap();
        broken.kind = ChannelKind::AnalogAxis;
        assert!(matches!(
            broken.validate(),
            Err(InputError::IncompatibleBinding { .. })
        ));
    }

    #[test]
    fn test_key_slots() {
        let mut axis = AxisDefinition::new("Fire");
        *axis.key_mut(BindingSlot::AltNegative) = Key::from(KeyCode::KeyQ);
        assert_eq!(axis.key(BindingSlot::AltNegative), Key::from(KeyCode::KeyQ));
        assert_eq!(axis.keys()[3], Key::from(KeyCode::KeyQ));
    }
}
