// Physical key identifiers
//
// A `Key` names one digital input: a keyboard key, a mouse button or a pad
// button from the global pad button code space. `Key::None` is an empty
// binding and is never reported as held.

use super::codec::GamepadButton;
use super::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// A physical key, mouse button or gamepad button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    #[default]
    None,
    Keyboard(KeyCode),
    Mouse(MouseButton),
    Gamepad(GamepadButton),
}

/// Mouse buttons with a fixed `Mouse<n>` name
const MOUSE_NAMES: [(&str, MouseButton); 5] = [
    ("Mouse0", MouseButton::Left),
    ("Mouse1", MouseButton::Right),
    ("Mouse2", MouseButton::Middle),
    ("Mouse3", MouseButton::Back),
    ("Mouse4", MouseButton::Forward),
];

/// Name prefix for extra mouse buttons whose number clashes with `MOUSE_NAMES`
const OTHER_MOUSE_PREFIX: &str = "MouseOther";

impl Key {
    pub fn is_none(&self) -> bool {
        matches!(self, Key::None)
    }

    /// Pad button behind this key, if any
    pub fn gamepad_button(&self) -> Option<GamepadButton> {
        match self {
            Key::Gamepad(button) => Some(*button),
            _ => None,
        }
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Key::Keyboard(code)
    }
}

impl From<MouseButton> for Key {
    fn from(button: MouseButton) -> Self {
        Key::Mouse(button)
    }
}

impl From<GamepadButton> for Key {
    fn from(button: GamepadButton) -> Self {
        Key::Gamepad(button)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::None => f.write_str("None"),
            // Debug output of KeyCode is its variant name, e.g. `KeyA`
            Key::Keyboard(code) => write!(f, "{code:?}"),
            Key::Mouse(button) => match MOUSE_NAMES.iter().find(|(_, b)| b == button) {
                Some((name, _)) => f.write_str(name),
                None => match button {
                    // Low numbers would collide with the fixed names above
                    MouseButton::Other(n) if usize::from(*n) < MOUSE_NAMES.len() => {
                        write!(f, "{OTHER_MOUSE_PREFIX}{n}")
                    }
                    MouseButton::Other(n) => write!(f, "Mouse{n}"),
                    _ => write!(f, "{button:?}"),
                },
            },
            Key::Gamepad(button) => write!(f, "{button}"),
        }
    }
}

impl FromStr for Key {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        if name.is_empty() || name.eq_ignore_ascii_case("None") {
            return Ok(Key::None);
        }

        if let Some((_, button)) = MOUSE_NAMES.iter().find(|(n, _)| *n == name) {
            return Ok(Key::Mouse(*button));
        }
        if let Some(n) = name.strip_prefix(OTHER_MOUSE_PREFIX) {
            return n
                .parse::<u16>()
                .map(|n| Key::Mouse(MouseButton::Other(n)))
                .map_err(|_| InputError::MalformedIdentifier(name.to_string()));
        }
        if let Some(n) = name.strip_prefix("Mouse") {
            if let Ok(n) = n.parse::<u16>() {
                return Ok(Key::Mouse(MouseButton::Other(n)));
            }
        }

        if name.starts_with("Joystick") {
            return name.parse::<GamepadButton>().map(Key::Gamepad);
        }

        // Keyboard names come from the KeyCode variant table generated by serde
        serde_json::from_value::<KeyCode>(serde_json::Value::String(name.to_string()))
            .map(Key::Keyboard)
            .map_err(|_| InputError::UnknownName(name.to_string()))
    }
}

impl TryFrom<String> for Key {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::codec::joystick_button;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::None.to_string(), "None");
        assert_eq!(Key::from(KeyCode::KeyA).to_string(), "KeyA");
        assert_eq!(Key::from(MouseButton::Right).to_string(), "Mouse1");
        assert_eq!(
            Key::from(joystick_button(3, 2).unwrap()).to_string(),
            "Joystick3Button2"
        );
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("Space".parse::<Key>().unwrap(), Key::Keyboard(KeyCode::Space));
        assert_eq!("Mouse0".parse::<Key>().unwrap(), Key::Mouse(MouseButton::Left));
        assert_eq!("Mouse9".parse::<Key>().unwrap(), Key::Mouse(MouseButton::Other(9)));
        assert_eq!("none".parse::<Key>().unwrap(), Key::None);
        assert_eq!(
            "Joystick1Button7".parse::<Key>().unwrap(),
            Key::Gamepad(joystick_button(1, 7).unwrap())
        );
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            "NotAKey".parse::<Key>(),
            Err(InputError::UnknownName(_))
        ));
        assert!(matches!(
            "Joystick9Button1".parse::<Key>(),
            Err(InputError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_low_numbered_other_mouse_buttons_round_trip() {
        for n in 0..=6u16 {
            let key = Key::Mouse(MouseButton::Other(n));
            let name = key.to_string();
            assert_eq!(name.parse::<Key>().unwrap(), key, "{name}");
        }
        assert_eq!(Key::Mouse(MouseButton::Other(2)).to_string(), "MouseOther2");
        assert_eq!(Key::Mouse(MouseButton::Other(5)).to_string(), "Mouse5");
        assert!(matches!(
            "MouseOtherX".parse::<Key>(),
            Err(InputError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_key_serializes_as_name() {
        let keys = vec![
            Key::None,
            Key::from(KeyCode::ArrowLeft),
            Key::from(MouseButton::Middle),
            Key::from(joystick_button(2, 0).unwrap()),
        ];
        let json = serde_json::to_string(&keys).unwrap();
        assert_eq!(
            json,
            r#"["None","ArrowLeft","Mouse2","Joystick2Button0"]"#
        );
        let back: Vec<Key> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, keys);
    }

    #[test]
    fn test_gamepad_button_accessor() {
        let button = joystick_button(1, 4).unwrap();
        assert_eq!(Key::from(button).gamepad_button(), Some(button));
        assert_eq!(Key::from(KeyCode::KeyE).gamepad_button(), None);
    }
}
