// Default layouts
//
// Stock bindings for players one and two, written to the store the first
// time a player/device-class pair is missing.

use super::axis::AxisDefinition;
use super::codec::joystick_button;
use super::key::Key;
use super::kind::{DeviceClass, PlayerId};
use super::InputError;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

const KEYBOARD_AXIS_SENSITIVITY: f32 = 2.0;
const KEYBOARD_AXIS_GRAVITY: f32 = 4.0;
const MOUSE_LOOK_SENSITIVITY: f32 = 0.2;
const PAD_LOOK_SENSITIVITY: f32 = 1.0;

/// Registry name used for a player's stock layout
pub fn layout_name(player: PlayerId) -> String {
    let name = match player {
        PlayerId::One => "One",
        PlayerId::Two => "Two",
        PlayerId::Three => "Three",
        PlayerId::Four => "Four",
    };
    format!("Player {name} config")
}

/// Stock layout for `player` on `class`; `None` for players without one
pub fn default_layout(
    player: PlayerId,
    class: DeviceClass,
) -> Result<Option<Vec<AxisDefinition>>, InputError> {
    match (player, class) {
        (PlayerId::One | PlayerId::Two, DeviceClass::Keyboard) => {
            Ok(Some(keyboard_layout(player)?))
        }
        (PlayerId::One | PlayerId::Two, DeviceClass::Gamepad) => {
            Ok(Some(gamepad_layout(player)?))
        }
        _ => Ok(None),
    }
}

fn keyboard_layout(player: PlayerId) -> Result<Vec<AxisDefinition>, InputError> {
    let n = player.number();
    // Player two joins with caps lock so both can share one keyboard
    let switch_key = match player {
        PlayerId::One => KeyCode::Tab,
        _ => KeyCode::CapsLock,
    };

    Ok(vec![
        AxisDefinition::mouse_axis("CamHorizontal", 0)?
            .with_sensitivity(MOUSE_LOOK_SENSITIVITY)
            .with_description(format!("Player {n} mouse horizontal mapping")),
        AxisDefinition::mouse_axis("CamVertical", 1)?
            .with_sensitivity(MOUSE_LOOK_SENSITIVITY)
            .with_description(format!("Player {n} mouse vertical mapping")),
        AxisDefinition::digital_axis("Horizontal", KeyCode::KeyD.into(), KeyCode::KeyA.into())
            .with_alternates(KeyCode::ArrowRight.into(), KeyCode::ArrowLeft.into())
            .with_sensitivity(KEYBOARD_AXIS_SENSITIVITY)
            .with_gravity(KEYBOARD_AXIS_GRAVITY)
            .with_description(format!("Player {n} horizontal mapping")),
        AxisDefinition::digital_axis("Vertical", KeyCode::KeyW.into(), KeyCode::KeyS.into())
            .with_alternates(KeyCode::ArrowUp.into(), KeyCode::ArrowDown.into())
            .with_sensitivity(KEYBOARD_AXIS_SENSITIVITY)
            .with_gravity(KEYBOARD_AXIS_GRAVITY)
            .with_description(format!("Player {n} vertical mapping")),
        AxisDefinition::button("Switch", switch_key.into(), Key::None)
            .with_description(format!("Player {n} switch avatar")),
        AxisDefinition::button("Attack left", MouseButton::Left.into(), Key::None)
            .with_description(format!("Player {n} left hand attack")),
        AxisDefinition::button("Attack right", MouseButton::Right.into(), Key::None)
            .with_description(format!("Player {n} right hand attack")),
        AxisDefinition::button("Dodge", KeyCode::Space.into(), Key::None)
            .with_description(format!("Player {n} dodge")),
        AxisDefinition::button("Pause", KeyCode::Escape.into(), Key::None)
            .with_description(format!("Player {n} pause")),
        AxisDefinition::button("Action", KeyCode::KeyE.into(), Key::None)
            .with_description(format!("Player {n} action")),
    ])
}

fn gamepad_layout(player: PlayerId) -> Result<Vec<AxisDefinition>, InputError> {
    let slot = player.number();
    let pad = |button: u8| -> Result<Key, InputError> { Ok(joystick_button(slot, button)?.into()) };

    Ok(vec![
        AxisDefinition::button("Switch", pad(3)?, Key::None).with_description("Switch player avatar"),
        AxisDefinition::button("Dodge", pad(0)?, Key::None).with_description("Dodge action"),
        AxisDefinition::button("Action", pad(1)?, Key::None).with_description("Action for avatar"),
        AxisDefinition::button("Pause", pad(7)?, Key::None).with_description("Pause menu"),
        // Right stick
        AxisDefinition::analog_axis("CamHorizontal", slot, 4)?
            .with_sensitivity(PAD_LOOK_SENSITIVITY)
            .with_description("Horizontal camera movement"),
        AxisDefinition::analog_axis("CamVertical", slot, 5)?
            .with_sensitivity(PAD_LOOK_SENSITIVITY)
            .with_description("Vertical camera movement"),
        // Left stick
        AxisDefinition::analog_axis("Horizontal", slot, 1)?.with_description("Horizontal movement"),
        AxisDefinition::analog_axis("Vertical", slot, 2)?.with_description("Vertical movement"),
        // Triggers
        AxisDefinition::analog_button("Attack left", slot, 9)?.with_description("Attack left"),
        AxisDefinition::analog_button("Attack right", slot, 10)?.with_description("Attack right"),
    ])
}
