// Gamepads through gilrs
//
// Connected pads are numbered densely from 1 in gilrs id order, so a pad's
// slot shifts when a lower-numbered pad disconnects. The input manager's
// slot correction keeps bindings pointing at the right pad afterwards.
//
// Axis and button numbers follow the usual XInput layout: left stick 1/2,
// right stick 4/5, d-pad 6/7, triggers 9/10; face buttons 0-3, bumpers 4/5,
// back 6, start 7, stick clicks 8/9.

use crate::engine::input::codec::{joystick_axis, joystick_button, MAX_JOYSTICKS};
use crate::engine::input::key::Key;
use crate::engine::input::source::{DevicePresenceSource, FrameInput};
use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use log::{debug, info, warn};

const AXIS_TABLE: [(Axis, u8); 8] = [
    (Axis::LeftStickX, 1),
    (Axis::LeftStickY, 2),
    (Axis::RightStickX, 4),
    (Axis::RightStickY, 5),
    (Axis::DPadX, 6),
    (Axis::DPadY, 7),
    (Axis::LeftZ, 9),
    (Axis::RightZ, 10),
];

/// Analog trigger buttons reported through `ButtonChanged`
const TRIGGER_TABLE: [(Button, u8); 2] = [(Button::LeftTrigger2, 9), (Button::RightTrigger2, 10)];

const BUTTON_TABLE: [(Button, u8); 15] = [
    (Button::South, 0),
    (Button::East, 1),
    (Button::West, 2),
    (Button::North, 3),
    (Button::LeftTrigger, 4),
    (Button::RightTrigger, 5),
    (Button::Select, 6),
    (Button::Start, 7),
    (Button::LeftThumb, 8),
    (Button::RightThumb, 9),
    (Button::Mode, 10),
    (Button::DPadUp, 11),
    (Button::DPadDown, 12),
    (Button::DPadLeft, 13),
    (Button::DPadRight, 14),
];

fn axis_number(axis: Axis) -> Option<u8> {
    AXIS_TABLE.iter().find(|(a, _)| *a == axis).map(|(_, n)| *n)
}

fn trigger_number(button: Button) -> Option<u8> {
    TRIGGER_TABLE.iter().find(|(b, _)| *b == button).map(|(_, n)| *n)
}

fn button_number(button: Button) -> Option<u8> {
    BUTTON_TABLE.iter().find(|(b, _)| *b == button).map(|(_, n)| *n)
}

/// Gilrs context feeding pad state into a `FrameInput`
pub struct GamepadBackend {
    gilrs: Gilrs,
}

impl GamepadBackend {
    pub fn new() -> Result<Self, gilrs::Error> {
        let gilrs = Gilrs::new()?;
        for (id, pad) in gilrs.gamepads() {
            info!("Found gamepad {:?}: {}", id, pad.name());
        }
        Ok(Self { gilrs })
    }

    /// Connected pad ids in slot order
    fn connected_ids(&self) -> Vec<GamepadId> {
        let mut ids: Vec<GamepadId> = self.gilrs.gamepads().map(|(id, _)| id).collect();
        ids.sort_by_key(|id| usize::from(*id));
        ids.truncate(MAX_JOYSTICKS as usize);
        ids
    }

    fn slot_of(&self, id: GamepadId) -> Option<u8> {
        self.connected_ids()
            .iter()
            .position(|candidate| *candidate == id)
            .map(|index| index as u8 + 1)
    }

    /// Drain pending gilrs events into `input`
    pub fn pump(&mut self, input: &mut FrameInput) {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected | EventType::Disconnected => {
                    debug!("Gamepad {:?} {:?}, renumbering slots", event.id, event.event);
                    input.clear_gamepads();
                }
                other => {
                    if let Some(slot) = self.slot_of(event.id) {
                        apply_event(input, slot, other);
                    }
                }
            }
        }
    }
}

impl DevicePresenceSource for GamepadBackend {
    fn connected_device_slots(&self) -> Vec<u8> {
        (1..=self.connected_ids().len() as u8).collect()
    }
}

/// Apply one pad event for the pad in `slot`
fn apply_event(input: &mut FrameInput, slot: u8, event: EventType) {
    match event {
        EventType::AxisChanged(axis, value, _) => {
            if let Some(number) = axis_number(axis) {
                set_axis(input, slot, number, value);
            }
        }
        EventType::ButtonChanged(button, value, _) => {
            if let Some(number) = trigger_number(button) {
                set_axis(input, slot, number, value);
            }
        }
        EventType::ButtonPressed(button, _) => set_button(input, slot, button, true),
        EventType::ButtonReleased(button, _) => set_button(input, slot, button, false),
        _ => {}
    }
}

fn set_axis(input: &mut FrameInput, slot: u8, number: u8, value: f32) {
    match joystick_axis(slot, number) {
        Ok(channel) => input.set_axis(channel, value),
        Err(e) => warn!("Dropping pad axis: {}", e),
    }
}

fn set_button(input: &mut FrameInput, slot: u8, button: Button, held: bool) {
    let Some(number) = button_number(button) else {
        return;
    };
    match joystick_button(slot, number) {
        Ok(code) => input.set_held(Key::Gamepad(code), held),
        Err(e) => warn!("Dropping pad button: {}", e),
    }
}
