// Keyboard and mouse from winit events
//
// Window events carry keys, mouse buttons and the wheel; raw mouse motion
// arrives as a device event. Motion and wheel are per-frame deltas on mouse
// axes 0 (x), 1 (y) and 2 (wheel). Y is flipped so up is positive.

use crate::engine::input::codec::mouse_axis;
use crate::engine::input::key::Key;
use crate::engine::input::source::FrameInput;
use log::warn;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

const MOUSE_X: u8 = 0;
const MOUSE_Y: u8 = 1;
const MOUSE_WHEEL: u8 = 2;

/// Pixels per wheel line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f64 = 40.0;

/// Feed one window event into `input`; returns whether it was consumed
pub fn handle_window_event(input: &mut FrameInput, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            apply_key(input, event.physical_key, event.state, event.repeat);
            true
        }
        WindowEvent::MouseInput { state, button, .. } => {
            apply_mouse_button(input, *button, *state);
            true
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let lines = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
            };
            add_mouse_delta(input, MOUSE_WHEEL, lines);
            true
        }
        WindowEvent::Focused(false) => {
            // Keys released while unfocused never reach us
            input.reset();
            true
        }
        _ => false,
    }
}

/// Feed one device event into `input`; returns whether it was consumed
pub fn handle_device_event(input: &mut FrameInput, event: &DeviceEvent) -> bool {
    match event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => {
            add_mouse_delta(input, MOUSE_X, *dx as f32);
            add_mouse_delta(input, MOUSE_Y, -*dy as f32);
            true
        }
        _ => false,
    }
}

/// Apply a physical key transition, ignoring OS key repeat
pub fn apply_key(input: &mut FrameInput, key: PhysicalKey, state: ElementState, repeat: bool) {
    let PhysicalKey::Code(code) = key else {
        return;
    };
    match state {
        ElementState::Pressed if !repeat => input.press(Key::Keyboard(code)),
        ElementState::Pressed => {}
        ElementState::Released => input.release(Key::Keyboard(code)),
    }
}

pub fn apply_mouse_button(input: &mut FrameInput, button: MouseButton, state: ElementState) {
    input.set_held(Key::Mouse(button), state == ElementState::Pressed);
}

fn add_mouse_delta(input: &mut FrameInput, axis: u8, delta: f32) {
    match mouse_axis(axis) {
        Ok(channel) => input.add_delta(channel, delta),
        Err(e) => warn!("Dropping mouse delta: {}", e),
    }
}
