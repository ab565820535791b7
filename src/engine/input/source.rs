// Raw input collaborators
//
// The virtual channels never talk to devices directly. The host implements
// `RawInputSource` (key levels/edges, axis values) and `DevicePresenceSource`
// (which pad slots are connected). `FrameInput` is a ready-made frame-based
// source: the host feeds it events, the manager ticks, then the host calls
// `end_frame` to clear edges.

use super::codec::DeviceChannel;
use super::key::Key;
use std::collections::{HashMap, HashSet};

/// Level and edge queries against physical devices
pub trait RawInputSource {
    /// Key is currently held
    fn is_key_held(&self, key: Key) -> bool;

    /// Key went down this frame
    fn is_key_down(&self, key: Key) -> bool;

    /// Key went up this frame
    fn is_key_up(&self, key: Key) -> bool;

    /// Smoothed axis value, nominally in [-1, 1]
    fn channel_value(&self, channel: DeviceChannel) -> f32;

    /// Unsmoothed axis value
    fn channel_value_raw(&self, channel: DeviceChannel) -> f32 {
        self.channel_value(channel)
    }

    /// Every key that went down this frame, earliest first (used by rebind capture)
    fn keys_down(&self) -> Vec<Key>;
}

/// Which gamepad device slots are connected, densely numbered from 1
pub trait DevicePresenceSource {
    fn connected_device_slots(&self) -> Vec<u8>;
}

impl DevicePresenceSource for Vec<u8> {
    fn connected_device_slots(&self) -> Vec<u8> {
        self.clone()
    }
}

/// Frame-based raw input state
#[derive(Debug, Default)]
pub struct FrameInput {
    /// Keys currently held
    held: HashSet<Key>,

    /// Keys that went down this frame
    just_pressed: HashSet<Key>,

    /// `just_pressed` in the order the presses arrived
    press_order: Vec<Key>,

    /// Keys that went up this frame
    just_released: HashSet<Key>,

    /// Level axes (sticks, triggers)
    axes: HashMap<DeviceChannel, f32>,

    /// Per-frame accumulated deltas (mouse motion, wheel)
    deltas: HashMap<DeviceChannel, f32>,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key press
    pub fn press(&mut self, key: Key) {
        if key.is_none() {
            return;
        }
        if self.held.insert(key) && self.just_pressed.insert(key) {
            self.press_order.push(key);
        }
    }

    /// Register a key release
    pub fn release(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Press or release depending on a polled level
    pub fn set_held(&mut self, key: Key, held: bool) {
        if held {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    /// Set a level axis value
    pub fn set_axis(&mut self, channel: DeviceChannel, value: f32) {
        self.axes.insert(channel, value);
    }

    /// Accumulate a delta that only lasts until the end of the frame
    pub fn add_delta(&mut self, channel: DeviceChannel, delta: f32) {
        *self.deltas.entry(channel).or_insert(0.0) += delta;
    }

    /// Clear edges and deltas; call once per frame after the manager ticked
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.press_order.clear();
        self.just_released.clear();
        self.deltas.clear();
    }

    /// Forget everything, e.g. when the window loses focus
    pub fn reset(&mut self) {
        let held: Vec<Key> = self.held.iter().copied().collect();
        for key in held {
            self.release(key);
        }
        self.axes.clear();
        self.deltas.clear();
    }

    /// Release every pad button and drop every joystick axis, e.g. when pad
    /// slots are renumbered after a connect or disconnect
    pub fn clear_gamepads(&mut self) {
        let pads: Vec<Key> = self
            .held
            .iter()
            .copied()
            .filter(|key| key.gamepad_button().is_some())
            .collect();
        for key in pads {
            self.release(key);
        }
        self.axes.retain(|channel, _| !channel.is_joystick());
    }
}

impl RawInputSource for FrameInput {
    fn is_key_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    fn is_key_up(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    fn channel_value(&self, channel: DeviceChannel) -> f32 {
        self.deltas
            .get(&channel)
            .or_else(|| self.axes.get(&channel))
            .copied()
            .unwrap_or(0.0)
    }

    fn keys_down(&self) -> Vec<Key> {
        self.press_order.clone()
    }
}
