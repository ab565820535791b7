// Device slot correction and presence tracking
//
// Physical gamepads are numbered densely (1..N) by the presence source, while
// player slots may interleave keyboard and gamepad users. A gamepad player's
// physical slot is its player number minus the keyboard players before it.

use super::codec::MAX_JOYSTICKS;
use super::kind::{DeviceClass, MAX_PLAYERS};
use log::info;
use std::collections::BTreeSet;

/// Physical gamepad slot each player should be bound to
///
/// `None` for keyboard players, which consume no pad slot.
pub fn corrected_pad_slots(classes: &[DeviceClass; MAX_PLAYERS]) -> [Option<u8>; MAX_PLAYERS] {
    // Shift accumulated by keyboard players seen so far
    let mut shift = [0u8; MAX_PLAYERS];
    let mut keyboards = 0u8;
    let mut slots = [None; MAX_PLAYERS];

    for (index, class) in classes.iter().enumerate() {
        shift[index] = keyboards;
        match class {
            DeviceClass::Keyboard => keyboards += 1,
            DeviceClass::Gamepad => {
                let player_number = index as u8 + 1;
                slots[index] = Some(player_number - shift[index]);
            }
        }
    }
    slots
}

/// Connection change of one gamepad slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    /// Seen for the first time this session
    FirstConnected(u8),
    Disconnected(u8),
    /// Seen again after a disconnect
    Reconnected(u8),
}

/// Compares successive presence lists
#[derive(Debug, Default)]
pub struct PresenceTracker {
    /// Currently connected slots
    connected: BTreeSet<u8>,

    /// Every slot ever seen
    seen: BTreeSet<u8>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the latest presence list and report what changed
    ///
    /// Slots outside [1, 4] are ignored.
    pub fn update(&mut self, present: &[u8]) -> Vec<PresenceEvent> {
        let present: BTreeSet<u8> = present
            .iter()
            .copied()
            .filter(|slot| (1..=MAX_JOYSTICKS).contains(slot))
            .collect();
        let mut events = Vec::new();

        for slot in self.connected.difference(&present) {
            info!("Gamepad {} disconnected", slot);
            events.push(PresenceEvent::Disconnected(*slot));
        }
        for slot in present.difference(&self.connected) {
            if self.seen.insert(*slot) {
                info!("Gamepad {} connected", slot);
                events.push(PresenceEvent::FirstConnected(*slot));
            } else {
                info!("Gamepad {} reconnected", slot);
                events.push(PresenceEvent::Reconnected(*slot));
            }
        }

        self.connected = present;
        events
    }

    pub fn connected(&self) -> impl Iterator<Item = u8> + '_ {
        self.connected.iter().copied()
    }

    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    pub fn is_connected(&self, slot: u8) -> bool {
        self.connected.contains(&slot)
    }
}
