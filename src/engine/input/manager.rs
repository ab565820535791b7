// Input manager - Main coordination system for all input

use super::axis::{AxisDefinition, AxisRuntime, BindingSlot};
use super::capture::{CaptureFilter, Captured, RebindCapture};
use super::codec::DeviceChannel;
use super::key::Key;
use super::kind::{ChannelKind, DeviceClass, PlayerId, MAX_PLAYERS};
use super::notify::{ChangeNotifier, ConfigurationListener, SubscriptionId};
use super::persist::{decode_registry, encode_registry, ConfigKey, ConfigStore};
use super::presets::{default_layout, layout_name};
use super::registry::PlayerAxisRegistry;
use super::remap::{corrected_pad_slots, PresenceEvent, PresenceTracker};
use super::settings::InputSettings;
use super::source::{DevicePresenceSource, FrameInput, RawInputSource};
use super::InputError;
use log::{debug, info, warn};
use std::time::Instant;

/// One player's device class and channels
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    class: DeviceClass,
    registry: PlayerAxisRegistry,
}

impl PlayerSlot {
    fn new(player: PlayerId, class: DeviceClass) -> Self {
        Self {
            class,
            registry: PlayerAxisRegistry::new(layout_name(player)),
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn registry(&self) -> &PlayerAxisRegistry {
        &self.registry
    }
}

/// Main input manager that coordinates all virtual channels for all players
pub struct InputManager<S: RawInputSource = FrameInput> {
    /// Raw device state the channels read from
    source: S,

    /// Per-player class and registry, indexed by `PlayerId::index`
    players: [PlayerSlot; MAX_PLAYERS],

    /// Configuration-changed subscribers
    notifier: ChangeNotifier,

    /// Gamepad connection history
    presence: PresenceTracker,

    /// Pending rebind capture, if any
    capture: RebindCapture,

    /// Time of the last tick; new channels start their clock here
    clock: Instant,

    capture_dead_zone: f32,
    assign_gamepads_on_startup: bool,
}

impl InputManager<FrameInput> {
    /// Create a manager over a fresh `FrameInput` with default settings
    pub fn new() -> Self {
        Self::with_source(FrameInput::new())
    }
}

impl Default for InputManager<FrameInput> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RawInputSource> InputManager<S> {
    /// Create a manager over `source` with default settings
    pub fn with_source(source: S) -> Self {
        Self::with_settings(source, &InputSettings::default())
    }

    /// Create a manager over `source` configured by `settings`
    pub fn with_settings(source: S, settings: &InputSettings) -> Self {
        Self::starting_at(source, settings, Instant::now())
    }

    /// Create a manager whose clock starts at `now`
    pub fn starting_at(source: S, settings: &InputSettings, now: Instant) -> Self {
        let players = PlayerId::ALL.map(|player| {
            PlayerSlot::new(player, settings.default_classes[player.index()])
        });

        Self {
            source,
            players,
            notifier: ChangeNotifier::new(),
            presence: PresenceTracker::new(),
            capture: RebindCapture::new(),
            clock: now,
            capture_dead_zone: settings.capture_dead_zone,
            assign_gamepads_on_startup: settings.assign_gamepads_on_startup,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable raw source, for the host to feed events into
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn player(&self, player: PlayerId) -> &PlayerSlot {
        &self.players[player.index()]
    }

    pub fn registry(&self, player: PlayerId) -> &PlayerAxisRegistry {
        &self.players[player.index()].registry
    }

    pub fn device_class(&self, player: PlayerId) -> DeviceClass {
        self.players[player.index()].class
    }

    /// Device class of every player, in player order
    pub fn device_classes(&self) -> [DeviceClass; MAX_PLAYERS] {
        std::array::from_fn(|i| self.players[i].class)
    }

    pub fn axis(&self, player: PlayerId, name: &str) -> Option<&AxisRuntime> {
        self.players[player.index()].registry.get(name)
    }

    // ---- Queries: neutral for unknown channels ----

    pub fn get_axis(&self, player: PlayerId, name: &str) -> f32 {
        self.axis(player, name)
            .map_or(0.0, |axis| axis.get_axis(&self.source))
    }

    pub fn get_axis_raw(&self, player: PlayerId, name: &str) -> f32 {
        self.axis(player, name)
            .map_or(0.0, |axis| axis.get_axis_raw(&self.source))
    }

    pub fn get_button(&self, player: PlayerId, name: &str) -> bool {
        self.axis(player, name)
            .map_or(false, |axis| axis.get_button(&self.source))
    }

    pub fn get_button_down(&self, player: PlayerId, name: &str) -> bool {
        self.axis(player, name)
            .map_or(false, |axis| axis.get_button_down(&self.source))
    }

    pub fn get_button_up(&self, player: PlayerId, name: &str) -> bool {
        self.axis(player, name)
            .map_or(false, |axis| axis.get_button_up(&self.source))
    }

    pub fn any_key(&self, player: PlayerId, name: &str) -> bool {
        self.axis(player, name)
            .map_or(false, |axis| axis.any_key(&self.source))
    }

    pub fn any_key_down(&self, player: PlayerId, name: &str) -> bool {
        self.axis(player, name)
            .map_or(false, |axis| axis.any_key_down(&self.source))
    }

    pub fn any_key_up(&self, player: PlayerId, name: &str) -> bool {
        self.axis(player, name)
            .map_or(false, |axis| axis.any_key_up(&self.source))
    }

    // ---- Channel construction ----

    /// Add a fully configured channel
    pub fn add_axis(&mut self, player: PlayerId, definition: AxisDefinition) -> Result<(), InputError> {
        let name = definition.name.clone();
        self.players[player.index()]
            .registry
            .add(definition, self.clock)?;
        debug!("Added '{}' for {}", name, player);
        self.notifier.notify(player);
        Ok(())
    }

    pub fn add_button(
        &mut self,
        player: PlayerId,
        name: &str,
        key: Key,
        alt_key: Key,
    ) -> Result<(), InputError> {
        self.add_axis(player, AxisDefinition::button(name, key, alt_key))
    }

    pub fn add_digital_axis(
        &mut self,
        player: PlayerId,
        name: &str,
        positive: Key,
        negative: Key,
    ) -> Result<(), InputError> {
        self.add_axis(player, AxisDefinition::digital_axis(name, positive, negative))
    }

    pub fn add_analog_axis(
        &mut self,
        player: PlayerId,
        name: &str,
        slot: u8,
        axis: u8,
    ) -> Result<(), InputError> {
        let definition =
            AxisDefinition::analog_axis(name, slot, axis).map_err(|e| rejected(player, name, e))?;
        self.add_axis(player, definition)
    }

    pub fn add_analog_button(
        &mut self,
        player: PlayerId,
        name: &str,
        slot: u8,
        axis: u8,
    ) -> Result<(), InputError> {
        let definition =
            AxisDefinition::analog_button(name, slot, axis).map_err(|e| rejected(player, name, e))?;
        self.add_axis(player, definition)
    }

    pub fn add_mouse_axis(&mut self, player: PlayerId, name: &str, axis: u8) -> Result<(), InputError> {
        let definition =
            AxisDefinition::mouse_axis(name, axis).map_err(|e| rejected(player, name, e))?;
        self.add_axis(player, definition)
    }

    // ---- Channel mutation ----

    /// Remove a channel, reporting whether it existed
    pub fn remove_axis(&mut self, player: PlayerId, name: &str) -> bool {
        let removed = self.players[player.index()].registry.remove(name);
        if removed {
            self.notifier.notify(player);
        }
        removed
    }

    /// Remove a channel and hand back its definition
    pub fn pop_axis(&mut self, player: PlayerId, name: &str) -> Option<AxisDefinition> {
        let popped = self.players[player.index()].registry.pop_axis(name);
        if popped.is_some() {
            self.notifier.notify(player);
        }
        popped
    }

    /// Copy of a channel's definition
    pub fn duplicate_axis(&self, player: PlayerId, name: &str) -> Option<AxisDefinition> {
        self.axis(player, name).map(|axis| axis.definition().clone())
    }

    /// Restore kind-specific tunables, keeping bindings
    pub fn reset_axis(&mut self, player: PlayerId, name: &str) -> Result<(), InputError> {
        self.axis_mut(player, name)?.definition_mut().reset_tunables();
        self.notifier.notify(player);
        Ok(())
    }

    /// Bind `key` to one of a channel's four binding slots
    pub fn rebind_key(
        &mut self,
        player: PlayerId,
        name: &str,
        slot: BindingSlot,
        key: Key,
    ) -> Result<(), InputError> {
        *self.axis_mut(player, name)?.definition_mut().key_mut(slot) = key;
        debug!("Bound {} to '{}' ({:?}) for {}", key, name, slot, player);
        self.notifier.notify(player);
        Ok(())
    }

    /// Change a channel's kind and device channel together
    pub fn set_axis_type(
        &mut self,
        player: PlayerId,
        name: &str,
        kind: ChannelKind,
        channel: Option<DeviceChannel>,
    ) -> Result<(), InputError> {
        let now = self.clock;
        self.axis_mut(player, name)?.set_type(kind, channel, now)?;
        self.notifier.notify(player);
        Ok(())
    }

    /// Replace a player's whole registry
    pub fn replace_registry(&mut self, player: PlayerId, mut registry: PlayerAxisRegistry) {
        registry.init_all(self.clock);
        self.players[player.index()].registry = registry;
        self.notifier.notify(player);
    }

    fn axis_mut(&mut self, player: PlayerId, name: &str) -> Result<&mut AxisRuntime, InputError> {
        self.players[player.index()]
            .registry
            .get_mut(name)
            .ok_or_else(|| InputError::UnknownChannel(name.to_string()))
    }

    // ---- Device classes and slot correction ----

    /// Switch a player between keyboard and gamepad
    ///
    /// Re-runs slot correction when the class changed. The switched player
    /// is notified once; other re-targeted players once each.
    pub fn set_device_class(&mut self, player: PlayerId, class: DeviceClass) -> bool {
        if !self.assign_class(player, class) {
            return false;
        }
        self.retarget_player(player);
        self.notifier.notify(player);
        for other in PlayerId::ALL {
            if other != player && self.retarget_player(other) {
                self.notifier.notify(other);
            }
        }
        true
    }

    fn assign_class(&mut self, player: PlayerId, class: DeviceClass) -> bool {
        let slot = &mut self.players[player.index()];
        if slot.class == class {
            return false;
        }
        info!("{} now uses {}", player, class);
        slot.class = class;
        true
    }

    /// Point every gamepad player's bindings at its physical pad
    ///
    /// Returns how many players were re-targeted; each gets one notification.
    pub fn correct_device_slots(&mut self) -> usize {
        let mut retargeted = 0;
        for player in PlayerId::ALL {
            if self.retarget_player(player) {
                self.notifier.notify(player);
                retargeted += 1;
            }
        }
        retargeted
    }

    /// Apply slot correction to one player without notifying
    fn retarget_player(&mut self, player: PlayerId) -> bool {
        let targets = corrected_pad_slots(&self.device_classes());
        let Some(target) = targets[player.index()] else {
            return false;
        };

        let mut changed = false;
        for axis in self.players[player.index()].registry.iter_mut() {
            let adjusted = axis.definition_mut().adjust_device_slot(target);
            match adjusted {
                Ok(adjusted) => changed |= adjusted,
                // Skip this channel, keep going with the rest
                Err(e) => warn!("Could not remap '{}' for {}: {}", axis.name(), player, e),
            }
        }
        if changed {
            info!("Remapped {} to gamepad {}", player, target);
        }
        changed
    }

    /// Fold in a new presence list and re-run slot correction
    pub fn on_device_presence_changed(&mut self, present: &[u8]) -> Vec<PresenceEvent> {
        let events = self.presence.update(present);
        self.correct_device_slots();
        events
    }

    /// Poll a presence source; see `on_device_presence_changed`
    pub fn poll_devices<P: DevicePresenceSource + ?Sized>(&mut self, presence: &P) -> Vec<PresenceEvent> {
        self.on_device_presence_changed(&presence.connected_device_slots())
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// With `count` pads present, players 1..=count switch to gamepad
    pub fn assign_gamepads_by_presence(&mut self, count: usize) {
        for player in PlayerId::ALL.into_iter().take(count) {
            self.set_device_class(player, DeviceClass::Gamepad);
        }
    }

    // ---- Per-frame update and rebind capture ----

    /// Advance every channel of every player to `now`
    ///
    /// Returns the capture result if an armed rebind capture resolved.
    pub fn tick(&mut self, now: Instant) -> Option<Captured> {
        for slot in self.players.iter_mut() {
            slot.registry.update_all(now, &self.source);
        }
        self.clock = now;
        self.capture.poll(&self.source)
    }

    /// Arm a capture with the default filter and configured dead zone
    pub fn begin_capture(&mut self) {
        let filter = CaptureFilter::default().with_dead_zone(self.capture_dead_zone);
        self.capture.begin(filter);
    }

    pub fn begin_capture_with(&mut self, filter: CaptureFilter) {
        self.capture.begin(filter);
    }

    pub fn cancel_capture(&mut self) -> bool {
        self.capture.cancel()
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_armed()
    }

    // ---- Subscriptions ----

    pub fn subscribe(&mut self, listener: impl ConfigurationListener + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ---- Persistence ----

    /// Load `player`'s registry for `class` from `store`
    ///
    /// `Ok(false)` if nothing is stored. On success the player switches to
    /// `class` and exactly one notification is raised. Any error leaves the
    /// in-memory registry and class untouched.
    pub fn load_config<C: ConfigStore + ?Sized>(
        &mut self,
        player: PlayerId,
        class: DeviceClass,
        store: &C,
    ) -> Result<bool, InputError> {
        let key = ConfigKey::new(player, class);
        let bytes = match store.read(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No stored config for {}", key);
                return Ok(false);
            }
            Err(e) => {
                warn!("Keeping current config for {}: {}", player, e);
                return Err(e);
            }
        };

        let registry = decode_registry(&bytes, self.clock).map_err(|e| {
            warn!("Keeping current config for {}: {} is unreadable: {}", player, key, e);
            e
        })?;

        info!("Loaded {} ({} channels)", key, registry.len());
        self.players[player.index()].registry = registry;
        self.assign_class(player, class);
        self.retarget_player(player);
        self.notifier.notify(player);
        Ok(true)
    }

    /// Save `player`'s current registry under `class`
    ///
    /// On failure the in-memory registry is kept as is.
    pub fn save_config<C: ConfigStore + ?Sized>(
        &self,
        player: PlayerId,
        class: DeviceClass,
        store: &mut C,
    ) -> Result<(), InputError> {
        let key = ConfigKey::new(player, class);
        let bytes = encode_registry(&self.players[player.index()].registry)?;
        store.write(key, &bytes).map_err(|e| {
            warn!("Failed to save {}: {}", key, e);
            e
        })?;
        info!("Saved {}", key);
        Ok(())
    }

    /// Startup sequence: write missing stock layouts, assign gamepads by
    /// presence, then load every player's current class
    ///
    /// A player whose config cannot be loaded falls back to the in-memory
    /// stock layout when there is one.
    pub fn install_defaults<C: ConfigStore + ?Sized>(&mut self, store: &mut C) -> Result<(), InputError> {
        for player in PlayerId::ALL {
            for class in [DeviceClass::Keyboard, DeviceClass::Gamepad] {
                let key = ConfigKey::new(player, class);
                if store.contains(key) {
                    continue;
                }
                let Some(layout) = default_layout(player, class)? else {
                    continue;
                };
                let registry =
                    PlayerAxisRegistry::from_definitions(layout_name(player), layout, self.clock)?;
                match store.write(key, &encode_registry(&registry)?) {
                    Ok(()) => info!("Installed stock layout {}", key),
                    Err(e) => warn!("Could not install stock layout {}: {}", key, e),
                }
            }
        }

        if self.assign_gamepads_on_startup {
            self.assign_gamepads_by_presence(self.presence.connected_count());
        }

        for player in PlayerId::ALL {
            let class = self.device_class(player);
            let loaded = self.load_config(player, class, store).unwrap_or(false);
            if loaded {
                continue;
            }
            if let Some(layout) = default_layout(player, class)? {
                let registry =
                    PlayerAxisRegistry::from_definitions(layout_name(player), layout, self.clock)?;
                self.replace_registry(player, registry);
            }
        }
        Ok(())
    }
}

fn rejected(player: PlayerId, name: &str, error: InputError) -> InputError {
    warn!("Rejected '{}' for {}: {}", name, player, error);
    error
}
