// Per-channel runtime state machine
//
// Turns level-only raw signals into button and axis semantics: the digital
// axis integrator (sensitivity, gravity, snap) and the analog button debounce
// that derives one-tick press/release edges.

use super::definition::AxisDefinition;
use crate::core::math::{clamp_unit, decay_toward_zero};
use crate::engine::input::codec::DeviceChannel;
use crate::engine::input::key::Key;
use crate::engine::input::kind::ChannelKind;
use crate::engine::input::source::RawInputSource;
use crate::engine::input::InputError;
use std::time::Instant;

const NEUTRAL: f32 = 0.0;
const POSITIVE: f32 = 1.0;
const NEGATIVE: f32 = -1.0;

/// Level at which an analog button counts as pressed
const ANALOG_PRESS_LEVEL: f32 = 1.0;

/// Edge state of an analog button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    JustPressed,
    Pressed,
    JustReleased,
}

impl ButtonState {
    /// One debounce step given whether the raw level is pressed
    pub fn next(self, active: bool) -> Self {
        match (self, active) {
            (ButtonState::Released | ButtonState::JustReleased, true) => ButtonState::JustPressed,
            (ButtonState::JustPressed | ButtonState::Pressed, true) => ButtonState::Pressed,
            (ButtonState::JustPressed | ButtonState::Pressed, false) => ButtonState::JustReleased,
            (ButtonState::Released | ButtonState::JustReleased, false) => ButtonState::Released,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, ButtonState::JustPressed | ButtonState::Pressed)
    }
}

/// Live state owned by a single channel
#[derive(Debug, Clone, Copy)]
struct AxisState {
    /// Integrated value, digital axes only
    value: f32,
    /// Debounced edge state, analog buttons only
    button: ButtonState,
    last_tick: Instant,
    /// Seconds between the last two ticks
    delta_time: f32,
}

impl AxisState {
    fn new(now: Instant) -> Self {
        Self {
            value: NEUTRAL,
            button: ButtonState::Released,
            last_tick: now,
            delta_time: 0.0,
        }
    }
}

/// A virtual channel: definition plus live state
#[derive(Debug, Clone)]
pub struct AxisRuntime {
    definition: AxisDefinition,
    state: AxisState,
}

impl AxisRuntime {
    /// Create a runtime, starting the clock at `now`
    pub fn new(definition: AxisDefinition, now: Instant) -> Self {
        Self {
            definition,
            state: AxisState::new(now),
        }
    }

    /// Reset live state to neutral
    pub fn init(&mut self, now: Instant) {
        self.state = AxisState::new(now);
    }

    pub fn definition(&self) -> &AxisDefinition {
        &self.definition
    }

    /// Mutable access to bindings and tunables; live state is left as is
    pub fn definition_mut(&mut self) -> &mut AxisDefinition {
        &mut self.definition
    }

    pub fn into_definition(self) -> AxisDefinition {
        self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn kind(&self) -> ChannelKind {
        self.definition.kind()
    }

    /// Current integrator value (digital axes)
    pub fn value(&self) -> f32 {
        self.state.value
    }

    /// Current debounce state (analog buttons)
    pub fn button_state(&self) -> ButtonState {
        self.state.button
    }

    /// Seconds between the last two ticks
    pub fn delta_time(&self) -> f32 {
        self.state.delta_time
    }

    /// Change kind and channel; live state is reset on success
    pub fn set_type(
        &mut self,
        kind: ChannelKind,
        channel: Option<DeviceChannel>,
        now: Instant,
    ) -> Result<(), InputError> {
        self.definition.set_type(kind, channel)?;
        self.init(now);
        Ok(())
    }

    /// Advance the state machine to `now`
    pub fn update<S: RawInputSource + ?Sized>(&mut self, now: Instant, source: &S) {
        // Non-decreasing clock; a stale `now` yields a zero step
        self.state.delta_time = now
            .checked_duration_since(self.state.last_tick)
            .map_or(0.0, |d| d.as_secs_f32());
        self.state.last_tick = now;

        match self.definition.kind() {
            ChannelKind::DigitalAxis => self.integrate(source),
            ChannelKind::AnalogButton => self.debounce(source),
            ChannelKind::Button | ChannelKind::MouseAxis | ChannelKind::AnalogAxis => {}
        }
    }

    fn integrate<S: RawInputSource + ?Sized>(&mut self, source: &S) {
        let def = &self.definition;
        let dt = self.state.delta_time;
        let step = def.sensitivity * dt;
        let positive = held(source, def.positive, def.alt_positive);
        let negative = held(source, def.negative, def.alt_negative);
        let value = &mut self.state.value;

        // Holding both keys integrates toward negative
        if positive && !negative {
            if *value < NEUTRAL && def.snap {
                *value = NEUTRAL;
            }
            *value = (*value + step).min(POSITIVE);
        } else if negative {
            if *value > NEUTRAL && def.snap {
                *value = NEUTRAL;
            }
            *value = (*value - step).max(NEGATIVE);
        } else {
            *value = decay_toward_zero(*value, def.gravity * dt);
        }
    }

    fn debounce<S: RawInputSource + ?Sized>(&mut self, source: &S) {
        let level = self
            .definition
            .device_channel()
            .map_or(NEUTRAL, |channel| source.channel_value_raw(channel));
        let level = self.apply_invert(level);
        self.state.button = self.state.button.next(level >= ANALOG_PRESS_LEVEL);
    }

    fn apply_invert(&self, value: f32) -> f32 {
        if self.definition.invert {
            -value
        } else {
            value
        }
    }

    pub fn get_button<S: RawInputSource + ?Sized>(&self, source: &S) -> bool {
        let def = &self.definition;
        match def.kind() {
            ChannelKind::Button => held(source, def.positive, def.alt_positive),
            ChannelKind::AnalogButton => self.state.button.is_down(),
            _ => false,
        }
    }

    pub fn get_button_down<S: RawInputSource + ?Sized>(&self, source: &S) -> bool {
        let def = &self.definition;
        match def.kind() {
            ChannelKind::Button => {
                source.is_key_down(def.positive) || source.is_key_down(def.alt_positive)
            }
            ChannelKind::AnalogButton => self.state.button == ButtonState::JustPressed,
            _ => false,
        }
    }

    pub fn get_button_up<S: RawInputSource + ?Sized>(&self, source: &S) -> bool {
        let def = &self.definition;
        match def.kind() {
            ChannelKind::Button => {
                source.is_key_up(def.positive) || source.is_key_up(def.alt_positive)
            }
            ChannelKind::AnalogButton => self.state.button == ButtonState::JustReleased,
            _ => false,
        }
    }

    /// Smoothed axis value
    ///
    /// Analog axes are clamped to [-1, 1] after scaling, mouse axes are not.
    pub fn get_axis<S: RawInputSource + ?Sized>(&self, source: &S) -> f32 {
        let def = &self.definition;
        let value = match (def.kind(), def.device_channel()) {
            (ChannelKind::DigitalAxis, _) => self.state.value,
            (ChannelKind::MouseAxis, Some(channel)) => {
                source.channel_value(channel) * def.sensitivity
            }
            (ChannelKind::AnalogAxis, Some(channel)) => {
                let raw = source.channel_value(channel);
                if raw.abs() < def.dead_zone {
                    NEUTRAL
                } else {
                    clamp_unit(raw * def.sensitivity)
                }
            }
            _ => NEUTRAL,
        };
        self.apply_invert(value)
    }

    /// Unsmoothed axis value; digital axes read -1, 0 or 1
    pub fn get_axis_raw<S: RawInputSource + ?Sized>(&self, source: &S) -> f32 {
        let def = &self.definition;
        let value = match (def.kind(), def.device_channel()) {
            (ChannelKind::DigitalAxis, _) => {
                if held(source, def.positive, def.alt_positive) {
                    POSITIVE
                } else if held(source, def.negative, def.alt_negative) {
                    NEGATIVE
                } else {
                    NEUTRAL
                }
            }
            (ChannelKind::MouseAxis | ChannelKind::AnalogAxis, Some(channel)) => {
                source.channel_value_raw(channel)
            }
            _ => NEUTRAL,
        };
        self.apply_invert(value)
    }

    /// Any of the four bindings is held
    pub fn any_key<S: RawInputSource + ?Sized>(&self, source: &S) -> bool {
        self.definition.keys().iter().any(|k| source.is_key_held(*k))
    }

    /// Any of the four bindings went down this frame
    pub fn any_key_down<S: RawInputSource + ?Sized>(&self, source: &S) -> bool {
        self.definition.keys().iter().any(|k| source.is_key_down(*k))
    }

    /// Any of the four bindings went up this frame
    pub fn any_key_up<S: RawInputSource + ?Sized>(&self, source: &S) -> bool {
        self.definition.keys().iter().any(|k| source.is_key_up(*k))
    }
}

fn held<S: RawInputSource + ?Sized>(source: &S, key: Key, alt: Key) -> bool {
    source.is_key_held(key) || source.is_key_held(alt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::codec::{joystick_axis, mouse_axis};
    use crate::engine::input::source::FrameInput;
    use approx::assert_relative_eq;
    use std::time::Duration;
    use winit::keyboard::KeyCode;

    const RIGHT: KeyCode = KeyCode::KeyD;
    const LEFT: KeyCode = KeyCode::KeyA;

    fn digital(sensitivity: f32, gravity: f32, snap: bool) -> AxisDefinition {
        AxisDefinition::digital_axis("Horizontal", Key::from(RIGHT), Key::from(LEFT))
            .with_sensitivity(sensitivity)
            .with_gravity(gravity)
            .with_snap(snap)
    }

    /// Tick `runtime` `steps` times, `dt` seconds apart
    fn run(runtime: &mut AxisRuntime, input: &FrameInput, clock: &mut Instant, dt: f32, steps: u32) {
        for _ in 0..steps {
            *clock += Duration::from_secs_f32(dt);
            runtime.update(*clock, input);
        }
    }

    #[test]
    fn test_button_state_cycle() {
        let mut state = ButtonState::Released;
        let levels = [false, true, true, true, false, false];
        let expected = [
            ButtonState::Released,
            ButtonState::JustPressed,
            ButtonState::Pressed,
            ButtonState::Pressed,
            ButtonState::JustReleased,
            ButtonState::Released,
        ];
        for (active, want) in levels.iter().zip(expected) {
            state = state.next(*active);
            assert_eq!(state, want);
        }
    }

    #[test]
    fn test_integrator_ramps_to_one() {
        let start = Instant::now();
        let mut clock = start;
        let mut runtime = AxisRuntime::new(digital(2.0, 1.0, true), start);
        let mut input = FrameInput::new();
        input.press(Key::from(RIGHT));

        run(&mut runtime, &input, &mut clock, 0.1, 3);
        assert_relative_eq!(runtime.value(), 0.6, epsilon = 1e-4);

        run(&mut runtime, &input, &mut clock, 0.1, 5);
        assert_relative_eq!(runtime.value(), 1.0);
        assert_relative_eq!(runtime.get_axis(&input), 1.0);
    }

    #[test]
    fn test_gravity_decays_without_overshoot() {
        let start = Instant::now();
        let mut clock = start;
        let mut runtime = AxisRuntime::new(digital(10.0, 2.0, true), start);
        let mut input = FrameInput::new();
        input.press(Key::from(LEFT));
        run(&mut runtime, &input, &mut clock, 0.1, 1);
        assert_relative_eq!(runtime.value(), -1.0);

        input.release(Key::from(LEFT));
        run(&mut runtime, &input, &mut clock, 0.1, 2);
        assert_relative_eq!(runtime.value(), -0.6, epsilon = 1e-4);

        run(&mut runtime, &input, &mut clock, 0.1, 10);
        assert_eq!(runtime.value(), 0.0);
    }

    #[test]
    fn test_snap_resets_before_reversing() {
        let start = Instant::now();
        let mut clock = start;
        let mut runtime = AxisRuntime::new(digital(5.0, 0.0, true), start);
        let mut input = FrameInput::new();
        input.press(Key::from(LEFT));
        run(&mut runtime, &input, &mut clock, 0.1, 1);
        assert_relative_eq!(runtime.value(), -0.5, epsilon = 1e-4);

        input.release(Key::from(LEFT));
        input.press(Key::from(RIGHT));
        run(&mut runtime, &input, &mut clock, 0.1, 1);
        assert_relative_eq!(runtime.value(), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_no_snap_integrates_through_zero() {
        let start = Instant::now();
        let mut clock = start;
        let mut runtime = AxisRuntime::new(digital(5.0, 0.0, false), start);
        let mut input = FrameInput::new();
        input.press(Key::from(LEFT));
        run(&mut runtime, &input, &mut clock, 0.1, 1);

        input.release(Key::from(LEFT));
        input.press(Key::from(RIGHT));
        run(&mut runtime, &input, &mut clock, 0.1, 1);
        assert_relative_eq!(runtime.value(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_both_held_integrates_negative_but_raw_reads_positive() {
        let start = Instant::now();
        let mut clock = start;
        let mut runtime = AxisRuntime::new(digital(1.0, 1.0, true), start);
        let mut input = FrameInput::new();
        input.press(Key::from(LEFT));
        input.press(Key::from(RIGHT));
        run(&mut runtime, &input, &mut clock, 0.25, 1);
        assert!(runtime.value() < 0.0);
        assert_relative_eq!(runtime.value(), -0.25, epsilon = 1e-4);
        assert_eq!(runtime.get_axis_raw(&input), 1.0);
    }

    #[test]
    fn test_alternate_keys_drive_integrator() {
        let start = Instant::now();
        let mut clock = start;
        let def = digital(1.0, 1.0, true)
            .with_alternates(Key::from(KeyCode::ArrowRight), Key::from(KeyCode::ArrowLeft));
        let mut runtime = AxisRuntime::new(def, start);
        let mut input = FrameInput::new();
        input.press(Key::from(KeyCode::ArrowLeft));
        run(&mut runtime, &input, &mut clock, 0.5, 1);
        assert_relative_eq!(runtime.value(), -0.5, epsilon = 1e-4);
        assert_eq!(runtime.get_axis_raw(&input), -1.0);
    }

    #[test]
    fn test_analog_button_debounce_sequence() {
        let start = Instant::now();
        let mut clock = start;
        let channel = joystick_axis(1, 9).unwrap();
        let def = AxisDefinition::analog_button("Attack", 1, 9).unwrap();
        let mut runtime = AxisRuntime::new(def, start);
        let mut input = FrameInput::new();

        let levels = [0.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        let expected = [
            ButtonState::Released,
            ButtonState::JustPressed,
            ButtonState::Pressed,
            ButtonState::Pressed,
            ButtonState::JustReleased,
            ButtonState::Released,
        ];
        for (level, want) in levels.into_iter().zip(expected) {
            input.set_axis(channel, level);
            run(&mut runtime, &input, &mut clock, 0.016, 1);
            assert_eq!(runtime.button_state(), want);
            assert_eq!(runtime.get_button_down(&input), want == ButtonState::JustPressed);
            assert_eq!(runtime.get_button_up(&input), want == ButtonState::JustReleased);
        }
    }

    /// Source whose smoothed channel value lags the raw level
    struct LaggingSource {
        smoothed: f32,
        raw: f32,
    }

    impl RawInputSource for LaggingSource {
        fn is_key_held(&self, _key: Key) -> bool {
            false
        }

        fn is_key_down(&self, _key: Key) -> bool {
            false
        }

        fn is_key_up(&self, _key: Key) -> bool {
            false
        }

        fn channel_value(&self, _channel: DeviceChannel) -> f32 {
            self.smoothed
        }

        fn channel_value_raw(&self, _channel: DeviceChannel) -> f32 {
            self.raw
        }

        fn keys_down(&self) -> Vec<Key> {
            Vec::new()
        }
    }

    #[test]
    fn test_analog_button_reads_raw_level() {
        let start = Instant::now();
        let def = AxisDefinition::analog_button("Attack", 1, 9).unwrap();
        let mut runtime = AxisRuntime::new(def, start);
        let source = LaggingSource {
            smoothed: 0.5,
            raw: 1.0,
        };

        runtime.update(start + Duration::from_millis(16), &source);
        assert_eq!(runtime.button_state(), ButtonState::JustPressed);
        assert!(runtime.get_button_down(&source));
    }

    #[test]
    fn test_inverted_analog_button() {
        let start = Instant::now();
        let mut clock = start;
        let channel = joystick_axis(2, 3).unwrap();
        let def = AxisDefinition::analog_button("Trigger", 2, 3)
            .unwrap()
            .with_invert(true);
        let mut runtime = AxisRuntime::new(def, start);
        let mut input = FrameInput::new();

        input.set_axis(channel, -1.0);
        run(&mut runtime, &input, &mut clock, 0.016, 1);
        assert!(runtime.get_button(&input));

        input.set_axis(channel, 1.0);
        run(&mut runtime, &input, &mut clock, 0.016, 1);
        assert!(!runtime.get_button(&input));
    }

    #[test]
    fn test_partial_level_is_not_pressed() {
        let start = Instant::now();
        let mut clock = start;
        let channel = joystick_axis(1, 10).unwrap();
        let mut runtime =
            AxisRuntime::new(AxisDefinition::analog_button("Attack", 1, 10).unwrap(), start);
        let mut input = FrameInput::new();
        input.set_axis(channel, 0.99);
        run(&mut runtime, &input, &mut clock, 0.016, 1);
        assert_eq!(runtime.button_state(), ButtonState::Released);
    }

    #[test]
    fn test_button_kind_reads_keys() {
        let start = Instant::now();
        let def = AxisDefinition::button("Dodge", Key::from(KeyCode::Space), Key::from(KeyCode::KeyJ));
        let runtime = AxisRuntime::new(def, start);
        let mut input = FrameInput::new();

        input.press(Key::from(KeyCode::KeyJ));
        assert!(runtime.get_button(&input));
        assert!(runtime.get_button_down(&input));
        input.end_frame();
        input.release(Key::from(KeyCode::KeyJ));
        assert!(!runtime.get_button(&input));
        assert!(runtime.get_button_up(&input));
        assert_eq!(runtime.get_axis(&input), 0.0);
    }

    #[test]
    fn test_analog_axis_dead_zone_scale_and_clamp() {
        let start = Instant::now();
        let channel = joystick_axis(1, 1).unwrap();
        let def = AxisDefinition::analog_axis("Horizontal", 1, 1).unwrap();
        let runtime = AxisRuntime::new(def, start);
        let mut input = FrameInput::new();

        input.set_axis(channel, 0.15);
        assert_eq!(runtime.get_axis(&input), 0.0);

        input.set_axis(channel, 0.3);
        assert_relative_eq!(runtime.get_axis(&input), 0.6, epsilon = 1e-6);

        input.set_axis(channel, -0.9);
        assert_relative_eq!(runtime.get_axis(&input), -1.0);
        assert_relative_eq!(runtime.get_axis_raw(&input), -0.9);
    }

    #[test]
    fn test_mouse_axis_scaled_and_inverted() {
        let start = Instant::now();
        let channel = mouse_axis(1).unwrap();
        let def = AxisDefinition::mouse_axis("CamVertical", 1)
            .unwrap()
            .with_sensitivity(0.5)
            .with_invert(true);
        let runtime = AxisRuntime::new(def, start);
        let mut input = FrameInput::new();
        input.add_delta(channel, 30.0);
        assert_relative_eq!(runtime.get_axis(&input), -15.0);
        assert_relative_eq!(runtime.get_axis_raw(&input), -30.0);
    }

    #[test]
    fn test_any_key_checks_all_four_bindings() {
        let start = Instant::now();
        let def = digital(1.0, 1.0, true)
            .with_alternates(Key::None, Key::from(KeyCode::ArrowLeft));
        let runtime = AxisRuntime::new(def, start);
        let mut input = FrameInput::new();
        assert!(!runtime.any_key(&input));

        input.press(Key::from(KeyCode::ArrowLeft));
        assert!(runtime.any_key(&input));
        assert!(runtime.any_key_down(&input));
        input.end_frame();
        input.release(Key::from(KeyCode::ArrowLeft));
        assert!(runtime.any_key_up(&input));
    }

    #[test]
    fn test_set_type_resets_state() {
        let start = Instant::now();
        let mut clock = start;
        let mut runtime = AxisRuntime::new(digital(1.0, 0.0, true), start);
        let mut input = FrameInput::new();
        input.press(Key::from(RIGHT));
        run(&mut runtime, &input, &mut clock, 0.5, 1);
        assert!(runtime.value() > 0.0);

        let channel = joystick_axis(1, 2).unwrap();
        runtime
            .set_type(ChannelKind::AnalogAxis, Some(channel), clock)
            .unwrap();
        assert_eq!(runtime.value(), 0.0);
        assert_eq!(runtime.kind(), ChannelKind::AnalogAxis);

        // A failed change keeps kind and state
        assert!(runtime
            .set_type(ChannelKind::MouseAxis, Some(channel), clock)
            .is_err());
        assert_eq!(runtime.kind(), ChannelKind::AnalogAxis);
    }

    #[test]
    fn test_delta_time_tracks_ticks() {
        let start = Instant::now();
        let mut runtime = AxisRuntime::new(AxisDefinition::new("Pause"), start);
        let input = FrameInput::new();
        runtime.update(start + Duration::from_millis(250), &input);
        assert_relative_eq!(runtime.delta_time(), 0.25, epsilon = 1e-4);

        // Going backwards in time is treated as no elapsed time
        runtime.update(start, &input);
        assert_eq!(runtime.delta_time(), 0.0);
    }
}
