// Rebind capture
//
// Waiting for "the next thing the player presses" is an explicit armed state
// polled once per tick, not a suspended task. The host arms it, the manager
// polls it during `tick`, and the first qualifying signal resolves it.

use super::codec::{self, DeviceChannel};
use super::key::Key;
use super::source::RawInputSource;
use log::{debug, info};
use std::collections::HashSet;

/// Dead zone applied to candidate axes unless configured otherwise
pub const DEFAULT_CAPTURE_DEAD_ZONE: f32 = 0.1;

/// Pads whose axes are scanned by the default filter
const DEFAULT_CAPTURE_SLOTS: [u8; 2] = [1, 2];

/// Stick axes left out of the default filter; sticks rest off-center on
/// many pads and would resolve a capture on their own
const DEFAULT_EXCLUDED_AXES: std::ops::RangeInclusive<u8> = 1..=5;

/// What a capture listens to
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFilter {
    /// Candidate axes, checked in order
    pub axes: Vec<DeviceChannel>,
    pub excluded: HashSet<DeviceChannel>,
    pub dead_zone: f32,
}

impl CaptureFilter {
    /// Keys only, no axes
    pub fn keys_only() -> Self {
        Self {
            axes: Vec::new(),
            excluded: HashSet::new(),
            dead_zone: DEFAULT_CAPTURE_DEAD_ZONE,
        }
    }

    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone.clamp(0.0, 0.999);
        self
    }

    fn accepts(&self, channel: &DeviceChannel) -> bool {
        !self.excluded.contains(channel)
    }
}

impl Default for CaptureFilter {
    fn default() -> Self {
        let axes = DEFAULT_CAPTURE_SLOTS
            .iter()
            .flat_map(|slot| codec::joystick_axes_for(*slot))
            .collect();
        let excluded = DEFAULT_CAPTURE_SLOTS
            .iter()
            .flat_map(|slot| {
                DEFAULT_EXCLUDED_AXES.filter_map(move |axis| codec::joystick_axis(*slot, axis).ok())
            })
            .collect();
        Self {
            axes,
            excluded,
            dead_zone: DEFAULT_CAPTURE_DEAD_ZONE,
        }
    }
}

/// Physical input a capture resolved to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Captured {
    Key(Key),
    Axis(DeviceChannel),
}

/// Armed-or-idle capture state
#[derive(Debug, Default)]
pub struct RebindCapture {
    armed: Option<CaptureFilter>,
}

impl RebindCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm with `filter`, replacing any capture in progress
    pub fn begin(&mut self, filter: CaptureFilter) {
        debug!(
            "Rebind capture armed ({} candidate axes)",
            filter.axes.len()
        );
        self.armed = Some(filter);
    }

    /// Disarm; returns whether a capture was in progress
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.armed.take().is_some();
        if was_armed {
            debug!("Rebind capture cancelled");
        }
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Check the raw source once; resolves and disarms on the first key
    /// down edge (in press order) or candidate axis at or beyond the dead zone
    pub fn poll<S: RawInputSource + ?Sized>(&mut self, source: &S) -> Option<Captured> {
        let filter = self.armed.as_ref()?;

        let captured = source
            .keys_down()
            .into_iter()
            .find(|key| !key.is_none())
            .map(Captured::Key)
            .or_else(|| {
                filter
                    .axes
                    .iter()
                    .filter(|channel| filter.accepts(channel))
                    .find(|channel| source.channel_value_raw(**channel).abs() >= filter.dead_zone)
                    .map(|channel| Captured::Axis(*channel))
            })?;

        info!("Rebind capture resolved to {:?}", captured);
        self.armed = None;
        Some(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::codec::joystick_axis;
    use crate::engine::input::source::FrameInput;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_idle_capture_resolves_nothing() {
        let mut capture = RebindCapture::new();
        let mut input = FrameInput::new();
        input.press(Key::from(KeyCode::KeyE));
        assert_eq!(capture.poll(&input), None);
    }

    #[test]
    fn test_key_press_resolves() {
        let mut capture = RebindCapture::new();
        capture.begin(CaptureFilter::default());
        let mut input = FrameInput::new();
        assert_eq!(capture.poll(&input), None);
        assert!(capture.is_armed());

        input.press(Key::from(KeyCode::KeyF));
        assert_eq!(capture.poll(&input), Some(Captured::Key(Key::from(KeyCode::KeyF))));
        assert!(!capture.is_armed());
    }

    #[test]
    fn test_axis_beyond_dead_zone_resolves() {
        let mut capture = RebindCapture::new();
        capture.begin(CaptureFilter::default());
        let mut input = FrameInput::new();
        let trigger = joystick_axis(2, 9).unwrap();

        input.set_axis(trigger, 0.05);
        assert_eq!(capture.poll(&input), None);

        input.set_axis(trigger, -0.5);
        assert_eq!(capture.poll(&input), Some(Captured::Axis(trigger)));
    }

    #[test]
    fn test_axis_at_dead_zone_resolves() {
        let mut capture = RebindCapture::new();
        capture.begin(CaptureFilter::default().with_dead_zone(0.25));
        let mut input = FrameInput::new();
        let trigger = joystick_axis(1, 10).unwrap();

        input.set_axis(trigger, 0.24);
        assert_eq!(capture.poll(&input), None);

        input.set_axis(trigger, 0.25);
        assert_eq!(capture.poll(&input), Some(Captured::Axis(trigger)));
    }

    #[test]
    fn test_first_pressed_key_wins() {
        let order = [KeyCode::KeyZ, KeyCode::KeyA, KeyCode::KeyM, KeyCode::Digit1, KeyCode::Tab];
        let mut capture = RebindCapture::new();
        capture.begin(CaptureFilter::keys_only());
        let mut input = FrameInput::new();
        for code in order {
            input.press(Key::from(code));
        }
        assert_eq!(capture.poll(&input), Some(Captured::Key(Key::from(KeyCode::KeyZ))));
    }

    #[test]
    fn test_excluded_stick_axes_are_ignored() {
        let mut capture = RebindCapture::new();
        capture.begin(CaptureFilter::default());
        let mut input = FrameInput::new();
        input.set_axis(joystick_axis(1, 1).unwrap(), 1.0);
        input.set_axis(joystick_axis(2, 5).unwrap(), 1.0);
        assert_eq!(capture.poll(&input), None);

        // Pads 3 and 4 are not candidates
        input.set_axis(joystick_axis(3, 9).unwrap(), 1.0);
        assert_eq!(capture.poll(&input), None);
    }

    #[test]
    fn test_keys_only_filter() {
        let mut capture = RebindCapture::new();
        capture.begin(CaptureFilter::keys_only());
        let mut input = FrameInput::new();
        input.set_axis(joystick_axis(1, 9).unwrap(), 1.0);
        assert_eq!(capture.poll(&input), None);
    }

    #[test]
    fn test_cancel() {
        let mut capture = RebindCapture::new();
        assert!(!capture.cancel());
        capture.begin(CaptureFilter::default());
        assert!(capture.cancel());

        let mut input = FrameInput::new();
        input.press(Key::from(KeyCode::KeyE));
        assert_eq!(capture.poll(&input), None);
    }

    #[test]
    fn test_default_filter_shape() {
        let filter = CaptureFilter::default();
        assert_eq!(filter.axes.len(), 56);
        assert_eq!(filter.excluded.len(), 10);
        assert_eq!(filter.dead_zone, 0.1);
    }
}
