// Frame and poll timing for the input host
//
// The input manager needs a monotonically non-decreasing `now` once per
// frame, and gamepad presence is polled on a much coarser period. Both are
// driven from the same event loop so they never interleave.

use std::time::{Duration, Instant};

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Per-frame timing state
pub struct FrameClock {
    /// Time of last frame
    last_frame_time: Instant,

    /// Time when the clock started
    start_time: Instant,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,

    /// Time since last frame, in seconds
    delta_time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            last_frame_time: now,
            start_time: now,
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            current_fps: 0.0,
            delta_time: 0.0,
        }
    }

    /// Begin a new frame at `now`, returning the tick time to hand to the
    /// input manager
    ///
    /// A `now` earlier than the previous frame is clamped so ticks never go
    /// backwards.
    pub fn begin_frame(&mut self, now: Instant) -> Instant {
        let now = now.max(self.last_frame_time);
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.frame_count += 1;

        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        self.delta_time = frame_time.as_secs_f32();
        now
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time between the clock start and the last frame
    pub fn elapsed(&self) -> Duration {
        self.last_frame_time.duration_since(self.start_time)
    }

    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Fires at most once per `period`
pub struct PollTimer {
    period: Duration,
    next_due: Instant,
}

impl PollTimer {
    /// First poll is due immediately
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now,
        }
    }

    /// Whether a poll is due at `now`; re-arms when it is
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
