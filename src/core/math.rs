// Math utilities and helper functions

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp a value to the unit range [-1, 1]
pub fn clamp_unit(value: f32) -> f32 {
    clamp(value, -1.0, 1.0)
}

/// Move a value toward zero by `step`, never crossing it
pub fn decay_toward_zero(value: f32, step: f32) -> f32 {
    if value < 0.0 {
        (value + step).min(0.0)
    } else if value > 0.0 {
        (value - step).max(0.0)
    } else {
        value
    }
}
