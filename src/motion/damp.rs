// Critically damped smoothing, after Game Programming Gems 4, 1.10.
// The exp() is replaced by its Taylor approximation, which stays stable for
// any dt and never overshoots the target.

/// Floor for the time constant so omega stays finite.
const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Moves `current` towards `target` like a critically damped spring that
/// reaches it in roughly `smooth_time` seconds.
///
/// `velocity` carries the spring's speed between calls. Passing a fresh
/// zero every call gives a plain exponential approach, fastest far away and
/// slowing down near the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut out = target + (change + temp) * decay;

    // overshoot guard
    if (target - current > 0.0) == (out > target) {
        out = target;
        *velocity = 0.0;
    }
    out
}

/// Shortest signed difference `target - current` in degrees, in (-180, 180].
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// [`smooth_damp`] for angles in degrees; always turns the short way round.
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Constant-speed step towards `target`, never past it.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}
