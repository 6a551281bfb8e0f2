/// Exponential growth rate of the multiplier, per second
pub const GROWTH_RATE_PER_SEC: f64 = 0.1;

/// Payout multiplier after `elapsed_ms` of a running round: `e^(0.1 * t)`, t in seconds
pub fn multiplier_at(elapsed_ms: u64) -> f64 {
    (GROWTH_RATE_PER_SEC * elapsed_ms as f64 / 1000.0).exp()
}

/// First whole millisecond at which the multiplier reaches `multiplier`
pub fn elapsed_for_multiplier(multiplier: f64) -> u64 {
    if multiplier <= 1.0 {
        return 0;
    }
    let mut ms = (multiplier.ln() / GROWTH_RATE_PER_SEC * 1000.0).floor() as u64;
    // ln/exp rounding can leave us one step short
    while multiplier_at(ms) < multiplier {
        ms += 1;
    }
    while ms > 0 && multiplier_at(ms - 1) >= multiplier {
        ms -= 1;
    }
    ms
}
