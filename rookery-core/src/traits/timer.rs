//! Blocking delay trait

/// Blocking delay source
///
/// Pulse widths and settle times are enforced by blocking on this trait.
/// A monotonic-clock scheduler may implement it as long as each call
/// returns only after the requested time has elapsed.
pub trait Delay {
    /// Block for at least `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}
