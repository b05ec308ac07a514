//! Blocking delay adapter

use embedded_hal::delay::DelayNs;
use rookery_core::traits::Delay;

/// Adapts an `embedded-hal` delay provider to the controller's [`Delay`]
pub struct HalDelay<D> {
    inner: D,
}

impl<D: DelayNs> HalDelay<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: DelayNs> Delay for HalDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.inner.delay_ms(ms);
    }
}
