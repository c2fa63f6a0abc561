//! Wheel encoder interface
//!
//! Quadrature pulse counting itself happens in hardware (PIO state machine
//! on the Pico) or in a simulator; this module only defines how callers poll
//! the accumulated position.

/// Accumulated quadrature position of one wheel
///
/// The counter wraps at the `i32` range.
pub trait WheelEncoder {
    /// Current position in encoder counts
    fn position(&self) -> i32;

    /// Counts moved since `previous`, correct across wraparound
    fn delta_since(&self, previous: i32) -> i32 {
        self.position().wrapping_sub(previous)
    }
}

impl<T: WheelEncoder + ?Sized> WheelEncoder for &T {
    fn position(&self) -> i32 {
        (**self).position()
    }
}

/// Mock encoder with a settable count
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default, Clone)]
pub struct MockEncoder {
    position: i32,
}

#[cfg(any(test, feature = "mock"))]
impl MockEncoder {
    pub fn new(position: i32) -> Self {
        Self { position }
    }

    /// Add counts, wrapping like the hardware counter
    pub fn step(&mut self, counts: i32) {
        self.position = self.position.wrapping_add(counts);
    }
}

#[cfg(any(test, feature = "mock"))]
impl WheelEncoder for MockEncoder {
    fn position(&self) -> i32 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_and_delta() {
        let mut encoder = MockEncoder::default();
        let start = encoder.position();
        encoder.step(120);
        encoder.step(-20);
        assert_eq!(encoder.position(), 100);
        assert_eq!(encoder.delta_since(start), 100);
    }

    #[test]
    fn test_delta_across_wraparound() {
        let mut encoder = MockEncoder::new(i32::MAX - 5);
        let start = encoder.position();
        encoder.step(10);
        assert_eq!(encoder.position(), i32::MIN + 4);
        assert_eq!(encoder.delta_since(start), 10);
    }

    #[test]
    fn test_reference_is_encoder() {
        fn read<E: WheelEncoder>(encoder: E) -> i32 {
            encoder.position()
        }
        let encoder = MockEncoder::new(-42);
        assert_eq!(read(&encoder), -42);
    }
}
