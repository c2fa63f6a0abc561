//! Single-pole IIR low-pass filter
//!
//! Recursive smoothing with a fixed history weight:
//!
//! ```text
//! filtered = alpha * previous + (1 - alpha) * raw
//! ```
//!
//! The default `alpha = 0.8` keeps 80% of the history and takes 20% of each
//! new sample, which rejects magnetic and vibration noise at the cost of a
//! slow response.

/// Default history weight
pub const DEFAULT_ALPHA: f32 = 0.8;

/// Single-pole low-pass filter for one scalar channel
///
/// # Examples
///
/// ```
/// use slampibot_core::filter::LowPassFilter;
///
/// let mut filter = LowPassFilter::new();
/// let first = filter.update(10.0);
/// assert!((first - 2.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter {
    alpha: f32,
    filtered_value: f32,
}

impl LowPassFilter {
    /// Create a filter with the default alpha, starting from 0.0
    pub fn new() -> Self {
        Self::with_seed(0.0)
    }

    /// Create a filter with the default alpha, starting from `seed`
    pub fn with_seed(seed: f32) -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            filtered_value: seed,
        }
    }

    /// Create a filter with a custom history weight
    ///
    /// Alpha is clamped to [0.0, 1.0]. `1.0` holds the seed forever,
    /// `0.0` passes raw samples straight through.
    pub fn with_alpha(alpha: f32, seed: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            filtered_value: seed,
        }
    }

    /// Feed one raw sample and return the new filtered value
    #[inline]
    pub fn update(&mut self, raw: f32) -> f32 {
        self.filtered_value = self.alpha * self.filtered_value + (1.0 - self.alpha) * raw;
        self.filtered_value
    }

    /// Last filtered value
    pub fn value(&self) -> f32 {
        self.filtered_value
    }

    /// History weight in use
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Restart the filter from `seed`
    pub fn reset(&mut self, seed: f32) {
        self.filtered_value = seed;
    }
}

impl Default for LowPassFilter {
    fn default() -> Self {
        Self::new()
    }
}
