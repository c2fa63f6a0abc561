//! Scalar signal filters
//!
//! Filters used by the attitude pipeline. Each instance owns its own state,
//! so every sensor channel gets an independent filter.

mod low_pass;

pub use low_pass::{LowPassFilter, DEFAULT_ALPHA};
