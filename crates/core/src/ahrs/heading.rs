//! 8-point compass heading derived from yaw

use core::fmt;

/// Compass point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// Half-open bands `(lower, upper]` in degrees, checked in order.
///
/// North is handled separately because it wraps around 0°.
const BANDS: [(f32, f32, Heading); 7] = [
    (22.0, 67.0, Heading::NE),
    (67.0, 112.0, Heading::E),
    (112.0, 157.0, Heading::SE),
    (157.0, 202.0, Heading::S),
    (202.0, 247.0, Heading::SW),
    (247.0, 292.0, Heading::W),
    (292.0, 337.0, Heading::NW),
];

impl Heading {
    /// Map a yaw angle in degrees to a compass point
    ///
    /// Bands are exclusive on the lower bound and inclusive on the upper
    /// bound, so a yaw exactly on a boundary belongs to the band below it.
    /// North covers `(337, 360]` and `[0, 22]`.
    ///
    /// Every band is evaluated; a later match overrides an earlier one.
    /// Returns `None` for angles outside `[0, 360]` and for NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use slampibot_core::ahrs::Heading;
    ///
    /// assert_eq!(Heading::from_yaw(22.0), Some(Heading::N));
    /// assert_eq!(Heading::from_yaw(22.0001), Some(Heading::NE));
    /// assert_eq!(Heading::from_yaw(180.0), Some(Heading::S));
    /// ```
    pub fn from_yaw(degrees: f32) -> Option<Heading> {
        let mut heading = None;

        if (degrees > 337.0 && degrees <= 360.0) || (0.0..=22.0).contains(&degrees) {
            heading = Some(Heading::N);
        }
        for (lower, upper, band) in BANDS {
            if degrees > lower && degrees <= upper {
                heading = Some(band);
            }
        }

        heading
    }

    /// Compass symbol ("N", "NE", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Heading::N => "N",
            Heading::NE => "NE",
            Heading::E => "E",
            Heading::SE => "SE",
            Heading::S => "S",
            Heading::SW => "SW",
            Heading::W => "W",
            Heading::NW => "NW",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
