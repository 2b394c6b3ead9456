// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Write as _;
use core::ops::{Add, Mul, Sub};

/// A geographic position: degrees of latitude and longitude plus an altitude in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
    /// Altitude in meters. How it is interpreted depends on the [`AltitudeMode`].
    pub altitude: f64,
}

impl Position {
    /// Creates a position from degrees and meters.
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Returns this position translated by the given deltas.
    #[must_use]
    pub fn translated(&self, d_latitude: f64, d_longitude: f64, d_altitude: f64) -> Self {
        Self::new(
            self.latitude + d_latitude,
            self.longitude + d_longitude,
            self.altitude + d_altitude,
        )
    }
}

/// How a symbol's altitude relates to the terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AltitudeMode {
    /// Ignore the altitude and place the symbol on the terrain surface.
    ClampToGround,
    /// The altitude is measured from the terrain surface.
    RelativeToGround,
    /// The altitude is measured from the ellipsoid.
    #[default]
    Absolute,
}

/// A point or direction in model or screen space.
///
/// In screen space, `z` carries the depth value in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Returns a unit vector in the same direction, or zero for the zero vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Units for formatted altitudes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AltitudeUnits {
    /// Meters, `m`.
    #[default]
    Meters,
    /// Feet, `ft`.
    Feet,
}

/// Formatting rules for the location and altitude modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitsFormat {
    /// Format angles as degrees, minutes and seconds instead of decimal degrees.
    pub show_dms: bool,
    /// Units for altitudes.
    pub altitude_units: AltitudeUnits,
}

impl Default for UnitsFormat {
    fn default() -> Self {
        Self {
            show_dms: true,
            altitude_units: AltitudeUnits::Meters,
        }
    }
}

impl UnitsFormat {
    /// Formats a latitude/longitude pair, e.g. `34°07'12"N 118°13'12"W`.
    pub fn lat_lon(&self, position: &Position) -> String {
        let mut s = String::new();
        self.push_angle(&mut s, position.latitude, 'N', 'S');
        s.push(' ');
        self.push_angle(&mut s, position.longitude, 'E', 'W');
        s
    }

    /// Formats an altitude in meters using the configured units, e.g. `1200 m`.
    pub fn altitude(&self, meters: f64) -> String {
        match self.altitude_units {
            AltitudeUnits::Meters => format!("{} m", meters.round()),
            AltitudeUnits::Feet => format!("{} ft", (meters * 3.280_839_895).round()),
        }
    }

    fn push_angle(&self, s: &mut String, degrees: f64, positive: char, negative: char) {
        let hemisphere = if degrees < 0.0 { negative } else { positive };
        let abs = degrees.abs();
        if self.show_dms {
            // Round to whole seconds first so 59.9999" does not print as 60".
            let total_seconds = (abs * 3600.0).round();
            let d = (total_seconds / 3600.0).floor();
            let m = ((total_seconds - d * 3600.0) / 60.0).floor();
            let sec = total_seconds - d * 3600.0 - m * 60.0;
            let _ = write!(s, "{d}\u{b0}{m:02}'{sec:02}\"{hemisphere}");
        } else {
            let _ = write!(s, "{abs:.4}\u{b0}{hemisphere}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms_formatting() {
        let format = UnitsFormat::default();
        let s = format.lat_lon(&Position::new(34.12, -118.22, 0.0));
        assert_eq!(s, "34\u{b0}07'12\"N 118\u{b0}13'12\"W");
    }

    #[test]
    fn test_decimal_formatting() {
        let format = UnitsFormat {
            show_dms: false,
            ..UnitsFormat::default()
        };
        let s = format.lat_lon(&Position::new(-1.5, 2.25, 0.0));
        assert_eq!(s, "1.5000\u{b0}S 2.2500\u{b0}E");
    }

    #[test]
    fn test_altitude_units() {
        let mut format = UnitsFormat::default();
        assert_eq!(format.altitude(1200.4), "1200 m");
        format.altitude_units = AltitudeUnits::Feet;
        assert_eq!(format.altitude(100.0), "328 ft");
    }
}
