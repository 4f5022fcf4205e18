use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

/// A "part" of a location
pub type LocationComponent = f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// A point on the globe in degrees
pub struct Coordinate {
    /// Latitude
    pub lat: LocationComponent,
    /// Longitude
    pub long: LocationComponent,
}

impl Coordinate {
    pub fn new(lat: LocationComponent, long: LocationComponent) -> Self {
        Self { lat, long }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.long)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A single sample reported by the platform
pub struct Fix {
    pub coordinate: Coordinate,
    /// Radius of uncertainty of [Fix::coordinate] in meters
    pub horizontal_accuracy: f64,
    /// Meters above sea level
    pub altitude: f64,
    /// Uncertainty of [Fix::altitude] in meters
    pub vertical_accuracy: f64,
    /// Floor of the building the device is in, only known indoors
    pub floor: Option<i32>,
    /// Meters per second, None when the platform couldn't determine it
    pub speed: Option<f64>,
    /// Direction of travel in degrees from true north
    pub course: Option<f64>,
    pub timestamp: UtcDT,
}

impl Fix {
    /// A fix with only a coordinate known, every other measurement is zeroed or absent
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            horizontal_accuracy: 0.0,
            altitude: 0.0,
            vertical_accuracy: 0.0,
            floor: None,
            speed: None,
            course: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Compass orientation of the device
pub struct Heading {
    /// Degrees from true north
    pub true_heading: f64,
    /// Degrees from magnetic north
    pub magnetic_heading: f64,
    /// Maximum deviation in degrees, negative if the heading is invalid
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// The latest known location state, handed out to consumers as a snapshot
pub struct LocationReading {
    /// Most recent fix, None until the first fix arrives after location updates start
    pub fix: Option<Fix>,
    /// True heading in degrees
    pub heading: Option<f64>,
    /// Human-readable address of [LocationReading::fix], or a placeholder
    pub address: Option<String>,
}

impl LocationReading {
    pub fn latitude(&self) -> Option<LocationComponent> {
        self.fix.as_ref().map(|f| f.coordinate.lat)
    }

    pub fn longitude(&self) -> Option<LocationComponent> {
        self.fix.as_ref().map(|f| f.coordinate.long)
    }

    pub fn horizontal_accuracy(&self) -> Option<f64> {
        self.fix.as_ref().map(|f| f.horizontal_accuracy)
    }

    pub fn altitude(&self) -> Option<f64> {
        self.fix.as_ref().map(|f| f.altitude)
    }

    pub fn vertical_accuracy(&self) -> Option<f64> {
        self.fix.as_ref().map(|f| f.vertical_accuracy)
    }

    pub fn floor(&self) -> Option<i32> {
        self.fix.as_ref().and_then(|f| f.floor)
    }

    pub fn speed(&self) -> Option<f64> {
        self.fix.as_ref().and_then(|f| f.speed)
    }

    pub fn course(&self) -> Option<f64> {
        self.fix.as_ref().and_then(|f| f.course)
    }

    pub fn is_empty(&self) -> bool {
        self.fix.is_none() && self.heading.is_none() && self.address.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(41.88, -87.63).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.1).is_valid());
    }

    #[test]
    fn test_empty_reading_accessors() {
        let reading = LocationReading::default();
        assert!(reading.is_empty());
        assert_eq!(reading.latitude(), None);
        assert_eq!(reading.floor(), None);
        assert_eq!(reading.speed(), None);
    }

    #[test]
    fn test_reading_accessors() {
        let mut fix = Fix::at(Coordinate::new(39.78, -89.65));
        fix.floor = Some(2);
        fix.speed = Some(1.5);
        let reading = LocationReading {
            fix: Some(fix),
            heading: None,
            address: None,
        };
        assert!(!reading.is_empty());
        assert_eq!(reading.latitude(), Some(39.78));
        assert_eq!(reading.longitude(), Some(-89.65));
        assert_eq!(reading.floor(), Some(2));
        assert_eq!(reading.speed(), Some(1.5));
        assert_eq!(reading.course(), None);
    }
}
