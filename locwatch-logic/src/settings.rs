use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Hint to the platform about how precise fixes should be, trades power for precision
pub enum DesiredAccuracy {
    /// Highest precision, additional sensor data for navigation use
    BestForNavigation,
    /// Highest precision the device can provide normally
    #[default]
    Best,
    NearestTenMeters,
    HundredMeters,
    Kilometer,
    ThreeKilometers,
    /// Approximate location only, what the platform gives when the user withheld precise location
    Reduced,
}

impl DesiredAccuracy {
    pub const ALL: [DesiredAccuracy; 7] = [
        Self::BestForNavigation,
        Self::Best,
        Self::NearestTenMeters,
        Self::HundredMeters,
        Self::Kilometer,
        Self::ThreeKilometers,
        Self::Reduced,
    ];

    /// Short label, as shown in a picker
    pub fn label(&self) -> &'static str {
        match self {
            Self::BestForNavigation => "Best for Navigation",
            Self::Best => "Best",
            Self::NearestTenMeters => "10 Meters",
            Self::HundredMeters => "100 Meters",
            Self::Kilometer => "1 Kilometer",
            Self::ThreeKilometers => "3 Kilometers",
            Self::Reduced => "Reduced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
/// Settings for a [crate::LocationObserver], applied to the provider on construction
pub struct ObserverSettings {
    /// Accuracy to request from the platform when location updates start
    pub accuracy: DesiredAccuracy,
}
