mod address;
mod observer;
mod provider;
mod reading;
mod settings;

pub use address::{GEOCODE_FAILED, NO_ADDRESS, Placemark, describe_lookup};
pub use observer::{LocationObserver, ObserverSnapshot, ObserverStatus, StateUpdateSender};
pub use provider::{
    AuthorizationStatus, Geocoder, LocationProvider, PlatformCallbacks, PlatformEvent,
    PlatformEventRx,
};
pub use reading::{Coordinate, Fix, Heading, LocationComponent, LocationReading, UtcDT};
pub use settings::{DesiredAccuracy, ObserverSettings};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
