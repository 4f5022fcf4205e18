use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{
    address::Placemark,
    reading::{Coordinate, Fix, Heading},
    settings::DesiredAccuracy,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Whether the user allowed the app to use location services
pub enum AuthorizationStatus {
    /// The user hasn't been asked yet
    #[default]
    NotDetermined,
    /// Location access is blocked by something other than the user (e.g. parental controls)
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::AuthorizedAlways | Self::AuthorizedWhenInUse)
    }
}

/// Platform location and heading hardware. Results of the commands are delivered
/// asynchronously through [PlatformCallbacks].
pub trait LocationProvider: Send + Sync {
    /// Whether location services are turned on for the whole device
    fn location_services_enabled(&self) -> bool;
    /// Whether the device has a compass
    fn heading_available(&self) -> bool;
    fn authorization_status(&self) -> AuthorizationStatus;
    /// Prompt the user for permission, the answer arrives as
    /// [PlatformEvent::AuthorizationChanged]
    fn request_authorization(&self);
    fn start_updating_location(&self);
    fn stop_updating_location(&self);
    fn start_updating_heading(&self);
    fn stop_updating_heading(&self);
    fn set_desired_accuracy(&self, accuracy: DesiredAccuracy);
}

impl<P: LocationProvider + ?Sized> LocationProvider for std::sync::Arc<P> {
    fn location_services_enabled(&self) -> bool {
        (**self).location_services_enabled()
    }

    fn heading_available(&self) -> bool {
        (**self).heading_available()
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        (**self).authorization_status()
    }

    fn request_authorization(&self) {
        (**self).request_authorization()
    }

    fn start_updating_location(&self) {
        (**self).start_updating_location()
    }

    fn stop_updating_location(&self) {
        (**self).stop_updating_location()
    }

    fn start_updating_heading(&self) {
        (**self).start_updating_heading()
    }

    fn stop_updating_heading(&self) {
        (**self).stop_updating_heading()
    }

    fn set_desired_accuracy(&self, accuracy: DesiredAccuracy) {
        (**self).set_desired_accuracy(accuracy)
    }
}

/// Turns coordinates into place descriptions
pub trait Geocoder: Send + Sync + 'static {
    /// Look up the place at `coordinate`, `Ok(None)` means the lookup worked but found nothing
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<Option<Placemark>, anyhow::Error>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
/// A callback from the platform
pub enum PlatformEvent {
    AuthorizationChanged(AuthorizationStatus),
    /// A batch of fixes, oldest first
    LocationsUpdated(Vec<Fix>),
    HeadingUpdated(Heading),
}

pub type PlatformEventRx = mpsc::UnboundedReceiver<PlatformEvent>;

#[derive(Debug, Clone)]
/// Handle platform bindings use to report callbacks to a [crate::LocationObserver].
/// Calls never block and can come from any thread.
pub struct PlatformCallbacks(mpsc::UnboundedSender<PlatformEvent>);

impl PlatformCallbacks {
    /// Create a new callback handle along with the receiving end to give to the observer
    pub fn channel() -> (Self, PlatformEventRx) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    fn deliver(&self, event: PlatformEvent) {
        if self.0.send(event).is_err() {
            log::debug!("Dropping platform callback, observer is gone");
        }
    }

    pub fn authorization_changed(&self, status: AuthorizationStatus) {
        self.deliver(PlatformEvent::AuthorizationChanged(status));
    }

    pub fn locations_updated(&self, fixes: Vec<Fix>) {
        self.deliver(PlatformEvent::LocationsUpdated(fixes));
    }

    pub fn heading_updated(&self, heading: Heading) {
        self.deliver(PlatformEvent::HeadingUpdated(heading));
    }

    /// Whether the observer stopped listening
    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}
