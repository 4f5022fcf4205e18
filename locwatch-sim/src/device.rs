use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use locwatch_logic::{
    AuthorizationStatus, DesiredAccuracy, Fix, Heading, LocationProvider, PlatformCallbacks,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// How the simulated device behaves
pub struct DeviceConfig {
    /// Device-wide location services switch
    pub services_enabled: bool,
    /// Whether the device has a compass
    pub heading_available: bool,
    /// Authorization status when the simulation starts
    pub authorization: AuthorizationStatus,
    /// Answer to give when the app prompts for permission
    pub grant_on_request: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            services_enabled: true,
            heading_available: true,
            authorization: AuthorizationStatus::NotDetermined,
            grant_on_request: true,
        }
    }
}

/// A [LocationProvider] with no hardware behind it, fixes are pushed in with
/// [SimulatedDevice::push_fix] (usually by [crate::replay_track]).
pub struct SimulatedDevice {
    config: DeviceConfig,
    status: Mutex<AuthorizationStatus>,
    accuracy: Mutex<DesiredAccuracy>,
    location_on: AtomicBool,
    heading_on: AtomicBool,
    callbacks: PlatformCallbacks,
}

impl SimulatedDevice {
    pub fn new(config: DeviceConfig, callbacks: PlatformCallbacks) -> Self {
        Self {
            status: Mutex::new(config.authorization),
            accuracy: Mutex::new(DesiredAccuracy::default()),
            location_on: AtomicBool::new(false),
            heading_on: AtomicBool::new(false),
            config,
            callbacks,
        }
    }

    fn set_status(&self, status: AuthorizationStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
        self.callbacks.authorization_changed(status);
    }

    /// Simulate the user revoking permission in the system settings
    pub fn revoke(&self) {
        self.set_status(AuthorizationStatus::Denied);
    }

    pub fn is_updating_location(&self) -> bool {
        self.location_on.load(Ordering::SeqCst)
    }

    pub fn is_updating_heading(&self) -> bool {
        self.heading_on.load(Ordering::SeqCst)
    }

    pub fn accuracy(&self) -> DesiredAccuracy {
        self.accuracy.lock().map(|a| *a).unwrap_or_default()
    }

    /// Report a fix if location updates are on, returns whether it was delivered
    pub fn push_fix(&self, fix: Fix) -> bool {
        let on = self.is_updating_location();
        if on {
            self.callbacks.locations_updated(vec![fix]);
        }
        on
    }

    /// Report a heading if heading updates are on, returns whether it was delivered
    pub fn push_heading(&self, heading: Heading) -> bool {
        let on = self.is_updating_heading();
        if on {
            self.callbacks.heading_updated(heading);
        }
        on
    }
}

impl LocationProvider for SimulatedDevice {
    fn location_services_enabled(&self) -> bool {
        self.config.services_enabled
    }

    fn heading_available(&self) -> bool {
        self.config.heading_available
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.status.lock().map(|s| *s).unwrap_or_default()
    }

    fn request_authorization(&self) {
        let answer = if self.config.grant_on_request {
            AuthorizationStatus::AuthorizedWhenInUse
        } else {
            AuthorizationStatus::Denied
        };
        debug!("Permission prompt answered with {answer:?}");
        self.set_status(answer);
    }

    fn start_updating_location(&self) {
        self.location_on.store(true, Ordering::SeqCst);
    }

    fn stop_updating_location(&self) {
        self.location_on.store(false, Ordering::SeqCst);
    }

    fn start_updating_heading(&self) {
        self.heading_on.store(true, Ordering::SeqCst);
    }

    fn stop_updating_heading(&self) {
        self.heading_on.store(false, Ordering::SeqCst);
    }

    fn set_desired_accuracy(&self, accuracy: DesiredAccuracy) {
        if let Ok(mut current) = self.accuracy.lock() {
            *current = accuracy;
        }
    }
}
