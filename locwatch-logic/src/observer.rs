use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{Mutex, RwLock, mpsc},
    task::AbortHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    address::{Placemark, describe_lookup},
    prelude::*,
    provider::{AuthorizationStatus, Geocoder, LocationProvider, PlatformEvent, PlatformEventRx},
    reading::{Fix, Heading, LocationReading},
    settings::{DesiredAccuracy, ObserverSettings},
};

/// Listener notified whenever observable state of a [LocationObserver] changes
pub trait StateUpdateSender: Send + Sync {
    fn send_update(&self);
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObserverStatus {
    pub permission_granted: bool,
    pub location_active: bool,
    /// Only ever true while [ObserverStatus::location_active] is
    pub heading_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Read-only copy of everything a [LocationObserver] exposes
pub struct ObserverSnapshot {
    pub status: ObserverStatus,
    pub accuracy: DesiredAccuracy,
    pub reading: LocationReading,
}

struct ObserverState {
    status: ObserverStatus,
    accuracy: DesiredAccuracy,
    reading: LocationReading,
    /// Bumped for every fix applied, geocoding results are tagged with it
    fix_seq: u64,
    lookup: Option<AbortHandle>,
}

impl ObserverState {
    fn cancel_lookup(&mut self) {
        if let Some(handle) = self.lookup.take() {
            handle.abort();
        }
    }
}

type LookupResult = (u64, Result<Option<Placemark>>);

/// Bridges a [LocationProvider] and a [Geocoder] to observable state.
///
/// Commands ([LocationObserver::start_location] and friends) are applied immediately,
/// platform callbacks and geocoding results are applied by [LocationObserver::main_loop].
pub struct LocationObserver<P: LocationProvider, G: Geocoder, S: StateUpdateSender> {
    state: RwLock<ObserverState>,
    provider: P,
    geocoder: Arc<G>,
    state_update_sender: S,
    events: Mutex<PlatformEventRx>,
    lookup_tx: mpsc::UnboundedSender<LookupResult>,
    lookup_rx: Mutex<mpsc::UnboundedReceiver<LookupResult>>,
    cancel: CancellationToken,
}

impl<P: LocationProvider, G: Geocoder, S: StateUpdateSender> LocationObserver<P, G, S> {
    pub fn new(
        settings: ObserverSettings,
        provider: P,
        geocoder: G,
        state_update_sender: S,
        events: PlatformEventRx,
    ) -> Self {
        let (lookup_tx, lookup_rx) = mpsc::unbounded_channel();
        let status = ObserverStatus {
            permission_granted: provider.authorization_status().is_granted(),
            ..Default::default()
        };

        Self {
            state: RwLock::new(ObserverState {
                status,
                accuracy: settings.accuracy,
                reading: LocationReading::default(),
                fix_seq: 0,
                lookup: None,
            }),
            provider,
            geocoder: Arc::new(geocoder),
            state_update_sender,
            events: Mutex::new(events),
            lookup_tx,
            lookup_rx: Mutex::new(lookup_rx),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn snapshot(&self) -> ObserverSnapshot {
        let state = self.state.read().await;
        ObserverSnapshot {
            status: state.status,
            accuracy: state.accuracy,
            reading: state.reading.clone(),
        }
    }

    pub async fn status(&self) -> ObserverStatus {
        self.state.read().await.status
    }

    pub async fn reading(&self) -> LocationReading {
        self.state.read().await.reading.clone()
    }

    fn emit_state_update(&self) {
        self.state_update_sender.send_update();
    }

    /// Ask the user for location permission if they haven't been asked yet, otherwise refresh
    /// [ObserverStatus::permission_granted] from the current status.
    pub async fn request_permission(&self) {
        let status = self.provider.authorization_status();
        if status == AuthorizationStatus::NotDetermined {
            debug!("Requesting location authorization");
            self.provider.request_authorization();
            return;
        }

        let mut state = self.state.write().await;
        let granted = status.is_granted();
        if state.status.permission_granted != granted {
            state.status.permission_granted = granted;
            drop(state);
            self.emit_state_update();
        }
    }

    fn start_location_inner(&self, state: &mut ObserverState) -> bool {
        if !self.provider.location_services_enabled() {
            debug!("Location services are disabled, not starting updates");
            return false;
        }
        if state.status.location_active {
            return false;
        }

        info!("Starting location updates ({:?})", state.accuracy);
        self.provider.set_desired_accuracy(state.accuracy);
        self.provider.start_updating_location();
        state.status.location_active = true;
        true
    }

    fn stop_location_inner(&self, state: &mut ObserverState) -> bool {
        self.stop_heading_inner(state);
        self.provider.stop_updating_location();
        state.cancel_lookup();

        let changed = state.status.location_active || !state.reading.is_empty();
        if state.status.location_active {
            info!("Stopped location updates");
        }
        state.status.location_active = false;
        state.reading = LocationReading::default();
        changed
    }

    fn stop_heading_inner(&self, state: &mut ObserverState) -> bool {
        self.provider.stop_updating_heading();
        let changed = state.status.heading_active || state.reading.heading.is_some();
        state.status.heading_active = false;
        state.reading.heading = None;
        changed
    }

    /// Begin streaming fixes, does nothing if location services are disabled device-wide
    pub async fn start_location(&self) {
        let mut state = self.state.write().await;
        if self.start_location_inner(&mut state) {
            drop(state);
            self.emit_state_update();
        }
    }

    /// Stop streaming fixes. Also stops heading updates and clears the reading, including
    /// the address.
    pub async fn stop_location(&self) {
        let mut state = self.state.write().await;
        if self.stop_location_inner(&mut state) {
            drop(state);
            self.emit_state_update();
        }
    }

    /// Begin streaming headings, only possible while location updates are running on a device
    /// with a compass.
    pub async fn start_heading(&self) {
        let mut state = self.state.write().await;
        if !state.status.location_active {
            debug!("Not starting heading updates, location updates are off");
            return;
        }
        if !self.provider.heading_available() {
            debug!("Not starting heading updates, no heading hardware");
            return;
        }
        if state.status.heading_active {
            return;
        }

        self.provider.start_updating_heading();
        state.status.heading_active = true;
        drop(state);
        self.emit_state_update();
    }

    pub async fn stop_heading(&self) {
        let mut state = self.state.write().await;
        if self.stop_heading_inner(&mut state) {
            drop(state);
            self.emit_state_update();
        }
    }

    /// Change the desired accuracy. The platform only picks up a new accuracy on start, so a
    /// running stream is stopped and started again.
    pub async fn update_accuracy(&self, accuracy: DesiredAccuracy) {
        let mut state = self.state.write().await;
        let mut changed = state.accuracy != accuracy;
        state.accuracy = accuracy;

        if state.status.location_active {
            // The restart drops heading and the reading even when the level is unchanged
            changed |= self.stop_location_inner(&mut state);
            changed |= self.start_location_inner(&mut state);
        } else {
            self.provider.set_desired_accuracy(accuracy);
        }

        drop(state);
        if changed {
            self.emit_state_update();
        }
    }

    fn apply_authorization(&self, state: &mut ObserverState, status: AuthorizationStatus) -> bool {
        let granted = status.is_granted();
        let mut changed = state.status.permission_granted != granted;
        state.status.permission_granted = granted;

        if !granted && state.status.location_active {
            info!("Location permission revoked ({status:?}), stopping updates");
            changed |= self.stop_location_inner(state);
        }

        changed
    }

    fn apply_fixes(&self, state: &mut ObserverState, fixes: Vec<Fix>) -> bool {
        if !state.status.location_active {
            debug!("Ignoring {} fix(es), location updates are off", fixes.len());
            return false;
        }
        // Only the newest fix of a batch matters
        let Some(fix) = fixes.into_iter().last() else {
            return false;
        };

        let coordinate = fix.coordinate;
        state.reading.fix = Some(fix);
        state.fix_seq += 1;
        state.cancel_lookup();

        let seq = state.fix_seq;
        let geocoder = self.geocoder.clone();
        let tx = self.lookup_tx.clone();
        let task = tokio::spawn(async move {
            let res = geocoder.reverse_geocode(coordinate).await;
            tx.send((seq, res)).ok();
        });
        state.lookup = Some(task.abort_handle());

        true
    }

    fn apply_heading(&self, state: &mut ObserverState, heading: Heading) -> bool {
        if !state.status.heading_active {
            debug!("Ignoring heading, heading updates are off");
            return false;
        }
        state.reading.heading = Some(heading.true_heading);
        true
    }

    /// Apply a single platform callback
    pub async fn handle_event(&self, event: PlatformEvent) {
        let mut state = self.state.write().await;
        let changed = match event {
            PlatformEvent::AuthorizationChanged(status) => {
                self.apply_authorization(&mut state, status)
            }
            PlatformEvent::LocationsUpdated(fixes) => self.apply_fixes(&mut state, fixes),
            PlatformEvent::HeadingUpdated(heading) => self.apply_heading(&mut state, heading),
        };
        drop(state);

        if changed {
            self.emit_state_update();
        }
    }

    async fn apply_lookup(&self, seq: u64, res: Result<Option<Placemark>>) {
        let mut state = self.state.write().await;
        if !state.status.location_active || seq != state.fix_seq {
            debug!("Discarding address for superseded fix {seq}");
            return;
        }

        if let Err(why) = &res {
            warn!("Reverse geocoding failed: {why:?}");
        }
        state.reading.address = Some(describe_lookup(res));
        state.lookup = None;
        drop(state);

        self.emit_state_update();
    }

    /// Stop [LocationObserver::main_loop], location and heading updates are stopped on exit
    pub fn quit(&self) {
        self.cancel.cancel();
    }

    /// Main loop of the observer, applies platform callbacks and geocoding results in the order
    /// they arrive. Returns when [LocationObserver::quit] is called or every
    /// [crate::PlatformCallbacks] handle is dropped.
    pub async fn main_loop(&self) {
        let mut events = self.events.lock().await;
        let mut lookups = self.lookup_rx.lock().await;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    break;
                }

                Some((seq, res)) = lookups.recv() => {
                    self.apply_lookup(seq, res).await;
                }

                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            info!("Platform callbacks closed, shutting down observer");
                            break;
                        }
                    }
                }
            }
        }

        self.stop_location().await;
    }
}
