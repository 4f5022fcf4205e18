use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use locwatch_logic::{
    AuthorizationStatus, DesiredAccuracy, LocationObserver, LocationProvider, PlatformCallbacks,
    StateUpdateSender,
};
use locwatch_sim::{
    Lab, OfflineGeocoder, SimConfig, SimulatedDevice, Track, prelude::*, replay_track,
};
use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
/// Run the location lab screens against a simulated device
struct Cli {
    /// JSON config for the simulated device and observer
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON track to replay, a short demo walk is used if not given
    #[arg(long)]
    track: Option<PathBuf>,

    /// Milliseconds between fixes
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum AccuracyValue {
    BestForNavigation,
    Best,
    NearestTenMeters,
    HundredMeters,
    Kilometer,
    ThreeKilometers,
    Reduced,
}

impl From<AccuracyValue> for DesiredAccuracy {
    fn from(value: AccuracyValue) -> Self {
        match value {
            AccuracyValue::BestForNavigation => DesiredAccuracy::BestForNavigation,
            AccuracyValue::Best => DesiredAccuracy::Best,
            AccuracyValue::NearestTenMeters => DesiredAccuracy::NearestTenMeters,
            AccuracyValue::HundredMeters => DesiredAccuracy::HundredMeters,
            AccuracyValue::Kilometer => DesiredAccuracy::Kilometer,
            AccuracyValue::ThreeKilometers => DesiredAccuracy::ThreeKilometers,
            AccuracyValue::Reduced => DesiredAccuracy::Reduced,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the available labs
    List,
    /// (Lab 1) Location readout with adjustable precision
    Precision {
        /// Accuracy to start with, overrides the config file
        #[arg(long, value_enum)]
        accuracy: Option<AccuracyValue>,
        /// Switch to this accuracy partway through the track
        #[arg(long, value_enum)]
        switch_to: Option<AccuracyValue>,
        /// Number of fixes to wait before switching
        #[arg(long, default_value_t = 3)]
        after: u32,
    },
    /// (Lab 2) Continuous location readout with heading
    Live,
    /// (Lab 3) Location readout with reverse geocoded address
    Address,
}

struct UpdateSender(mpsc::UnboundedSender<()>);

impl StateUpdateSender for UpdateSender {
    fn send_update(&self) {
        self.0.send(()).ok();
    }
}

type Observer = LocationObserver<Arc<SimulatedDevice>, OfflineGeocoder, UpdateSender>;

struct LabRun {
    lab: Lab,
    interval: Duration,
    track: Track,
    config: SimConfig,
    /// Accuracy to switch to and how long to wait before doing so
    switch: Option<(DesiredAccuracy, Duration)>,
}

const PERMISSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Time to wait before switching accuracy, `after` fixes into the track
fn switch_delay(interval: Duration, after: u32) -> Result<Duration> {
    interval
        .checked_mul(after)
        .ok_or_else(|| anyhow!("--after {after} is too large for a {interval:?} interval"))
}

async fn wait_for_permission(
    observer: &Observer,
    device: &SimulatedDevice,
    updates: &mut mpsc::UnboundedReceiver<()>,
) -> bool {
    let wait = async {
        loop {
            if observer.status().await.permission_granted {
                return true;
            }
            if matches!(
                device.authorization_status(),
                AuthorizationStatus::Denied | AuthorizationStatus::Restricted
            ) {
                return false;
            }
            if updates.recv().await.is_none() {
                return false;
            }
        }
    };

    tokio::time::timeout(PERMISSION_TIMEOUT, wait)
        .await
        .unwrap_or(false)
}

impl LabRun {
    async fn run(self) -> Result {
        let (callbacks, events) = PlatformCallbacks::channel();
        let device = Arc::new(SimulatedDevice::new(self.config.device.clone(), callbacks));
        let (update_tx, mut update_rx) = mpsc::unbounded_channel();
        let observer = Arc::new(Observer::new(
            self.config.observer.clone(),
            device.clone(),
            OfflineGeocoder::new(),
            UpdateSender(update_tx),
            events,
        ));

        let main_loop = tokio::spawn({
            let observer = observer.clone();
            async move { observer.main_loop().await }
        });

        observer.request_permission().await;
        if !wait_for_permission(&observer, &device, &mut update_rx).await {
            observer.quit();
            main_loop.await.context("Observer loop panicked")?;
            bail!("Location permission was not granted");
        }

        let printer = tokio::spawn({
            let observer = observer.clone();
            let lab = self.lab;
            async move {
                let mut last = String::new();
                while update_rx.recv().await.is_some() {
                    let out = lab.readout(&observer.snapshot().await);
                    if out != last {
                        println!("{out}\n");
                        last = out;
                    }
                }
            }
        });

        observer.start_location().await;
        if !observer.status().await.location_active {
            warn!("Location services are disabled on the device");
        }
        if self.lab.wants_heading() {
            observer.start_heading().await;
        }

        let cancel = CancellationToken::new();
        if let Some((accuracy, delay)) = self.switch {
            let observer = observer.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        info!("Switching accuracy to {}", accuracy.label());
                        observer.update_accuracy(accuracy).await;
                    }
                }
            });
        }

        let delivered = tokio::select! {
            delivered = replay_track(&device, &self.track, self.interval, cancel.clone()) => delivered,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                cancel.cancel();
                0
            }
        };
        info!("Replayed {delivered} fix(es)");

        // Give the last lookup a chance to land before shutting down
        tokio::time::sleep(self.interval).await;
        cancel.cancel();
        observer.quit();
        main_loop.await.context("Observer loop panicked")?;
        drop(observer);
        printer.abort();

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();

    let lab = match &cli.command {
        Commands::List => {
            for lab in Lab::ALL {
                println!("{}: {}", lab.title(), lab.description());
            }
            return Ok(());
        }
        Commands::Precision { .. } => Lab::Precision,
        Commands::Live => Lab::Live,
        Commands::Address => Lab::Address,
    };

    let mut config = cli
        .config
        .as_deref()
        .map(SimConfig::load)
        .transpose()?
        .unwrap_or_default();

    let track = cli
        .track
        .as_deref()
        .map(Track::load)
        .transpose()?
        .unwrap_or_else(Track::demo);

    let interval = Duration::from_millis(cli.interval_ms);
    let mut switch = None;
    if let Commands::Precision {
        accuracy,
        switch_to,
        after,
    } = cli.command
    {
        if let Some(accuracy) = accuracy {
            config.observer.accuracy = accuracy.into();
        }
        if let Some(target) = switch_to {
            switch = Some((target.into(), switch_delay(interval, after)?));
        }
    }

    info!("Starting {} ({})", lab.title(), lab.description());

    LabRun {
        lab,
        interval,
        track,
        config,
        switch,
    }
    .run()
    .await
}
