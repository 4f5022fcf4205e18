mod config;
mod device;
mod geocoder;
mod lab;
mod track;

pub mod prelude {
    pub use anyhow::{Context, anyhow, bail};
    pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

pub use config::SimConfig;
pub use device::{DeviceConfig, SimulatedDevice};
pub use geocoder::OfflineGeocoder;
pub use lab::Lab;
pub use prelude::*;
pub use track::{MIN_INTERVAL, Track, TrackPoint, replay_track};
