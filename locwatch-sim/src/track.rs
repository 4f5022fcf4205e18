use std::{path::Path, time::Duration};

use chrono::Utc;
use locwatch_logic::{Coordinate, Fix, Heading};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{device::SimulatedDevice, prelude::*};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One recorded sample of a track
pub struct TrackPoint {
    pub lat: f64,
    pub long: f64,
    #[serde(default)]
    pub horizontal_accuracy: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub vertical_accuracy: f64,
    #[serde(default)]
    pub floor: Option<i32>,
    /// Negative values mean unknown, as recorded by most devices
    #[serde(default)]
    pub speed: Option<f64>,
    /// Negative values mean unknown
    #[serde(default)]
    pub course: Option<f64>,
    /// True heading in degrees
    #[serde(default)]
    pub heading: Option<f64>,
}

fn known(v: Option<f64>) -> Option<f64> {
    v.filter(|v| *v >= 0.0)
}

impl TrackPoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.long)
    }

    pub fn to_fix(&self) -> Fix {
        Fix {
            coordinate: self.coordinate(),
            horizontal_accuracy: self.horizontal_accuracy,
            altitude: self.altitude,
            vertical_accuracy: self.vertical_accuracy,
            floor: self.floor,
            speed: known(self.speed),
            course: known(self.course),
            timestamp: Utc::now(),
        }
    }

    pub fn to_heading(&self) -> Option<Heading> {
        self.heading.map(|deg| Heading {
            true_heading: deg,
            magnetic_heading: deg,
            accuracy: 5.0,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A recorded sequence of samples to feed a [SimulatedDevice]
pub struct Track {
    pub points: Vec<TrackPoint>,
}

impl Track {
    pub fn from_json(raw: &str) -> Result<Self> {
        let track: Self = serde_json::from_str(raw).context("Failed to parse track")?;
        track.validate()?;
        Ok(track)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read track {}", path.display()))?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result {
        if self.points.is_empty() {
            bail!("Track has no points");
        }
        for (i, point) in self.points.iter().enumerate() {
            if !point.coordinate().is_valid() {
                bail!(
                    "Point {i} is out of range: {}, {}",
                    point.lat,
                    point.long
                );
            }
        }
        Ok(())
    }

    /// A short walk through downtown Springfield, IL
    pub fn demo() -> Self {
        let points = [
            (39.798_3, -89.654_4, 180.0, 0.0),
            (39.798_5, -89.654_1, 181.0, 45.0),
            (39.798_8, -89.653_7, 181.5, 50.0),
            (39.799_2, -89.653_6, 182.0, 10.0),
            (39.799_6, -89.653_6, 182.0, 0.0),
            (39.800_1, -89.653_9, 181.0, 330.0),
        ]
        .into_iter()
        .map(|(lat, long, altitude, heading)| TrackPoint {
            lat,
            long,
            horizontal_accuracy: 5.0,
            altitude,
            vertical_accuracy: 3.0,
            floor: None,
            speed: Some(1.4),
            course: Some(heading),
            heading: Some(heading),
        })
        .collect();

        Self { points }
    }
}

/// Shortest gap between replayed points
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Feed `track` to `device` one point per `interval` (at least [MIN_INTERVAL]). Points that come up while the device
/// isn't updating are dropped, the same way a real device wouldn't record them. Returns the
/// number of fixes delivered.
pub async fn replay_track(
    device: &SimulatedDevice,
    track: &Track,
    interval: Duration,
    cancel: CancellationToken,
) -> usize {
    let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
    let mut delivered = 0;

    for point in track.points.iter() {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                break;
            }

            _ = ticker.tick() => {
                if device.push_fix(point.to_fix()) {
                    delivered += 1;
                }
                if let Some(heading) = point.to_heading() {
                    device.push_heading(heading);
                }
            }
        }
    }

    delivered
}

#[cfg(test)]
mod tests {
    use locwatch_logic::{LocationProvider, PlatformCallbacks, PlatformEvent};

    use super::*;
    use crate::DeviceConfig;

    #[test]
    fn test_parse_track() {
        let raw = r#"{"points": [
            {"lat": 39.8, "long": -89.6, "speed": -1.0, "course": 90.0},
            {"lat": 39.9, "long": -89.7, "floor": 2, "heading": 180.0}
        ]}"#;

        let track = Track::from_json(raw).expect("Failed to parse");

        assert_eq!(track.points.len(), 2);
        let first = track.points[0].to_fix();
        assert_eq!(first.speed, None);
        assert_eq!(first.course, Some(90.0));
        assert_eq!(track.points[1].to_fix().floor, Some(2));
        assert_eq!(
            track.points[1].to_heading().map(|h| h.true_heading),
            Some(180.0)
        );
    }

    #[test]
    fn test_reject_empty_track() {
        assert!(Track::from_json(r#"{"points": []}"#).is_err());
    }

    #[test]
    fn test_reject_out_of_range() {
        let raw = r#"{"points": [{"lat": 91.0, "long": 0.0}]}"#;
        let err = Track::from_json(raw).expect_err("Accepted bad latitude");
        assert!(err.to_string().contains("Point 0"), "{err}");
    }

    #[test]
    fn test_demo_track_valid() {
        assert!(Track::demo().validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_only_while_streaming() {
        let (callbacks, mut rx) = PlatformCallbacks::channel();
        let device = SimulatedDevice::new(DeviceConfig::default(), callbacks);
        let track = Track::demo();

        let delivered = replay_track(
            &device,
            &track,
            Duration::from_secs(1),
            CancellationToken::new(),
        )
        .await;
        assert_eq!(delivered, 0);
        assert!(rx.try_recv().is_err());

        device.start_updating_location();
        let delivered = replay_track(
            &device,
            &track,
            Duration::from_secs(1),
            CancellationToken::new(),
        )
        .await;
        assert_eq!(delivered, track.points.len());

        let mut fixes = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                PlatformEvent::LocationsUpdated(batch) => {
                    assert_eq!(batch.len(), 1);
                    fixes += 1;
                }
                other => panic!("Unexpected event {other:?}"),
            }
        }
        assert_eq!(fixes, track.points.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_zero_interval() {
        let (callbacks, _rx) = PlatformCallbacks::channel();
        let device = SimulatedDevice::new(DeviceConfig::default(), callbacks);
        device.start_updating_location();
        let track = Track::demo();

        let delivered =
            replay_track(&device, &track, Duration::ZERO, CancellationToken::new()).await;

        assert_eq!(delivered, track.points.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_cancelled() {
        let (callbacks, _rx) = PlatformCallbacks::channel();
        let device = SimulatedDevice::new(DeviceConfig::default(), callbacks);
        device.start_updating_location();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let delivered = replay_track(&device, &Track::demo(), Duration::from_secs(1), cancel).await;

        assert_eq!(delivered, 0);
    }
}
