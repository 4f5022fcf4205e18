use locwatch_logic::{DesiredAccuracy, LocationReading, ObserverSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The exercise screens, in the order they're listed
pub enum Lab {
    /// Coordinates and accuracy with an adjustable desired accuracy
    Precision,
    /// Continuous readout including heading, speed and course
    Live,
    /// Coordinates plus the reverse geocoded address
    Address,
}

const MISSING: &str = "--";

fn opt<T: std::fmt::Display>(v: Option<T>, unit: &str) -> String {
    v.map(|v| format!("{v:.2}{unit}"))
        .unwrap_or_else(|| MISSING.to_string())
}

fn coordinates(reading: &LocationReading) -> String {
    match (reading.latitude(), reading.longitude()) {
        (Some(lat), Some(long)) => format!("{lat:.6}, {long:.6}"),
        _ => MISSING.to_string(),
    }
}

/// Every accuracy option, the selected one in brackets
fn accuracy_picker(selected: DesiredAccuracy) -> String {
    DesiredAccuracy::ALL
        .iter()
        .map(|a| {
            if *a == selected {
                format!("[{}]", a.label())
            } else {
                a.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

impl Lab {
    pub const ALL: [Lab; 3] = [Self::Precision, Self::Live, Self::Address];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Precision => "Lab 1",
            Self::Live => "Lab 2",
            Self::Address => "Lab 3",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Precision => "Location with adjustable precision",
            Self::Live => "Continuous location and heading",
            Self::Address => "Location with reverse geocoded address",
        }
    }

    /// Whether the screen turns on heading updates
    pub fn wants_heading(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Render the screen for the given state
    pub fn readout(&self, snapshot: &ObserverSnapshot) -> String {
        let reading = &snapshot.reading;
        let mut lines = vec![format!("Coordinates: {}", coordinates(reading))];

        match self {
            Self::Precision => {
                lines.push(format!("Desired accuracy: {}", snapshot.accuracy.label()));
                lines.push(format!("Options: {}", accuracy_picker(snapshot.accuracy)));
                lines.push(format!(
                    "Horizontal accuracy: {}",
                    opt(reading.horizontal_accuracy(), " m")
                ));
                lines.push(format!("Altitude: {}", opt(reading.altitude(), " m")));
                lines.push(format!(
                    "Vertical accuracy: {}",
                    opt(reading.vertical_accuracy(), " m")
                ));
                lines.push(format!(
                    "Floor: {}",
                    reading
                        .floor()
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| MISSING.to_string())
                ));
            }
            Self::Live => {
                lines.push(format!("Altitude: {}", opt(reading.altitude(), " m")));
                lines.push(format!("Heading: {}", opt(reading.heading, "°")));
                lines.push(format!("Speed: {}", opt(reading.speed(), " m/s")));
                lines.push(format!("Course: {}", opt(reading.course(), "°")));
            }
            Self::Address => {
                lines.push(format!(
                    "Address: {}",
                    reading.address.as_deref().unwrap_or(MISSING)
                ));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use locwatch_logic::{Coordinate, Fix, ObserverStatus};

    use super::*;

    fn snapshot(reading: LocationReading) -> ObserverSnapshot {
        ObserverSnapshot {
            status: ObserverStatus::default(),
            accuracy: DesiredAccuracy::NearestTenMeters,
            reading,
        }
    }

    #[test]
    fn test_titles_in_order() {
        let titles = Lab::ALL.iter().map(Lab::title).collect::<Vec<_>>();
        assert_eq!(titles, ["Lab 1", "Lab 2", "Lab 3"]);
    }

    #[test]
    fn test_picker_marks_selection() {
        let picker = accuracy_picker(DesiredAccuracy::Reduced);
        assert_eq!(picker.matches('|').count(), DesiredAccuracy::ALL.len() - 1);
        assert!(picker.ends_with("[Reduced]"), "{picker}");
        assert_eq!(picker.matches('[').count(), 1);
    }

    #[test]
    fn test_empty_readout() {
        let out = Lab::Live.readout(&snapshot(LocationReading::default()));
        assert!(out.contains("Coordinates: --"), "{out}");
        assert!(out.contains("Heading: --"), "{out}");
    }

    #[test]
    fn test_precision_readout() {
        let mut fix = Fix::at(Coordinate::new(39.7983, -89.6544));
        fix.horizontal_accuracy = 5.0;
        fix.floor = Some(2);
        let out = Lab::Precision.readout(&snapshot(LocationReading {
            fix: Some(fix),
            heading: None,
            address: None,
        }));

        assert!(out.contains("Coordinates: 39.798300, -89.654400"), "{out}");
        assert!(out.contains("Desired accuracy: 10 Meters"), "{out}");
        assert!(
            out.contains("Options: Best for Navigation | Best | [10 Meters] | 100 Meters"),
            "{out}"
        );
        assert!(out.contains("Horizontal accuracy: 5.00 m"), "{out}");
        assert!(out.contains("Floor: 2"), "{out}");
    }

    #[test]
    fn test_address_readout() {
        let out = Lab::Address.readout(&snapshot(LocationReading {
            fix: Some(Fix::at(Coordinate::new(1.0, 2.0))),
            heading: None,
            address: Some("Cafe, Springfield, IL62701".to_string()),
        }));

        assert!(out.ends_with("Address: Cafe, Springfield, IL62701"), "{out}");
    }
}
