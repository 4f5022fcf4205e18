use serde::{Deserialize, Serialize};

/// Address shown when the geocoder fails
pub const GEOCODE_FAILED: &str = "Unable to resolve address";
/// Address shown when the geocoder succeeds but has nothing to describe the location with
pub const NO_ADDRESS: &str = "No address found";

const SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Result of reverse geocoding a coordinate
pub struct Placemark {
    /// Name of the place, e.g. a business or landmark
    pub name: Option<String>,
    /// City
    pub locality: Option<String>,
    /// State or province
    pub administrative_area: Option<String>,
    pub postal_code: Option<String>,
}

fn present(component: &Option<String>) -> Option<&str> {
    component
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl Placemark {
    /// Join the available components into a single line, None if there are none.
    ///
    /// Name and locality are followed by a separator, administrative area and postal code
    /// are written back to back (`"Cafe, Springfield, IL62701"`).
    pub fn compose(&self) -> Option<String> {
        let mut out = String::new();

        if let Some(name) = present(&self.name) {
            out.push_str(name);
            out.push_str(SEPARATOR);
        }
        if let Some(locality) = present(&self.locality) {
            out.push_str(locality);
            out.push_str(SEPARATOR);
        }
        if let Some(area) = present(&self.administrative_area) {
            out.push_str(area);
        }
        if let Some(postal_code) = present(&self.postal_code) {
            out.push_str(postal_code);
        }

        let trimmed = out.strip_suffix(SEPARATOR).unwrap_or(&out);

        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Turn the outcome of a lookup into the text stored in the address field
pub fn describe_lookup<E>(result: Result<Option<Placemark>, E>) -> String {
    match result {
        Ok(Some(placemark)) => placemark.compose().unwrap_or_else(|| NO_ADDRESS.to_string()),
        Ok(None) => NO_ADDRESS.to_string(),
        Err(_) => GEOCODE_FAILED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placemark(name: &str, locality: &str, area: &str, postal: &str) -> Placemark {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Placemark {
            name: opt(name),
            locality: opt(locality),
            administrative_area: opt(area),
            postal_code: opt(postal),
        }
    }

    #[test]
    fn test_full_address() {
        let p = placemark("Cafe", "Springfield", "IL", "62701");
        assert_eq!(p.compose().as_deref(), Some("Cafe, Springfield, IL62701"));
    }

    #[test]
    fn test_trailing_separator_trimmed() {
        let p = placemark("Cafe", "Springfield", "", "");
        assert_eq!(p.compose().as_deref(), Some("Cafe, Springfield"));

        let p = placemark("Cafe", "", "", "");
        assert_eq!(p.compose().as_deref(), Some("Cafe"));
    }

    #[test]
    fn test_missing_middle() {
        let p = placemark("", "Springfield", "", "62701");
        assert_eq!(p.compose().as_deref(), Some("Springfield, 62701"));
    }

    #[test]
    fn test_blank_components_are_absent() {
        let p = placemark("  ", "", "", "");
        assert_eq!(p.compose(), None);
    }

    #[test]
    fn test_describe_empty_is_not_failure() {
        let empty: Result<_, ()> = Ok(Some(Placemark::default()));
        assert_eq!(describe_lookup(empty), NO_ADDRESS);

        let none: Result<Option<Placemark>, ()> = Ok(None);
        assert_eq!(describe_lookup(none), NO_ADDRESS);
    }

    #[test]
    fn test_describe_failure() {
        let failed: Result<Option<Placemark>, &str> = Err("network down");
        assert_eq!(describe_lookup(failed), GEOCODE_FAILED);
    }

    #[test]
    fn test_describe_success() {
        let ok: Result<_, ()> = Ok(Some(placemark("Cafe", "Springfield", "IL", "62701")));
        assert_eq!(describe_lookup(ok), "Cafe, Springfield, IL62701");
    }
}
