use std::sync::Arc;

use locwatch_logic::{Coordinate, Geocoder, Placemark};
use reverse_geocoder::ReverseGeocoder;

use crate::prelude::*;

/// Reverse geocoding against the bundled GeoNames city list, resolves to the nearest city
#[derive(Clone)]
pub struct OfflineGeocoder(Arc<ReverseGeocoder>);

impl OfflineGeocoder {
    pub fn new() -> Self {
        Self(Arc::new(ReverseGeocoder::new()))
    }
}

impl Default for OfflineGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for OfflineGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<Placemark>> {
        if !coordinate.is_valid() {
            bail!(
                "Coordinate out of range: {}, {}",
                coordinate.lat,
                coordinate.long
            );
        }

        let found = self.0.search((coordinate.lat, coordinate.long));
        let record = found.record;
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Ok(Some(Placemark {
            name: None,
            locality: non_empty(record.name.as_str()),
            administrative_area: non_empty(record.admin1.as_str()),
            postal_code: None,
        }))
    }
}
