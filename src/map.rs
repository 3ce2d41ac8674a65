use serde::Deserialize;

const EMBED_URL: &str = "https://www.openstreetmap.org/export/embed.html";

/// Degrees of latitude/longitude shown on each side of the marker.
const SPAN_DEGREES: f64 = 0.005;

/// A single fixed point shown on the detail map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Station {
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    #[serde(default = "default_label")]
    pub label: String,
}

fn default_latitude() -> f64 {
    37.3840662
}

fn default_longitude() -> f64 {
    126.6574478
}

fn default_label() -> String {
    "스테이션 위치".to_string()
}

impl Default for Station {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            label: default_label(),
        }
    }
}

impl Station {
    /// OpenStreetMap embed URL centered on the station, with a marker.
    pub fn embed_url(&self) -> String {
        let (lat, lon) = (self.latitude, self.longitude);
        format!(
            "{EMBED_URL}?bbox={:.7},{:.7},{:.7},{:.7}&layer=mapnik&marker={lat:.7},{lon:.7}",
            lon - SPAN_DEGREES,
            lat - SPAN_DEGREES,
            lon + SPAN_DEGREES,
            lat + SPAN_DEGREES,
        )
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_url_centers_on_station() {
        let url = Station::default().embed_url();
        assert_eq!(
            url,
            "https://www.openstreetmap.org/export/embed.html\
             ?bbox=126.6524478,37.3790662,126.6624478,37.3890662\
             &layer=mapnik&marker=37.3840662,126.6574478"
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let station = Station {
            latitude: 91.0,
            ..Station::default()
        };
        assert!(!station.is_valid());
        assert!(Station::default().is_valid());
    }
}
