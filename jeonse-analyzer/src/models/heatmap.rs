//! Heatmap entries and the fixed neighbourhood catalogue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted risk score for one neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapEntry {
    pub region: String,
    /// 0 (no data / no risk) to 100
    pub score: i64,
    pub lat: f64,
    pub lng: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A neighbourhood with map coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPoint {
    pub region: String,
    pub lat: f64,
    pub lng: f64,
}

/// Catalogue of neighbourhoods shown on the heatmap (name, lat, lng)
///
/// Names are unique; the map keys rows by name.
pub const DEFAULT_CATALOGUE: &[(&str, f64, f64)] = &[
    // 강남구
    ("청담동", 37.5196, 127.0473),
    ("역삼동", 37.5000, 127.0364),
    ("삼성동", 37.5146, 127.0491),
    ("대치동", 37.4932, 127.0576),
    ("압구정동", 37.5275, 127.0286),
    ("논현동", 37.5111, 127.0216),
    ("신사동", 37.5208, 127.0225),
    ("도곡동", 37.4905, 127.0554),
    ("개포동", 37.4789, 127.0525),
    ("일원동", 37.4833, 127.0833),
    // 강서구
    ("화곡동", 37.5414, 126.8404),
    ("등촌동", 37.5567, 126.8567),
    ("마곡동", 37.5667, 126.8267),
    ("가양동", 37.5617, 126.8500),
    ("염창동", 37.5500, 126.8667),
    ("공항동", 37.5583, 126.8083),
    // 마포구
    ("서교동", 37.5563, 126.9238),
    ("연남동", 37.5639, 126.9250),
    ("성산동", 37.5667, 126.9000),
    ("합정동", 37.5500, 126.9139),
    ("상암동", 37.5767, 126.8933),
    // 송파구
    ("잠실동", 37.5133, 127.1028),
    ("신천동", 37.5142, 127.1025),
    ("방이동", 37.5083, 127.1250),
    ("문정동", 37.4850, 127.1233),
    ("가락동", 37.4933, 127.1183),
    ("석촌동", 37.5042, 127.1025),
    // 관악구
    ("신림동", 37.4842, 126.9294),
    ("봉천동", 37.4833, 126.9500),
    ("서원동", 37.4767, 126.9333),
    // 강동구
    ("명일동", 37.5500, 127.1436),
    ("천호동", 37.5383, 127.1233),
    ("성내동", 37.5283, 127.1267),
    ("길동", 37.5367, 127.1400),
    // 영등포구
    ("여의도동", 37.5217, 126.9242),
    ("당산동", 37.5267, 126.8967),
    ("문래동", 37.5167, 126.8967),
    ("신길동", 37.5133, 126.9133),
    // 서초구
    ("반포동", 37.5042, 127.0058),
    ("서초동", 37.4833, 127.0333),
    ("방배동", 37.4833, 126.9967),
    ("양재동", 37.4700, 127.0400),
    // 용산구
    ("이촌동", 37.5192, 126.9767),
    ("한남동", 37.5333, 127.0067),
    ("이태원동", 37.5342, 126.9942),
    // 종로구
    ("종로동", 37.5700, 126.9800),
    ("혜화동", 37.5867, 127.0000),
    // 중구
    ("명동", 37.5633, 126.9833),
    ("을지로동", 37.5667, 126.9900),
    // 노원구
    ("상계동", 37.6633, 127.0733),
    ("하계동", 37.6367, 127.0700),
];

/// Catalogue as owned points
pub fn catalogue_points() -> Vec<RegionPoint> {
    DEFAULT_CATALOGUE
        .iter()
        .map(|(region, lat, lng)| RegionPoint {
            region: region.to_string(),
            lat: *lat,
            lng: *lng,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_names_unique() {
        let names: HashSet<&str> = DEFAULT_CATALOGUE.iter().map(|(n, _, _)| *n).collect();
        assert_eq!(names.len(), DEFAULT_CATALOGUE.len());
    }

    #[test]
    fn test_catalogue_coordinates_in_seoul() {
        for (name, lat, lng) in DEFAULT_CATALOGUE {
            assert!((37.4..37.7).contains(lat), "{} lat {}", name, lat);
            assert!((126.7..127.2).contains(lng), "{} lng {}", name, lng);
        }
    }
}
