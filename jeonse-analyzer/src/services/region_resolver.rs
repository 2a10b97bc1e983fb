//! Free-text region to district code resolution
//!
//! Only Seoul's 25 districts and a fixed table of well-known neighbourhoods
//! are recognised. Resolution is total: unknown input resolves to the
//! configured default district and is flagged as a fallback.

use crate::models::AdministrativeCode;
use tracing::warn;

/// District names and codes, in lookup order
pub const SEOUL_DISTRICTS: &[(&str, &str)] = &[
    ("종로구", "11110"),
    ("중구", "11140"),
    ("용산구", "11170"),
    ("성동구", "11200"),
    ("광진구", "11215"),
    ("동대문구", "11230"),
    ("중랑구", "11260"),
    ("성북구", "11290"),
    ("강북구", "11305"),
    ("도봉구", "11320"),
    ("노원구", "11350"),
    ("은평구", "11380"),
    ("서대문구", "11410"),
    ("마포구", "11440"),
    ("양천구", "11470"),
    ("강서구", "11500"),
    ("구로구", "11530"),
    ("금천구", "11545"),
    ("영등포구", "11560"),
    ("동작구", "11590"),
    ("관악구", "11620"),
    ("서초구", "11650"),
    ("강남구", "11680"),
    ("송파구", "11710"),
    ("강동구", "11740"),
];

/// Neighbourhood to district table
///
/// Neighbourhood names are not unique across Seoul (신사동 exists in both
/// 강남구 and 은평구). Only the first mapping is kept.
pub const NEIGHBORHOOD_DISTRICTS: &[(&str, &str)] = &[
    ("청담동", "강남구"),
    ("역삼동", "강남구"),
    ("삼성동", "강남구"),
    ("대치동", "강남구"),
    ("압구정동", "강남구"),
    ("논현동", "강남구"),
    ("신사동", "강남구"),
    ("도곡동", "강남구"),
    ("개포동", "강남구"),
    ("수서동", "강남구"),
    ("일원동", "강남구"),
    ("세곡동", "강남구"),
    ("화곡동", "강서구"),
    ("등촌동", "강서구"),
    ("마곡동", "강서구"),
    ("가양동", "강서구"),
    ("방화동", "강서구"),
    ("공항동", "강서구"),
    ("염창동", "강서구"),
    ("신정동", "강서구"),
    ("목동", "양천구"),
    ("신월동", "양천구"),
    ("서교동", "마포구"),
    ("연남동", "마포구"),
    ("성산동", "마포구"),
    ("합정동", "마포구"),
    ("상암동", "마포구"),
    ("공덕동", "마포구"),
    ("아현동", "마포구"),
    ("도화동", "마포구"),
    ("문래동", "영등포구"),
    ("여의도동", "영등포구"),
    ("당산동", "영등포구"),
    ("신길동", "영등포구"),
    ("대림동", "영등포구"),
    ("양평동", "영등포구"),
    ("도림동", "영등포구"),
    ("독산동", "금천구"),
    ("가산동", "금천구"),
    ("시흥동", "금천구"),
    ("신림동", "관악구"),
    ("봉천동", "관악구"),
    ("남현동", "관악구"),
    ("서원동", "관악구"),
    ("잠실동", "송파구"),
    ("신천동", "송파구"),
    ("방이동", "송파구"),
    ("문정동", "송파구"),
    ("가락동", "송파구"),
    ("거여동", "송파구"),
    ("마천동", "송파구"),
    ("장지동", "송파구"),
    ("석촌동", "송파구"),
    ("오금동", "송파구"),
    ("송파동", "송파구"),
    ("잠실본동", "송파구"),
    ("명일동", "강동구"),
    ("고덕동", "강동구"),
    ("상일동", "강동구"),
    ("천호동", "강동구"),
    ("길동", "강동구"),
    ("둔촌동", "강동구"),
    ("암사동", "강동구"),
    ("사직동", "종로구"),
    ("삼청동", "종로구"),
    ("혜화동", "종로구"),
    ("이화동", "종로구"),
    ("명륜동", "종로구"),
    ("와룡동", "종로구"),
    ("무악동", "종로구"),
    ("교남동", "종로구"),
    ("반포동", "서초구"),
    ("잠원동", "서초구"),
    ("방배동", "서초구"),
    ("양재동", "서초구"),
    ("내곡동", "서초구"),
    ("염곡동", "서초구"),
    ("서초동", "서초구"),
    ("미아동", "강북구"),
    ("번동", "강북구"),
    ("수유동", "강북구"),
    ("우이동", "강북구"),
    ("월계동", "노원구"),
    ("공릉동", "노원구"),
    ("하계동", "노원구"),
    ("중계동", "노원구"),
    ("상계동", "노원구"),
    ("불광동", "은평구"),
    ("녹번동", "은평구"),
    ("응암동", "은평구"),
    ("역촌동", "은평구"),
    ("구산동", "은평구"),
    ("갈현동", "은평구"),
    ("이태원동", "용산구"),
    ("한남동", "용산구"),
    ("이촌동", "용산구"),
    ("용산동", "용산구"),
    ("한강로동", "용산구"),
    ("왕십리동", "성동구"),
    ("성수동", "성동구"),
    ("행당동", "성동구"),
];

/// Suffix classes for neighbourhood tokens, in priority order
const NEIGHBORHOOD_SUFFIXES: [char; 3] = ['동', '가', '리'];

/// How a code was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// A district name appeared in the input
    District,
    /// The neighbourhood table supplied the district
    Neighborhood,
    /// Nothing matched; the default district was used
    Fallback,
}

/// Outcome of resolving one region string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub code: AdministrativeCode,
    /// Extracted neighbourhood token, or the whole input when none was found
    pub neighborhood: String,
    /// False when `neighborhood` is just the raw input
    pub neighborhood_extracted: bool,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn was_fallback(&self) -> bool {
        self.source == ResolutionSource::Fallback
    }

    /// Neighbourhood usable as a record filter
    pub fn neighborhood_filter(&self) -> Option<&str> {
        self.neighborhood_extracted
            .then_some(self.neighborhood.as_str())
    }
}

/// Resolves region strings against the fixed Seoul tables
#[derive(Debug, Clone)]
pub struct RegionResolver {
    default_code: AdministrativeCode,
}

impl RegionResolver {
    pub fn new(default_code: impl Into<String>) -> Self {
        Self {
            default_code: AdministrativeCode::new(default_code),
        }
    }

    pub fn default_code(&self) -> &AdministrativeCode {
        &self.default_code
    }

    pub fn resolve(&self, region: &str) -> Resolution {
        let extracted = extract_neighborhood(region);
        let neighborhood_extracted = extracted.is_some();
        let neighborhood = extracted.unwrap_or_else(|| region.trim().to_string());

        if let Some(code) = district_in_text(region) {
            return Resolution {
                code: AdministrativeCode::new(code),
                neighborhood,
                neighborhood_extracted,
                source: ResolutionSource::District,
            };
        }

        let district = if neighborhood_extracted {
            district_of_neighborhood(&neighborhood)
        } else {
            None
        }
        .or_else(|| neighborhood_in_text(region));

        if let Some(code) = district.and_then(district_code) {
            return Resolution {
                code: AdministrativeCode::new(code),
                neighborhood,
                neighborhood_extracted,
                source: ResolutionSource::Neighborhood,
            };
        }

        warn!(
            region = %region,
            default_code = %self.default_code,
            "No district code found for region, using default"
        );
        Resolution {
            code: self.default_code.clone(),
            neighborhood,
            neighborhood_extracted,
            source: ResolutionSource::Fallback,
        }
    }
}

/// Extract the first word ending in a neighbourhood suffix
///
/// Words are runs of Hangul syllables and ASCII digits. Suffix classes are
/// tried in priority order over the whole input, so `"역삼1가 대치동"`
/// yields `대치동`.
pub fn extract_neighborhood(region: &str) -> Option<String> {
    let words: Vec<&str> = region
        .split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .collect();

    NEIGHBORHOOD_SUFFIXES.iter().find_map(|suffix| {
        words
            .iter()
            .find(|w| w.ends_with(*suffix) && w.chars().count() >= 2)
            .map(|w| w.to_string())
    })
}

fn is_word_char(c: char) -> bool {
    ('가'..='힣').contains(&c) || c.is_ascii_digit()
}

/// Code of the first district whose name appears in `text`
pub fn district_in_text(text: &str) -> Option<&'static str> {
    SEOUL_DISTRICTS
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|(_, code)| *code)
}

/// Code for a district name
pub fn district_code(district: &str) -> Option<&'static str> {
    SEOUL_DISTRICTS
        .iter()
        .find(|(name, _)| *name == district)
        .map(|(_, code)| *code)
}

/// District of an exact neighbourhood name
pub fn district_of_neighborhood(neighborhood: &str) -> Option<&'static str> {
    NEIGHBORHOOD_DISTRICTS
        .iter()
        .find(|(name, _)| *name == neighborhood)
        .map(|(_, district)| *district)
}

/// District of the first table neighbourhood contained in `text`
fn neighborhood_in_text(text: &str) -> Option<&'static str> {
    NEIGHBORHOOD_DISTRICTS
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|(_, district)| *district)
}

/// District codes whose stem (name without `구`) occurs in `text`
///
/// `"서초 반포자이"` names 서초구 without its suffix; the orchestrator uses
/// this when regular resolution fell back.
pub fn district_stems_in_text(text: &str) -> Vec<&'static str> {
    SEOUL_DISTRICTS
        .iter()
        .filter(|(name, _)| {
            let stem = name.trim_end_matches('구');
            stem.chars().count() >= 2 && text.contains(stem)
        })
        .map(|(_, code)| *code)
        .collect()
}
