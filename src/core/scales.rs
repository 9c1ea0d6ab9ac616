use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rank given to degree labels that are not in the table
pub const UNKNOWN_DEGREE: i32 = -1;

/// Level given to proficiency labels that are not in the table
pub const UNKNOWN_PROFICIENCY: u8 = 0;

/// Ordinal ranking of education degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DegreeScale {
    ranks: HashMap<String, i32>,
}

impl DegreeScale {
    pub fn new(ranks: HashMap<String, i32>) -> Self {
        Self { ranks }
    }

    /// Rank of a degree label, `UNKNOWN_DEGREE` when unrecognized
    #[inline]
    pub fn scale(&self, degree: &str) -> i32 {
        self.ranks.get(degree).copied().unwrap_or(UNKNOWN_DEGREE)
    }

    pub fn contains(&self, degree: &str) -> bool {
        self.ranks.contains_key(degree)
    }
}

impl Default for DegreeScale {
    fn default() -> Self {
        let ranks = [
            ("none", 0),
            ("apprenticeship", 1),
            ("associate", 2),
            ("bachelor", 3),
            ("master", 4),
            ("doctorate", 5),
        ]
        .into_iter()
        .map(|(label, rank)| (label.to_string(), rank))
        .collect();
        Self { ranks }
    }
}

/// CEFR proficiency labels (A1..C2) mapped onto 1..6
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CefrTable")]
pub struct CefrScale {
    levels: HashMap<String, u8>,
    /// Rating assumed for a required language the talent does not list
    missing_rating: String,
}

/// Configured CEFR table. Layered config sources may fold key case, so
/// labels are restored to upper case on the way in.
#[derive(Deserialize)]
struct CefrTable {
    levels: HashMap<String, u8>,
    #[serde(default = "default_missing_rating")]
    missing_rating: String,
}

impl From<CefrTable> for CefrScale {
    fn from(table: CefrTable) -> Self {
        let levels = table
            .levels
            .into_iter()
            .map(|(label, level)| (label.to_ascii_uppercase(), level))
            .collect();
        Self::new(levels, table.missing_rating.to_ascii_uppercase())
    }
}

fn default_missing_rating() -> String { "A1".to_string() }

impl CefrScale {
    pub fn new(levels: HashMap<String, u8>, missing_rating: impl Into<String>) -> Self {
        Self {
            levels,
            missing_rating: missing_rating.into(),
        }
    }

    /// Numeric level of a rating label, `UNKNOWN_PROFICIENCY` when unrecognized
    #[inline]
    pub fn level(&self, rating: &str) -> u8 {
        self.levels.get(rating).copied().unwrap_or(UNKNOWN_PROFICIENCY)
    }

    pub fn missing_rating(&self) -> &str {
        &self.missing_rating
    }

    pub fn contains(&self, rating: &str) -> bool {
        self.levels.contains_key(rating)
    }
}

impl Default for CefrScale {
    fn default() -> Self {
        let levels = ["A1", "A2", "B1", "B2", "C1", "C2"]
            .into_iter()
            .zip(1u8..)
            .map(|(label, level)| (label.to_string(), level))
            .collect();
        Self {
            levels,
            missing_rating: default_missing_rating(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_scale_is_monotonic() {
        let scale = DegreeScale::default();
        let order = ["none", "apprenticeship", "associate", "bachelor", "master", "doctorate"];
        for pair in order.windows(2) {
            assert!(scale.scale(pair[0]) < scale.scale(pair[1]));
        }
        assert_eq!(scale.scale("none"), 0);
        assert_eq!(scale.scale("doctorate"), 5);
    }

    #[test]
    fn test_unknown_degree_is_sentinel() {
        let scale = DegreeScale::default();
        assert_eq!(scale.scale("wizard"), UNKNOWN_DEGREE);
        assert_eq!(scale.scale(""), UNKNOWN_DEGREE);
        // Case matters
        assert_eq!(scale.scale("Bachelor"), UNKNOWN_DEGREE);
    }

    #[test]
    fn test_cefr_levels() {
        let scale = CefrScale::default();
        assert_eq!(scale.level("A1"), 1);
        assert_eq!(scale.level("B2"), 4);
        assert_eq!(scale.level("C2"), 6);
        assert_eq!(scale.level("native"), UNKNOWN_PROFICIENCY);
        assert_eq!(scale.missing_rating(), "A1");
    }

    #[test]
    fn test_configured_cefr_labels_are_upper_cased() {
        let scale: CefrScale =
            serde_json::from_str(r#"{"levels": {"a1": 1, "b2": 4}, "missing_rating": "a1"}"#).unwrap();
        assert_eq!(scale.level("B2"), 4);
        assert_eq!(scale.level("b2"), UNKNOWN_PROFICIENCY);
        assert_eq!(scale.missing_rating(), "A1");
    }

    #[test]
    fn test_scales_are_overridable() {
        let mut ranks = HashMap::new();
        ranks.insert("phd".to_string(), 9);
        let scale = DegreeScale::new(ranks);
        assert_eq!(scale.scale("phd"), 9);
        assert_eq!(scale.scale("doctorate"), UNKNOWN_DEGREE);
    }
}
