//! The typed shoe filter/sort request.
//!
//! Every field is either a valid partial spec or explicitly the `"empty"`
//! sentinel; a field is never absent in a way that is ambiguous with "no
//! constraint". The JSON shape matches what the extraction prompt asks the
//! model for: camelCase keys, `{min, max, sort}` range objects, and the
//! literal string `"empty"` for unconstrained fields.

use serde::{Deserialize, Serialize};

/// The literal `"empty"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentinel {
    Empty,
}

/// Sort direction for a range attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A numeric range/sort spec, or the explicit "not specified" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    Empty(Sentinel),
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sort: Option<SortOrder>,
    },
}

impl RangeSpec {
    /// The explicit "not specified" value.
    #[must_use]
    pub fn empty() -> Self {
        RangeSpec::Empty(Sentinel::Empty)
    }

    pub fn min(&self) -> Option<f64> {
        match self {
            RangeSpec::Range { min, .. } => *min,
            RangeSpec::Empty(_) => None,
        }
    }

    pub fn max(&self) -> Option<f64> {
        match self {
            RangeSpec::Range { max, .. } => *max,
            RangeSpec::Empty(_) => None,
        }
    }

    pub fn sort(&self) -> Option<SortOrder> {
        match self {
            RangeSpec::Range { sort, .. } => *sort,
            RangeSpec::Empty(_) => None,
        }
    }
}

/// A string filter, or the explicit "not specified" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringSpec {
    Empty(Sentinel),
    Value(String),
}

impl StringSpec {
    /// The explicit "not specified" value.
    #[must_use]
    pub fn empty() -> Self {
        StringSpec::Empty(Sentinel::Empty)
    }

    /// The filter value, unless the spec is the sentinel or blank.
    pub fn value(&self) -> Option<&str> {
        match self {
            StringSpec::Value(s) if !s.is_empty() && s != "empty" => Some(s),
            _ => None,
        }
    }
}

/// A partially-specified filter/sort request against the shoe catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShoeSearchConditions {
    /// Keywords matched across names, brands, uses, variants, and reviews
    pub keywords: Option<Vec<String>>,

    /// One logical stack-height spec applied to both the forefoot and heel
    /// measurements
    pub stack_height_mm: RangeSpec,

    /// Heel-to-forefoot drop
    pub drop: RangeSpec,

    pub width: StringSpec,
    pub intended_use: StringSpec,
    pub gender: StringSpec,

    /// Requested result cap; the effective cap never exceeds the hard limit
    pub limit: Option<u32>,
}

impl Default for ShoeSearchConditions {
    fn default() -> Self {
        Self {
            keywords: None,
            stack_height_mm: RangeSpec::empty(),
            drop: RangeSpec::empty(),
            width: StringSpec::empty(),
            intended_use: StringSpec::empty(),
            gender: StringSpec::empty(),
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_roundtrip() {
        let spec: RangeSpec = serde_json::from_value(json!("empty")).unwrap();
        assert_eq!(spec, RangeSpec::empty());
        assert_eq!(serde_json::to_value(&spec).unwrap(), json!("empty"));
    }

    #[test]
    fn test_range_parse() {
        let spec: RangeSpec = serde_json::from_value(json!({"min": 0, "max": 4, "sort": "asc"})).unwrap();
        assert_eq!(spec.min(), Some(0.0));
        assert_eq!(spec.max(), Some(4.0));
        assert_eq!(spec.sort(), Some(SortOrder::Asc));
    }

    #[test]
    fn test_partial_range_parse() {
        let spec: RangeSpec = serde_json::from_value(json!({"sort": "desc"})).unwrap();
        assert_eq!(spec.min(), None);
        assert_eq!(spec.max(), None);
        assert_eq!(spec.sort(), Some(SortOrder::Desc));
    }

    #[test]
    fn test_string_spec_sentinel() {
        let spec: StringSpec = serde_json::from_value(json!("empty")).unwrap();
        assert_eq!(spec, StringSpec::empty());
        assert_eq!(spec.value(), None);
    }

    #[test]
    fn test_string_spec_value() {
        let spec: StringSpec = serde_json::from_value(json!("trail")).unwrap();
        assert_eq!(spec.value(), Some("trail"));
    }

    #[test]
    fn test_conditions_full_parse() {
        let conditions: ShoeSearchConditions = serde_json::from_value(json!({
            "keywords": ["trail"],
            "stackHeightMm": {"max": 20},
            "drop": {"min": 0, "max": 0},
            "width": "empty",
            "intendedUse": "trail",
            "gender": "women",
            "limit": 3
        }))
        .unwrap();

        assert_eq!(conditions.keywords, Some(vec!["trail".to_string()]));
        assert_eq!(conditions.stack_height_mm.max(), Some(20.0));
        assert_eq!(conditions.drop.min(), Some(0.0));
        assert_eq!(conditions.drop.max(), Some(0.0));
        assert_eq!(conditions.width.value(), None);
        assert_eq!(conditions.intended_use.value(), Some("trail"));
        assert_eq!(conditions.gender.value(), Some("women"));
        assert_eq!(conditions.limit, Some(3));
    }

    #[test]
    fn test_conditions_omitted_fields_default_to_empty() {
        // A model reply may drop fields entirely; the parsed value is still
        // explicit, never ambiguous-absent
        let conditions: ShoeSearchConditions = serde_json::from_value(json!({
            "intendedUse": "road"
        }))
        .unwrap();

        assert_eq!(conditions.stack_height_mm, RangeSpec::empty());
        assert_eq!(conditions.drop, RangeSpec::empty());
        assert_eq!(conditions.gender, StringSpec::empty());
        assert_eq!(conditions.keywords, None);
        assert_eq!(conditions.limit, None);
    }

    #[test]
    fn test_default_is_all_empty() {
        let conditions = ShoeSearchConditions::default();
        assert_eq!(conditions.stack_height_mm, RangeSpec::empty());
        assert_eq!(conditions.drop, RangeSpec::empty());
        assert_eq!(conditions.width.value(), None);
    }
}
