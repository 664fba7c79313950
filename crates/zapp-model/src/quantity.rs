//! Primitive value types: free-unit quantities and the fixed-unit
//! developmental-stage and duration quantities.

use serde::{Deserialize, Serialize};

/// A numeric value with a free-text unit, both nullable. Used for substance
/// concentrations, where the unit is either one of the common options
/// (`uM`, `mg/L`) or whatever the annotator types in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Option<f64>,
    pub unit: Option<String>,
}

impl Quantity {
    pub fn new(value: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            value,
            unit: unit.map(String::from),
        }
    }
}

/// A numeric value with a typed unit, both nullable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitQuantity<U> {
    pub value: Option<f64>,
    pub unit: Option<U>,
}

impl<U> Default for UnitQuantity<U> {
    fn default() -> Self {
        Self { value: None, unit: None }
    }
}

impl<U> UnitQuantity<U> {
    pub fn new(value: Option<f64>, unit: Option<U>) -> Self {
        Self { value, unit }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.unit.is_none()
    }
}

/// Developmental-stage marker (exposure start/end, phenotype observation time).
pub type Stage = UnitQuantity<StageUnit>;

/// Elapsed-time quantity (continuous exposure length, repeated-dosing windows).
pub type Duration = UnitQuantity<DurationUnit>;

/// Zebrafish developmental-stage units: hours/days post-fertilization, or months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageUnit {
    Hpf,
    Dpf,
    Month,
}

impl StageUnit {
    pub const ALL: [StageUnit; 3] = [StageUnit::Hpf, StageUnit::Dpf, StageUnit::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageUnit::Hpf => "hpf",
            StageUnit::Dpf => "dpf",
            StageUnit::Month => "month",
        }
    }
}

/// Duration units. An earlier schema generation used `{hour, min}` only;
/// `min` is accepted as an input alias for `minute`, and the narrowed unit
/// set is a validation option rather than a separate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    #[serde(rename = "minute", alias = "min")]
    Minute,
    #[serde(rename = "hour")]
    Hour,
    #[serde(rename = "day")]
    Day,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 3] = [DurationUnit::Minute, DurationUnit::Hour, DurationUnit::Day];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Minute => "minute",
            DurationUnit::Hour => "hour",
            DurationUnit::Day => "day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "minute" | "min" => Some(DurationUnit::Minute),
            "hour" => Some(DurationUnit::Hour),
            "day" => Some(DurationUnit::Day),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_unit_wire_names() {
        let stage = Stage::new(Some(24.0), Some(StageUnit::Hpf));
        let json = serde_json::to_string(&stage).unwrap();
        assert_eq!(json, r#"{"value":24.0,"unit":"hpf"}"#);
    }

    #[test]
    fn test_duration_legacy_min_alias() {
        let d: Duration = serde_json::from_str(r#"{"value":30,"unit":"min"}"#).unwrap();
        assert_eq!(d.unit, Some(DurationUnit::Minute));
        // Canonical name on the way back out
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("minute"));
    }

    #[test]
    fn test_empty_quantity_round_trip() {
        let d = Duration::default();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"value":null,"unit":null}"#);
        let back: Duration = serde_json::from_str(&json).unwrap();
        assert!(back.is_empty());
    }
}
