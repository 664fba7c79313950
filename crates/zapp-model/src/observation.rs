//! The aggregate root: one complete observation record as submitted.

use serde::{Deserialize, Serialize};

use crate::exposure::ExposureEvent;
use crate::phenotype::PhenotypeBlock;

/// Where the reported result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "PMID")]
    Pmid,
    #[serde(rename = "DOI")]
    Doi,
    #[serde(rename = "Other publication")]
    OtherPublication,
    #[serde(rename = "Internal database")]
    InternalDatabase,
    #[serde(rename = "Non-published experimental result")]
    NonPublishedExperimentalResult,
    #[serde(rename = "Other")]
    Other,
}

impl SourceType {
    pub const ALL: [SourceType; 6] = [
        SourceType::Pmid,
        SourceType::Doi,
        SourceType::OtherPublication,
        SourceType::InternalDatabase,
        SourceType::NonPublishedExperimentalResult,
        SourceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pmid => "PMID",
            SourceType::Doi => "DOI",
            SourceType::OtherPublication => "Other publication",
            SourceType::InternalDatabase => "Internal database",
            SourceType::NonPublishedExperimentalResult => "Non-published experimental result",
            SourceType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotator_orcid: Option<String>,
    #[serde(default)]
    pub source: SourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

/// Metadata of the selected image file. The bytes themselves never enter
/// the observation; they travel as a separate multipart part at submit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub file: Option<ImageMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FishInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rearing {
    pub standard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_standard_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl Default for Rearing {
    fn default() -> Self {
        Self {
            standard: true,
            non_standard_notes: None,
            additional_notes: None,
        }
    }
}

/// One complete submission record. Created empty at form start, mutated
/// through the update engine only, and either serialized to the submission
/// endpoint or discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub provenance: Provenance,
    pub image: ImageBlock,
    pub fish: FishInfo,
    pub rearing: Rearing,
    pub exposures: Vec<ExposureEvent>,
    pub phenotype: PhenotypeBlock,
}

impl Default for Observation {
    /// The empty form: one default exposure row and one empty phenotype item.
    fn default() -> Self {
        Self {
            provenance: Provenance::default(),
            image: ImageBlock::default(),
            fish: FishInfo::default(),
            rearing: Rearing::default(),
            exposures: vec![ExposureEvent::default()],
            phenotype: PhenotypeBlock::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::{Regimen, Route};

    #[test]
    fn test_default_observation_shape() {
        let obs = Observation::default();
        assert!(obs.rearing.standard);
        assert_eq!(obs.exposures.len(), 1);
        assert_eq!(obs.exposures[0].route, Some(Route::Water));
        assert_eq!(obs.exposures[0].regimen, Regimen::Unspecified);
        assert_eq!(obs.phenotype.items.len(), 1);
        assert!(obs.image.file.is_none());
    }

    #[test]
    fn test_default_round_trips_deep_equal() {
        let obs = Observation::default();
        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obs);
    }

    #[test]
    fn test_source_type_wire_strings() {
        let v = serde_json::to_value(SourceType::NonPublishedExperimentalResult).unwrap();
        assert_eq!(v, "Non-published experimental result");
    }
}
