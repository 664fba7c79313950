//! Observed phenotype outcomes: controlled-vocabulary term, prevalence,
//! and severity, plus the observation-stage block that groups them.

use serde::{Deserialize, Serialize};

use crate::quantity::{Stage, StageUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

/// A resolved ontology term ready to be committed into a phenotype item.
/// Some ZP nodes carry no label, so the label stays optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhenotypeTerm {
    pub id: String,
    pub label: Option<String>,
}

impl PhenotypeTerm {
    pub fn new(id: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            id: id.into(),
            label: label.map(str::to_string),
        }
    }
}

/// One observed phenotype. `term_id`/`term_label` are filled by the
/// ontology picker (ZP term IRI and label) or left as free text when the
/// picker is degraded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhenotypeItem {
    #[serde(rename = "termId", default, skip_serializing_if = "Option::is_none")]
    pub term_id: Option<String>,
    #[serde(rename = "termLabel", default, skip_serializing_if = "Option::is_none")]
    pub term_label: Option<String>,
    #[serde(rename = "prevalencePercent", default)]
    pub prevalence_percent: Option<f64>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// The phenotype block: when the phenotypes were observed, and at least one
/// phenotype item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeBlock {
    pub observation_stage: Stage,
    pub items: Vec<PhenotypeItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl Default for PhenotypeBlock {
    fn default() -> Self {
        Self {
            observation_stage: Stage::new(None, Some(StageUnit::Hpf)),
            items: vec![PhenotypeItem::default()],
            additional_notes: None,
        }
    }
}
