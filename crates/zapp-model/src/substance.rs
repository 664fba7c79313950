//! Chemical substance references: free-text name and/or a typed external
//! identifier (CAS registry number, PubChem CID, or ChEBI id).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdType {
    PubChem,
    #[serde(rename = "CAS")]
    Cas,
    #[serde(rename = "ChEBI")]
    Chebi,
    #[default]
    None,
}

impl IdType {
    pub const ALL: [IdType; 4] = [IdType::PubChem, IdType::Cas, IdType::Chebi, IdType::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::PubChem => "PubChem",
            IdType::Cas => "CAS",
            IdType::Chebi => "ChEBI",
            IdType::None => "None",
        }
    }
}

/// A chemical reference. When `id_type` is `None` the `id` is semantically
/// unused; the update engine clears it, but the schema does not reject a
/// stray value (hand-built JSON with a leftover id still validates).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubstanceId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "idType", default)]
    pub id_type: IdType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubstanceId {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}
