//! Serde model of OBO-graph JSON documents as published on the OBO PURL
//! servers. Only the fields the picker consumes are modelled; everything
//! else in the document is ignored during deserialization.

use std::collections::HashMap;

use serde::Deserialize;

use zapp_common::{Result, ZappError};

/// Top-level OBO-graph document: `{"graphs": [...]}`.
#[derive(Debug, Deserialize)]
struct OboDocument {
    #[serde(default)]
    graphs: Vec<RawGraph>,
}

#[derive(Debug, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<OboNode>,
    #[serde(default)]
    edges: Vec<OboEdge>,
}

/// One ontology class. `id` is the full term IRI.
#[derive(Debug, Clone, Deserialize)]
pub struct OboNode {
    pub id: String,
    #[serde(rename = "lbl", default)]
    pub label: Option<String>,
    #[serde(default)]
    pub meta: Option<NodeMeta>,
}

impl OboNode {
    /// The label, or the IRI when the node carries none.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeMeta {
    #[serde(rename = "basicPropertyValues", default)]
    pub basic_property_values: Vec<BasicPropertyValue>,
}

/// An annotation triple on a node. Annotations can themselves be
/// annotated, which is how per-source reference counts are attached.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicPropertyValue {
    pub pred: String,
    pub val: String,
    #[serde(default)]
    pub meta: Option<NodeMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OboEdge {
    pub sub: String,
    pub pred: String,
    pub obj: String,
}

/// The first (and in practice only) graph of a document, with nodes
/// keyed by IRI for O(1) lookup.
#[derive(Debug)]
pub struct OboGraph {
    nodes: HashMap<String, OboNode>,
    edges: Vec<OboEdge>,
}

impl OboGraph {
    pub fn parse(json: &str) -> Result<Self> {
        let doc: OboDocument = serde_json::from_str(json)?;
        let graph = doc
            .graphs
            .into_iter()
            .next()
            .ok_or_else(|| ZappError::OntologyLoad("document contains no graphs".to_string()))?;
        let nodes = graph
            .nodes
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        Ok(Self {
            nodes,
            edges: graph.edges,
        })
    }

    pub fn node(&self, id: &str) -> Option<&OboNode> {
        self.nodes.get(id)
    }

    pub fn edges(&self) -> &[OboEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
