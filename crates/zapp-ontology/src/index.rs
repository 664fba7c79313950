//! Reverse index from anatomical structures (ZFA) to the phenotype terms
//! (ZP) that manifest in them, with ZFin literature usage counts for
//! ranking. Built once per graph pair; lookups are O(1) map hits.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use zapp_common::{Result, ZappError};

use crate::graph::{OboGraph, OboNode};

/// Root of the anatomy tree shown by the picker.
pub const ZFA_ROOT: &str = "http://purl.obolibrary.org/obo/ZFA_0001439";
/// Root of the zebrafish phenotype subtree.
pub const ZP_ROOT: &str = "http://purl.obolibrary.org/obo/ZP_0000000";

/// "Phenotype manifests in anatomical entity" cross-ontology predicate.
const PRED_MANIFESTS_IN: &str = "http://purl.obolibrary.org/obo/UPHENO_0000003";
const PRED_IS_A: &str = "is_a";

const PRED_IS_REFERENCED_BY: &str = "http://purl.obolibrary.org/obo/terms_isReferencedBy";
const VAL_INFORES_ZFIN: &str = "http://purl.obolibrary.org/obo/infores_zfin";
const PRED_REFERENCE_COUNT: &str =
    "http://www.geneontology.org/formats/oboInOwl#zapp:hasReferenceCount";

/// How often ZFin literature references a term. Annotation shape:
/// `isReferencedBy -> infores_zfin`, annotated in turn with
/// `hasReferenceCount -> "<n>"`. Absent at any step means 0.
pub fn zfin_usage(node: &OboNode) -> u64 {
    let Some(meta) = &node.meta else {
        return 0;
    };
    for bpv in &meta.basic_property_values {
        if bpv.pred != PRED_IS_REFERENCED_BY || bpv.val != VAL_INFORES_ZFIN {
            continue;
        }
        let Some(nested) = &bpv.meta else {
            return 0;
        };
        for inner in &nested.basic_property_values {
            if inner.pred == PRED_REFERENCE_COUNT {
                return inner.val.parse().unwrap_or(0);
            }
        }
    }
    0
}

/// Collects the id set reachable from `root` by walking `is_a` edges
/// child-to-parent in reverse. Includes the root itself.
fn descendants(graph: &OboGraph, root: &str) -> HashSet<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in graph.edges() {
        if edge.pred == PRED_IS_A {
            children.entry(edge.obj.as_str()).or_default().push(edge.sub.as_str());
        }
    }
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    seen.insert(root.to_string());
    queue.push_back(root);
    while let Some(id) = queue.pop_front() {
        for child in children.get(id).into_iter().flatten() {
            if seen.insert((*child).to_string()) {
                queue.push_back(child);
            }
        }
    }
    seen
}

#[derive(Debug)]
pub struct OntologyIndex {
    anatomy: OboGraph,
    phenotypes: OboGraph,
    /// Anatomy parent id -> direct `is_a` children, restricted to the
    /// subtree under [`ZFA_ROOT`].
    anatomy_children: HashMap<String, Vec<String>>,
    /// ZFA id -> ZP ids with a manifests-in edge onto it.
    zp_by_zfa: HashMap<String, Vec<String>>,
}

impl OntologyIndex {
    pub fn build(anatomy: OboGraph, phenotypes: OboGraph) -> Result<Self> {
        if anatomy.node(ZFA_ROOT).is_none() {
            return Err(ZappError::OntologyLoad(format!(
                "anatomy graph has no root node {}",
                ZFA_ROOT
            )));
        }

        let anatomy_ids = descendants(&anatomy, ZFA_ROOT);
        let mut anatomy_children: HashMap<String, Vec<String>> = HashMap::new();
        for edge in anatomy.edges() {
            if edge.pred == PRED_IS_A && anatomy_ids.contains(&edge.obj) {
                anatomy_children
                    .entry(edge.obj.clone())
                    .or_default()
                    .push(edge.sub.clone());
            }
        }

        let zp_ids = descendants(&phenotypes, ZP_ROOT);
        if zp_ids.len() == 1 {
            warn!("phenotype graph has no terms under {}", ZP_ROOT);
        }
        let mut zp_by_zfa: HashMap<String, Vec<String>> = HashMap::new();
        for edge in phenotypes.edges() {
            if edge.pred == PRED_MANIFESTS_IN && zp_ids.contains(&edge.sub) {
                zp_by_zfa
                    .entry(edge.obj.clone())
                    .or_default()
                    .push(edge.sub.clone());
            }
        }
        debug!(
            anatomy_terms = anatomy_ids.len(),
            phenotype_terms = zp_ids.len(),
            indexed_structures = zp_by_zfa.len(),
            "built ontology index"
        );

        Ok(Self {
            anatomy,
            phenotypes,
            anatomy_children,
            zp_by_zfa,
        })
    }

    pub fn anatomy_root(&self) -> &OboNode {
        // Presence checked in build().
        self.anatomy.node(ZFA_ROOT).unwrap()
    }

    pub fn anatomy_node(&self, id: &str) -> Option<&OboNode> {
        self.anatomy.node(id)
    }

    pub fn phenotype_node(&self, id: &str) -> Option<&OboNode> {
        self.phenotypes.node(id)
    }

    /// Direct anatomical subdivisions, sorted by label for display.
    pub fn children_of(&self, anatomy_id: &str) -> Vec<&OboNode> {
        let mut nodes: Vec<&OboNode> = self
            .anatomy_children
            .get(anatomy_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.anatomy.node(id))
            .collect();
        nodes.sort_by(|a, b| a.display_label().cmp(b.display_label()));
        nodes
    }

    /// Phenotypes that manifest in the given structure, most-referenced
    /// in ZFin first.
    pub fn phenotypes_for(&self, anatomy_id: &str) -> Vec<&OboNode> {
        let mut nodes: Vec<&OboNode> = self
            .zp_by_zfa
            .get(anatomy_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.phenotypes.node(id))
            .collect();
        nodes.sort_by(|a, b| {
            zfin_usage(b)
                .cmp(&zfin_usage(a))
                .then_with(|| a.display_label().cmp(b.display_label()))
        });
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zfa_graph() -> OboGraph {
        OboGraph::parse(
            r#"{"graphs": [{
                "nodes": [
                    {"id": "http://purl.obolibrary.org/obo/ZFA_0001439", "lbl": "anatomical structure"},
                    {"id": "http://purl.obolibrary.org/obo/ZFA_0000010", "lbl": "pericardium"},
                    {"id": "http://purl.obolibrary.org/obo/ZFA_0000029", "lbl": "fin"},
                    {"id": "http://purl.obolibrary.org/obo/ZFA_9999999", "lbl": "orphan"}
                ],
                "edges": [
                    {"sub": "http://purl.obolibrary.org/obo/ZFA_0000010", "pred": "is_a",
                     "obj": "http://purl.obolibrary.org/obo/ZFA_0001439"},
                    {"sub": "http://purl.obolibrary.org/obo/ZFA_0000029", "pred": "is_a",
                     "obj": "http://purl.obolibrary.org/obo/ZFA_0001439"}
                ]
            }]}"#,
        )
        .unwrap()
    }

    fn zp_node(id: &str, label: &str, usage: u64) -> String {
        format!(
            r#"{{"id": "{id}", "lbl": "{label}", "meta": {{"basicPropertyValues": [
                {{"pred": "http://purl.obolibrary.org/obo/terms_isReferencedBy",
                  "val": "http://purl.obolibrary.org/obo/infores_zfin",
                  "meta": {{"basicPropertyValues": [
                      {{"pred": "http://www.geneontology.org/formats/oboInOwl#zapp:hasReferenceCount",
                        "val": "{usage}"}}
                  ]}}}}
            ]}}}}"#
        )
    }

    fn zp_graph() -> OboGraph {
        let root = r#"{"id": "http://purl.obolibrary.org/obo/ZP_0000000", "lbl": "zebrafish phenotype"}"#;
        let edema = zp_node(
            "http://purl.obolibrary.org/obo/ZP_0000755",
            "pericardium edematous, abnormal",
            412,
        );
        let shape = zp_node(
            "http://purl.obolibrary.org/obo/ZP_0001290",
            "pericardium morphology, abnormal",
            37,
        );
        // No ZFin annotation: usage must default to 0.
        let bare = r#"{"id": "http://purl.obolibrary.org/obo/ZP_0005000", "lbl": "pericardium quality, abnormal"}"#;
        // Outside the ZP subtree: must never reach a bucket.
        let stray = r#"{"id": "http://purl.obolibrary.org/obo/MP_0000001", "lbl": "mammalian phenotype"}"#;
        let json = format!(
            r#"{{"graphs": [{{
                "nodes": [{root}, {edema}, {shape}, {bare}, {stray}],
                "edges": [
                    {{"sub": "http://purl.obolibrary.org/obo/ZP_0000755", "pred": "is_a",
                      "obj": "http://purl.obolibrary.org/obo/ZP_0000000"}},
                    {{"sub": "http://purl.obolibrary.org/obo/ZP_0001290", "pred": "is_a",
                      "obj": "http://purl.obolibrary.org/obo/ZP_0000000"}},
                    {{"sub": "http://purl.obolibrary.org/obo/ZP_0005000", "pred": "is_a",
                      "obj": "http://purl.obolibrary.org/obo/ZP_0000000"}},
                    {{"sub": "http://purl.obolibrary.org/obo/ZP_0000755",
                      "pred": "http://purl.obolibrary.org/obo/UPHENO_0000003",
                      "obj": "http://purl.obolibrary.org/obo/ZFA_0000010"}},
                    {{"sub": "http://purl.obolibrary.org/obo/ZP_0001290",
                      "pred": "http://purl.obolibrary.org/obo/UPHENO_0000003",
                      "obj": "http://purl.obolibrary.org/obo/ZFA_0000010"}},
                    {{"sub": "http://purl.obolibrary.org/obo/ZP_0005000",
                      "pred": "http://purl.obolibrary.org/obo/UPHENO_0000003",
                      "obj": "http://purl.obolibrary.org/obo/ZFA_0000010"}},
                    {{"sub": "http://purl.obolibrary.org/obo/MP_0000001",
                      "pred": "http://purl.obolibrary.org/obo/UPHENO_0000003",
                      "obj": "http://purl.obolibrary.org/obo/ZFA_0000029"}}
                ]
            }}]}}"#
        );
        OboGraph::parse(&json).unwrap()
    }

    #[test]
    fn test_build_requires_anatomy_root() {
        let anatomy = OboGraph::parse(r#"{"graphs": [{"nodes": [], "edges": []}]}"#).unwrap();
        assert!(OntologyIndex::build(anatomy, zp_graph()).is_err());
    }

    #[test]
    fn test_children_are_sorted_by_label() {
        let index = OntologyIndex::build(zfa_graph(), zp_graph()).unwrap();
        let labels: Vec<&str> = index
            .children_of(ZFA_ROOT)
            .iter()
            .map(|n| n.display_label())
            .collect();
        assert_eq!(labels, vec!["fin", "pericardium"]);
    }

    #[test]
    fn test_phenotypes_sorted_by_descending_usage() {
        let index = OntologyIndex::build(zfa_graph(), zp_graph()).unwrap();
        let hits = index.phenotypes_for("http://purl.obolibrary.org/obo/ZFA_0000010");
        let ids: Vec<&str> = hits.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "http://purl.obolibrary.org/obo/ZP_0000755",
                "http://purl.obolibrary.org/obo/ZP_0001290",
                "http://purl.obolibrary.org/obo/ZP_0005000",
            ]
        );
        assert_eq!(zfin_usage(hits[0]), 412);
        assert_eq!(zfin_usage(hits[2]), 0);
    }

    #[test]
    fn test_terms_outside_zp_subtree_are_excluded() {
        let index = OntologyIndex::build(zfa_graph(), zp_graph()).unwrap();
        assert!(index
            .phenotypes_for("http://purl.obolibrary.org/obo/ZFA_0000029")
            .is_empty());
    }

    #[test]
    fn test_unindexed_structure_has_no_phenotypes() {
        let index = OntologyIndex::build(zfa_graph(), zp_graph()).unwrap();
        assert!(index.phenotypes_for(ZFA_ROOT).is_empty());
    }
}
