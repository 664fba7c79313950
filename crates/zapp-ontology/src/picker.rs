//! The phenotype picker session. Graphs are fetched once, on first open,
//! over the capped HTTP client; a failed load leaves the picker degraded
//! and the form's term fields stay free text.

use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use zapp_common::{config::OntologyConfig, CappedClient, Result};
use zapp_form::FormEngine;
use zapp_model::PhenotypeTerm;

use crate::graph::{OboGraph, OboNode};
use crate::index::OntologyIndex;

pub struct PhenotypePicker {
    client: CappedClient,
    config: OntologyConfig,
    /// `None` inside the cell records a failed load; it is not retried.
    index: OnceCell<Option<OntologyIndex>>,
    selection: Option<String>,
    staged: Option<PhenotypeTerm>,
}

impl PhenotypePicker {
    pub fn new(client: CappedClient, config: OntologyConfig) -> Self {
        Self {
            client,
            config,
            index: OnceCell::new(),
            selection: None,
            staged: None,
        }
    }

    /// Builds a picker around an already-constructed index, skipping the
    /// network load. Used with bundled ontology snapshots.
    pub fn preloaded(client: CappedClient, config: OntologyConfig, index: OntologyIndex) -> Self {
        Self {
            client,
            config,
            index: OnceCell::new_with(Some(Some(index))),
            selection: None,
            staged: None,
        }
    }

    #[instrument(skip(self))]
    async fn fetch_graph(&self, uri: &str) -> Result<OboGraph> {
        debug!("fetching ontology graph");
        let body = self
            .client
            .get(uri)?
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        OboGraph::parse(&body)
    }

    async fn load(&self) -> Result<OntologyIndex> {
        let anatomy = self.fetch_graph(&self.config.anatomy_uri).await?;
        let phenotypes = self.fetch_graph(&self.config.phenotype_uri).await?;
        OntologyIndex::build(anatomy, phenotypes)
    }

    /// Loads both graphs on first call; concurrent callers share the one
    /// load. Returns the index, or `None` when loading failed.
    pub async fn ensure_loaded(&self) -> Option<&OntologyIndex> {
        self.index
            .get_or_init(|| async {
                match self.load().await {
                    Ok(index) => Some(index),
                    Err(e) => {
                        warn!(error = %e, "ontology load failed, picker degraded");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    /// True once a load was attempted and failed.
    pub fn is_degraded(&self) -> bool {
        matches!(self.index.get(), Some(None))
    }

    pub fn index(&self) -> Option<&OntologyIndex> {
        self.index.get().and_then(Option::as_ref)
    }

    /// Picks the anatomical structure whose phenotypes to browse.
    pub fn select_anatomy(&mut self, anatomy_id: &str) {
        self.selection = Some(anatomy_id.to_string());
        self.staged = None;
    }

    pub fn selected_anatomy(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Phenotypes manifesting in the selected structure, most-referenced
    /// first. Empty when nothing is selected or the picker is degraded.
    pub fn phenotype_options(&self) -> Vec<&OboNode> {
        match (self.index(), &self.selection) {
            (Some(index), Some(anatomy_id)) => index.phenotypes_for(anatomy_id),
            _ => Vec::new(),
        }
    }

    /// Stages a phenotype term for confirmation. Returns false when the
    /// id is unknown to the loaded graph.
    pub fn stage(&mut self, zp_id: &str) -> bool {
        let term = match self.index().and_then(|ix| ix.phenotype_node(zp_id)) {
            Some(node) => PhenotypeTerm::new(&node.id, node.label.as_deref()),
            None => {
                warn!(zp_id, "cannot stage unknown phenotype term");
                return false;
            }
        };
        self.staged = Some(term);
        true
    }

    pub fn staged(&self) -> Option<&PhenotypeTerm> {
        self.staged.as_ref()
    }

    /// Commits the staged term into the given phenotype item and closes
    /// the session. Returns false, leaving the staged term in place, when
    /// nothing was staged or the item does not exist.
    pub fn confirm(&mut self, engine: &mut FormEngine, item_idx: usize) -> bool {
        if self.staged.is_none() {
            return false;
        }
        if item_idx >= engine.observation().phenotype.items.len() {
            warn!(item_idx, "cannot commit staged term to a missing phenotype item");
            return false;
        }
        engine.set_phenotype_term(item_idx, self.staged.take());
        self.selection = None;
        true
    }

    /// Discards any staged term without touching the observation.
    pub fn cancel(&mut self) {
        self.staged = None;
        self.selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ZFA_ROOT;
    use zapp_model::ValidationOptions;

    const PERICARDIUM: &str = "http://purl.obolibrary.org/obo/ZFA_0000010";
    const EDEMA: &str = "http://purl.obolibrary.org/obo/ZP_0000755";

    fn test_index() -> OntologyIndex {
        let zfa = OboGraph::parse(
            r#"{"graphs": [{
                "nodes": [
                    {"id": "http://purl.obolibrary.org/obo/ZFA_0001439", "lbl": "anatomical structure"},
                    {"id": "http://purl.obolibrary.org/obo/ZFA_0000010", "lbl": "pericardium"}
                ],
                "edges": [
                    {"sub": "http://purl.obolibrary.org/obo/ZFA_0000010", "pred": "is_a",
                     "obj": "http://purl.obolibrary.org/obo/ZFA_0001439"}
                ]
            }]}"#,
        )
        .unwrap();
        let zp = OboGraph::parse(
            r#"{"graphs": [{
                "nodes": [
                    {"id": "http://purl.obolibrary.org/obo/ZP_0000000", "lbl": "zebrafish phenotype"},
                    {"id": "http://purl.obolibrary.org/obo/ZP_0000755", "lbl": "pericardium edematous, abnormal"}
                ],
                "edges": [
                    {"sub": "http://purl.obolibrary.org/obo/ZP_0000755", "pred": "is_a",
                     "obj": "http://purl.obolibrary.org/obo/ZP_0000000"},
                    {"sub": "http://purl.obolibrary.org/obo/ZP_0000755",
                     "pred": "http://purl.obolibrary.org/obo/UPHENO_0000003",
                     "obj": "http://purl.obolibrary.org/obo/ZFA_0000010"}
                ]
            }]}"#,
        )
        .unwrap();
        OntologyIndex::build(zfa, zp).unwrap()
    }

    fn test_picker() -> PhenotypePicker {
        PhenotypePicker::preloaded(
            CappedClient::new().unwrap(),
            OntologyConfig::default(),
            test_index(),
        )
    }

    #[test]
    fn test_confirm_commits_staged_term() {
        let mut picker = test_picker();
        let mut engine = FormEngine::new(ValidationOptions::default());

        picker.select_anatomy(PERICARDIUM);
        let options = picker.phenotype_options();
        assert_eq!(options.len(), 1);
        assert!(picker.stage(EDEMA));

        assert!(picker.confirm(&mut engine, 0));
        let item = &engine.observation().phenotype.items[0];
        assert_eq!(item.term_id.as_deref(), Some(EDEMA));
        assert_eq!(item.term_label.as_deref(), Some("pericardium edematous, abnormal"));
        assert!(picker.staged().is_none());
        assert!(picker.selected_anatomy().is_none());
    }

    #[test]
    fn test_cancel_leaves_observation_untouched() {
        let mut picker = test_picker();
        let mut engine = FormEngine::new(ValidationOptions::default());

        picker.select_anatomy(PERICARDIUM);
        assert!(picker.stage(EDEMA));
        picker.cancel();

        assert!(picker.staged().is_none());
        assert!(!picker.confirm(&mut engine, 0));
        assert!(engine.observation().phenotype.items[0].term_id.is_none());
    }

    #[test]
    fn test_confirm_fails_for_missing_item() {
        let mut picker = test_picker();
        let mut engine = FormEngine::new(ValidationOptions::default());

        picker.select_anatomy(PERICARDIUM);
        assert!(picker.stage(EDEMA));
        assert!(!picker.confirm(&mut engine, 5));
        // The staged term survives a failed commit and can be retried.
        assert!(picker.staged().is_some());
        assert!(engine.observation().phenotype.items[0].term_id.is_none());

        assert!(picker.confirm(&mut engine, 0));
        assert_eq!(
            engine.observation().phenotype.items[0].term_id.as_deref(),
            Some(EDEMA)
        );
    }

    #[test]
    fn test_stage_rejects_unknown_term() {
        let mut picker = test_picker();
        assert!(!picker.stage("http://purl.obolibrary.org/obo/ZP_9999999"));
        assert!(picker.staged().is_none());
    }

    #[test]
    fn test_selecting_anatomy_discards_stale_stage() {
        let mut picker = test_picker();
        picker.select_anatomy(PERICARDIUM);
        assert!(picker.stage(EDEMA));
        picker.select_anatomy(ZFA_ROOT);
        assert!(picker.staged().is_none());
        assert!(picker.phenotype_options().is_empty());
    }

    #[tokio::test]
    async fn test_blocked_host_degrades_picker() {
        let config = OntologyConfig {
            anatomy_uri: "http://blocked.example.com/zfa.json".to_string(),
            phenotype_uri: "http://blocked.example.com/zp-zapp.json".to_string(),
        };
        let picker = PhenotypePicker::new(CappedClient::new().unwrap(), config);
        assert!(!picker.is_degraded());
        assert!(picker.ensure_loaded().await.is_none());
        assert!(picker.is_degraded());
        // A later open does not retry the failed load.
        assert!(picker.ensure_loaded().await.is_none());
        assert!(picker.phenotype_options().is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_ontology_load() {
        let picker = PhenotypePicker::new(
            CappedClient::new().unwrap(),
            OntologyConfig::default(),
        );
        let index = picker.ensure_loaded().await.expect("ontology served locally");
        assert!(!index.children_of(ZFA_ROOT).is_empty());
    }
}
