//! The substance reference dataset: one JSON array of chemical records
//! with a display label, external identifiers, and PubChem synonyms.

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use zapp_common::{config::SubstanceConfig, CappedClient, Result, ZappError};
use zapp_model::{IdType, SubstanceId};

use crate::rank;

#[derive(Debug, Clone, Deserialize)]
pub struct SubstanceRecord {
    pub label: String,
    #[serde(default)]
    pub cas_numbers: Vec<String>,
    #[serde(default)]
    pub chebi_ids: Vec<String>,
    #[serde(default)]
    pub pubchem_cids: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl SubstanceRecord {
    /// All external identifiers, in the order the id match tiers scan
    /// them.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.cas_numbers
            .iter()
            .chain(self.chebi_ids.iter())
            .chain(self.pubchem_cids.iter())
            .map(String::as_str)
    }

    /// A filled-in substance field for this record. CAS is the preferred
    /// identifier system, then ChEBI, then the PubChem CID.
    pub fn to_substance_id(&self) -> SubstanceId {
        let (id_type, id) = if let Some(cas) = self.cas_numbers.first() {
            (IdType::Cas, Some(cas.clone()))
        } else if let Some(chebi) = self.chebi_ids.first() {
            (IdType::Chebi, Some(chebi.clone()))
        } else if let Some(cid) = self.pubchem_cids.first() {
            (IdType::PubChem, Some(cid.clone()))
        } else {
            (IdType::None, None)
        };
        SubstanceId {
            name: Some(self.label.clone()),
            id_type,
            id,
        }
    }
}

/// Lazily fetched catalog. A failed fetch degrades autocomplete to no
/// suggestions; free-text entry keeps working.
pub struct SubstanceCatalog {
    client: CappedClient,
    config: SubstanceConfig,
    records: OnceCell<Option<Vec<SubstanceRecord>>>,
}

impl SubstanceCatalog {
    pub fn new(client: CappedClient, config: SubstanceConfig) -> Self {
        Self {
            client,
            config,
            records: OnceCell::new(),
        }
    }

    /// Catalog built from already-loaded records, skipping the fetch.
    pub fn from_records(
        client: CappedClient,
        config: SubstanceConfig,
        records: Vec<SubstanceRecord>,
    ) -> Self {
        Self {
            client,
            config,
            records: OnceCell::new_with(Some(Some(records))),
        }
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<SubstanceRecord>> {
        debug!(uri = %self.config.catalog_uri, "fetching substance catalog");
        let body = self
            .client
            .get(&self.config.catalog_uri)?
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let records: Vec<SubstanceRecord> = serde_json::from_str(&body)
            .map_err(|e| ZappError::SubstanceCatalog(format!("malformed catalog: {}", e)))?;
        debug!(count = records.len(), "substance catalog loaded");
        Ok(records)
    }

    /// Fetches the catalog on first call; concurrent callers share one
    /// fetch. A failed fetch is recorded and not retried.
    pub async fn ensure_loaded(&self) -> Option<&[SubstanceRecord]> {
        self.records
            .get_or_init(|| async {
                match self.fetch().await {
                    Ok(records) => Some(records),
                    Err(e) => {
                        warn!(error = %e, "substance catalog load failed, autocomplete degraded");
                        None
                    }
                }
            })
            .await
            .as_deref()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.records.get(), Some(None))
    }

    /// Ranked suggestions for a partial query, capped at the configured
    /// suggestion count. Empty before load, after a failed load, and for
    /// blank queries.
    pub async fn suggest(&self, query: &str) -> Vec<&SubstanceRecord> {
        let Some(records) = self.ensure_loaded().await else {
            return Vec::new();
        };
        rank::search(records, query, self.config.max_suggestions)
    }
}
