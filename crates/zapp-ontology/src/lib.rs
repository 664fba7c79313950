//! zapp-ontology — Zebrafish ontology loading and the phenotype picker.
//! - Serde model of the OBO-graph JSON documents (ZFA anatomy, ZP phenotypes)
//! - A reverse index from anatomical structures to the phenotypes that
//!   manifest in them, ranked by ZFin literature usage
//! - A lazily-loaded picker that commits terms through the form engine

pub mod graph;
pub mod index;
pub mod picker;

pub use graph::{OboGraph, OboNode};
pub use index::OntologyIndex;
pub use picker::PhenotypePicker;
