//! zapp-substances — Chemical reference catalog and ranked autocomplete
//! for the substance field. The catalog is a JSON array derived from the
//! PubChem CID-synonym dump, fetched lazily on first use.

pub mod catalog;
pub mod rank;

pub use catalog::{SubstanceCatalog, SubstanceRecord};
pub use rank::{is_cas_number, search, MatchTier};
