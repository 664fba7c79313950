//! zapp-model — The zebrafish toxicology observation data model.
//! - Primitive quantities (stage, duration, concentration)
//! - Substance identifiers (CAS / PubChem / ChEBI)
//! - Exposure events with a tagged regimen variant
//! - Phenotype items and the aggregate Observation
//! - Wire (de)serialization with legacy-shape migration
//! - Boundary and typed validation

pub mod exposure;
pub mod observation;
pub mod phenotype;
pub mod quantity;
pub mod substance;
pub mod validate;
pub mod wire;

pub use exposure::{ExposureEvent, Pattern, Regimen, RepeatedExposure, Route};
pub use observation::{FishInfo, ImageBlock, ImageMeta, Observation, Provenance, Rearing, SourceRef, SourceType};
pub use phenotype::{PhenotypeBlock, PhenotypeItem, PhenotypeTerm, Severity};
pub use quantity::{Duration, DurationUnit, Quantity, Stage, StageUnit, UnitQuantity};
pub use substance::{IdType, SubstanceId};
pub use validate::{validate_json, ValidationOptions, ValidationReport};
