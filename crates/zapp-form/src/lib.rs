//! zapp-form — The observation update engine.
//! - Optimistic apply/validate/notify cycle over the single owned Observation
//! - Route/regimen operations that replace the source's cascading resets
//! - Non-empty exposure and phenotype list operations
//! - Image preview resource lifecycle (acquire/release, no leaks)

pub mod engine;
pub mod image;

pub use engine::FormEngine;
pub use image::{ImagePreview, ImageSlot};
