//! Image preview resource lifecycle.
//!
//! The source tracked a browser object-URL in a slot outside the form data
//! and revoked it on replace, remove, and unmount. The native analogue is a
//! temp file holding the preview bytes: `ImageSlot` owns at most one
//! `ImagePreview`, and the previous one is always released before a new one
//! is created. Dropping the slot releases whatever it still holds.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use uuid::Uuid;

use zapp_common::Result;
use zapp_model::ImageMeta;

use crate::engine::FormEngine;

/// A transient preview of the selected image. The backing temp file is
/// deleted when the preview is dropped.
#[derive(Debug)]
pub struct ImagePreview {
    id: Uuid,
    name: String,
    mime_type: String,
    file: NamedTempFile,
}

impl ImagePreview {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Path of the preview file, valid for the lifetime of the handle.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Owner of the single optional preview resource.
#[derive(Debug, Default)]
pub struct ImageSlot {
    preview: Option<ImagePreview>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> Option<&ImagePreview> {
        self.preview.as_ref()
    }

    /// Select an image: release the previous preview, write the new one,
    /// and record the file metadata in the observation.
    pub fn select(
        &mut self,
        engine: &mut FormEngine,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<&ImagePreview> {
        // Release before acquire so two previews never coexist.
        self.preview = None;

        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;

        let meta = ImageMeta {
            name: Some(name.to_string()),
            mime_type: Some(mime_type.to_string()),
            size: Some(bytes.len() as u64),
        };
        engine.apply(move |d| d.image.file = Some(meta));

        Ok(self.preview.insert(ImagePreview {
            id: Uuid::new_v4(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            file,
        }))
    }

    /// Remove the image: release the preview and null the metadata.
    pub fn clear(&mut self, engine: &mut FormEngine) {
        self.preview = None;
        engine.apply(|d| d.image.file = None);
    }
}
