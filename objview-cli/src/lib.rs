//! Terminal front end for objview: holds the active model and reports on it

use objview_core::{obj, GeometryBuffer, MaterialColor, ParseError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod report;

pub use report::write_summary;

/// The model currently on display, plus where it came from
pub struct Viewer {
    model: Option<GeometryBuffer>,
    source: String,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            model: None,
            source: String::new(),
        }
    }

    pub fn model(&self) -> Option<&GeometryBuffer> {
        self.model.as_ref()
    }

    /// Label of the active model: a file path or the generated primitive
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the active model with a freshly generated cube
    pub fn generate_cube(&mut self, size: f32) -> &GeometryBuffer {
        log::info!("Generating cube of size {}", size);
        self.source = format!("cube ({})", size);
        self.model.insert(GeometryBuffer::cube(size))
    }

    /// Load an OBJ file and make it the active model.
    ///
    /// On failure the previous model stays active. `flat_normals` fills in
    /// per-face normals for files that do not carry a full normal stream.
    pub fn load_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        flat_normals: bool,
    ) -> Result<&GeometryBuffer, ParseError> {
        let path = path.as_ref();
        log::info!("Loading model: {}", path.display());

        let file = File::open(path)?;
        let mut model = obj::parse_reader(BufReader::new(file))?;
        if flat_normals && model.normal_indices.is_none() {
            log::debug!("Computing flat normals for {}", path.display());
            model.compute_flat_normals();
        }

        self.source = path.display().to_string();
        Ok(self.model.insert(model))
    }

    /// Recolor the active model; returns false when nothing is loaded
    pub fn change_material_color(&mut self, color: MaterialColor) -> bool {
        match self.model.as_mut() {
            Some(model) => {
                model.set_material_color(color);
                true
            }
            None => {
                log::warn!("No model loaded, ignoring material color change");
                false
            }
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}
