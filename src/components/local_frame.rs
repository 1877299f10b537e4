use nalgebra_glm as glm;
use rerun::RecordingStream;

use super::to_f32;
use crate::error::BioError;
use crate::model::{rotation_part, translation_part};

const AXES: [(&str, [u8; 4]); 3] = [
    ("X", [255, 0, 0, 255]),
    ("Y", [0, 255, 0, 255]),
    ("Z", [0, 0, 255, 255]),
];

/// The three axes of a segment's coordinate system drawn as arrows.
#[derive(Debug, Clone)]
pub struct LocalFrame {
    pub name: String,
    /// Arrow length in metres.
    pub scale: f64,
}

impl LocalFrame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: 0.3,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn component_names(&self) -> Vec<String> {
        AXES.iter()
            .map(|(axis, _)| format!("{}/{}", self.name, axis))
            .collect()
    }

    pub fn to_rerun(&self, rec: &RecordingStream, transform: &glm::DMat4) -> Result<(), BioError> {
        let origin = to_f32(&translation_part(transform));
        let rotation = rotation_part(transform);
        for (column, (entity, (_, color))) in self.component_names().iter().zip(AXES).enumerate() {
            let vector = rotation.column(column) * self.scale;
            rec.log(
                entity.as_str(),
                &rerun::Arrows3D::from_vectors([to_f32(&vector)])
                    .with_origins([origin])
                    .with_colors([color]),
            )?;
        }
        Ok(())
    }
}
