use nalgebra_glm as glm;
use rerun::RecordingStream;

use super::{Component, is_finite, to_f32};
use crate::error::BioError;
use crate::settings::Settings;

/// Outline of a force plate, corners in metres.
pub struct ForcePlate {
    pub name: String,
    pub corners: [glm::DVec3; 4],
    pub color: [u8; 4],
}

impl ForcePlate {
    pub fn new(name: impl Into<String>, corners: [glm::DVec3; 4], settings: &Settings) -> Self {
        Self {
            name: name.into(),
            corners,
            color: settings.colors.force_plate_color,
        }
    }
}

impl Component for ForcePlate {
    fn component_names(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn log_static(&self, rec: &RecordingStream) -> Result<(), BioError> {
        let mut outline: Vec<[f32; 3]> = self.corners.iter().map(to_f32).collect();
        outline.push(to_f32(&self.corners[0]));
        rec.log_static(
            self.name.as_str(),
            &rerun::LineStrips3D::new([outline]).with_colors([self.color]),
        )?;
        Ok(())
    }

    fn log_frame(&self, _rec: &RecordingStream, _frame: usize) -> Result<(), BioError> {
        Ok(())
    }
}

/// Ground reaction force drawn from the centre of pressure, one sample per frame.
pub struct ForceVector {
    pub name: String,
    /// Centre of pressure in metres.
    pub origins: Vec<glm::DVec3>,
    /// Force in newtons.
    pub vectors: Vec<glm::DVec3>,
    /// Metres of arrow per newton.
    pub scale: f64,
    pub color: [u8; 4],
}

impl ForceVector {
    pub fn new(
        num: usize,
        origins: Vec<glm::DVec3>,
        vectors: Vec<glm::DVec3>,
        settings: &Settings,
    ) -> Result<Self, BioError> {
        if origins.len() != vectors.len() {
            return Err(BioError::frame_count_mismatch(
                "force origins",
                vectors.len(),
                origins.len(),
            ));
        }
        Ok(Self {
            name: format!("force_vector_{num}"),
            origins,
            vectors,
            scale: settings.display.force_scale as f64,
            color: settings.colors.force_color,
        })
    }

    pub fn nb_frames(&self) -> usize {
        self.vectors.len()
    }
}

impl Component for ForceVector {
    fn component_names(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn log_frame(&self, rec: &RecordingStream, frame: usize) -> Result<(), BioError> {
        let origin = self.origins[frame];
        let vector = self.vectors[frame];
        let arrows = if is_finite(&origin) && is_finite(&vector) {
            rerun::Arrows3D::from_vectors([to_f32(&(vector * self.scale))])
                .with_origins([to_f32(&origin)])
                .with_colors([self.color])
        } else {
            rerun::Arrows3D::from_vectors(Vec::<[f32; 3]>::new())
        };
        rec.log(self.name.as_str(), &arrows)?;
        Ok(())
    }
}
