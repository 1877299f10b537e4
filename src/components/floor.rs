use rerun::RecordingStream;

use super::Component;
use crate::error::BioError;
use crate::settings::Settings;

/// Thickness of the floor slab, metres.
const FLOOR_THICKNESS: f32 = 0.001;

/// A flat square centred on the origin, logged once.
pub struct Floor {
    pub name: String,
    /// Half width of the square, metres.
    pub square_width: f64,
    /// Height of the top surface, metres.
    pub height_offset: f64,
    pub color: [u8; 4],
}

impl Floor {
    pub fn new(square_width: f64, height_offset: f64, settings: &Settings) -> Self {
        Self {
            name: "floor".to_string(),
            square_width,
            height_offset,
            color: settings.colors.floor_color,
        }
    }
}

impl Component for Floor {
    fn component_names(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn log_static(&self, rec: &RecordingStream) -> Result<(), BioError> {
        let half = self.square_width as f32;
        let center = [0.0, 0.0, self.height_offset as f32 - FLOOR_THICKNESS];
        rec.log_static(
            self.name.as_str(),
            &rerun::Boxes3D::from_centers_and_half_sizes(
                [center],
                [[half, half, FLOOR_THICKNESS]],
            )
            .with_colors([self.color])
            .with_fill_mode(rerun::FillMode::Solid),
        )?;
        Ok(())
    }

    fn log_frame(&self, _rec: &RecordingStream, _frame: usize) -> Result<(), BioError> {
        Ok(())
    }
}
