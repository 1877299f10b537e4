//! Pieces of a scene that know how to log themselves to a rerun stream.

mod floor;
mod force;
mod local_frame;
mod model_updater;
mod xp_markers;

pub use floor::Floor;
pub use force::{ForcePlate, ForceVector};
pub use local_frame::LocalFrame;
pub use model_updater::ModelUpdater;
pub use xp_markers::XpMarkers;

use nalgebra_glm as glm;
use rerun::RecordingStream;

use crate::error::BioError;

/// A scene element driven by the frame index of its phase.
pub trait Component {
    /// Entity paths this component writes to.
    fn component_names(&self) -> Vec<String>;

    /// Data that does not change over time, logged once before the first frame.
    fn log_static(&self, _rec: &RecordingStream) -> Result<(), BioError> {
        Ok(())
    }

    fn log_frame(&self, rec: &RecordingStream, frame: usize) -> Result<(), BioError>;
}

pub(crate) fn to_f32(v: &glm::DVec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

pub(crate) fn is_finite(v: &glm::DVec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Columns of a rotation matrix, the layout rerun expects for `Mat3x3`.
pub(crate) fn to_columns(m: &glm::DMat3) -> [[f32; 3]; 3] {
    [0, 1, 2].map(|c| [m[(0, c)] as f32, m[(1, c)] as f32, m[(2, c)] as f32])
}
