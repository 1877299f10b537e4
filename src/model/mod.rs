mod biomod;
mod kinematics;
mod segment;

pub use biomod::*;
pub use kinematics::{rotation_part, transform_point, translation_part};
pub use segment::*;

use nalgebra_glm as glm;
use std::path::PathBuf;

use crate::error::BioError;
use crate::markers::Markers;

/// Kinematic queries the visualisation needs from a rigid-body model.
///
/// Pose vectors must hold exactly [`nb_q`](Self::nb_q) generalized coordinates.
pub trait KinematicModel {
    /// File stem of the model path.
    fn name(&self) -> &str;
    fn nb_q(&self) -> usize;
    fn marker_names(&self) -> Vec<String>;

    fn nb_markers(&self) -> usize {
        self.marker_names().len()
    }

    fn segment_names(&self) -> Vec<String>;

    fn nb_segments(&self) -> usize {
        self.segment_names().len()
    }

    /// Indices of the segments carrying a mesh file or inline vertices, in segment order.
    fn segments_with_mesh(&self) -> Vec<usize>;

    /// Absolute path of the mesh file drawn on `segment`.
    fn mesh_file(&self, _segment: usize) -> Option<PathBuf> {
        None
    }

    /// Inline mesh vertices of `segment`, in the segment frame.
    fn mesh_vertices(&self, _segment: usize) -> Vec<glm::DVec3> {
        Vec::new()
    }

    /// RGB in `[0, 1]`.
    fn mesh_color(&self, _segment: usize) -> Option<[f64; 3]> {
        None
    }

    /// Absolute paths of every mesh file, in segment order.
    fn mesh_paths(&self) -> Vec<PathBuf> {
        self.segments_with_mesh()
            .into_iter()
            .filter_map(|segment| self.mesh_file(segment))
            .collect()
    }

    /// Placement and scale of a segment's mesh in the segment frame.
    fn mesh_placement(&self, _segment: usize) -> glm::DMat4 {
        glm::DMat4::identity()
    }

    fn segment_homogeneous_matrix_in_global(
        &self,
        q: &[f64],
        segment: usize,
    ) -> Result<glm::DMat4, BioError>;

    fn all_segment_matrices_in_global(&self, q: &[f64]) -> Result<Vec<glm::DMat4>, BioError> {
        (0..self.nb_segments())
            .map(|i| self.segment_homogeneous_matrix_in_global(q, i))
            .collect()
    }

    /// Every marker in the global frame, in [`marker_names`](Self::marker_names) order.
    fn markers(&self, q: &[f64]) -> Result<Vec<glm::DVec3>, BioError>;

    fn center_of_mass(&self, q: &[f64]) -> Result<glm::DVec3, BioError>;
}

/// Pose vectors indexed by frame.
///
/// The frame count is stored, so models without degrees of freedom still
/// hold one empty pose per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSequence {
    nb_q: usize,
    nb_frames: usize,
    values: Vec<f64>,
}

impl PoseSequence {
    pub fn zeros(nb_q: usize, nb_frames: usize) -> Self {
        Self {
            nb_q,
            nb_frames,
            values: vec![0.0; nb_q * nb_frames],
        }
    }

    /// One pose vector per frame.
    pub fn from_frames(nb_q: usize, frames: &[Vec<f64>]) -> Result<Self, BioError> {
        let mut poses = Self::zeros(nb_q, 0);
        for frame in frames {
            poses.push(frame)?;
        }
        Ok(poses)
    }

    /// One row per generalized coordinate, `q[dof][frame]`.
    pub fn from_dof_major(q: &[Vec<f64>]) -> Result<Self, BioError> {
        let nb_q = q.len();
        let nb_frames = q.first().map_or(0, Vec::len);
        if let Some(row) = q.iter().find(|row| row.len() != nb_frames) {
            return Err(BioError::frame_count_mismatch("q", nb_frames, row.len()));
        }
        let mut poses = Self::zeros(nb_q, nb_frames);
        for (dof, row) in q.iter().enumerate() {
            for (frame, &value) in row.iter().enumerate() {
                poses.values[frame * nb_q + dof] = value;
            }
        }
        Ok(poses)
    }

    pub fn push(&mut self, q: &[f64]) -> Result<(), BioError> {
        if q.len() != self.nb_q {
            return Err(BioError::q_size_mismatch(self.nb_q, q.len()));
        }
        self.values.extend_from_slice(q);
        self.nb_frames += 1;
        Ok(())
    }

    pub fn nb_q(&self) -> usize {
        self.nb_q
    }

    pub fn nb_frames(&self) -> usize {
        self.nb_frames
    }

    pub fn frame(&self, frame: usize) -> &[f64] {
        &self.values[frame * self.nb_q..(frame + 1) * self.nb_q]
    }

    pub fn frames(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.nb_frames).map(|frame| self.frame(frame))
    }
}

/// Markers of `model` for every pose of `q`, in metres.
pub fn compute_markers<M: KinematicModel + ?Sized>(
    model: &M,
    q: &PoseSequence,
) -> Result<Markers, BioError> {
    let frames = q
        .frames()
        .map(|pose| model.markers(pose))
        .collect::<Result<Vec<_>, _>>()?;
    Markers::from_frames(model.marker_names(), frames)
}
