use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

use crate::error::BioError;
use crate::units::Unit;

/// Marker positions laid out as (spatial axis × marker × frame).
///
/// Positions are stored frame-major so a whole frame can be borrowed at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markers {
    pub labels: Vec<String>,
    pub units: String,
    pub rate: f64,
    /// Index of the first frame in the source recording, 0-based.
    pub first_frame: usize,
    nb_frames: usize,
    positions: Vec<glm::DVec3>,
}

impl Markers {
    pub fn zeros(labels: Vec<String>, nb_frames: usize) -> Self {
        let nb_markers = labels.len();
        Self {
            labels,
            units: "m".to_string(),
            rate: 1.0,
            first_frame: 0,
            nb_frames,
            positions: vec![glm::DVec3::zeros(); nb_markers * nb_frames],
        }
    }

    /// Build from one `Vec` of positions per frame.
    pub fn from_frames(labels: Vec<String>, frames: Vec<Vec<glm::DVec3>>) -> Result<Self, BioError> {
        let nb_markers = labels.len();
        let nb_frames = frames.len();
        let mut positions = Vec::with_capacity(nb_markers * nb_frames);
        for (frame, values) in frames.into_iter().enumerate() {
            if values.len() != nb_markers {
                return Err(BioError::new("marker-count-mismatch")
                    .with_arg("frame", frame)
                    .with_arg("expected", nb_markers)
                    .with_arg("actual", values.len()));
            }
            positions.extend(values);
        }
        Ok(Self {
            labels,
            units: "m".to_string(),
            rate: 1.0,
            first_frame: 0,
            nb_frames,
            positions,
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_rate(mut self, rate: f64, first_frame: usize) -> Self {
        self.rate = rate;
        self.first_frame = first_frame;
        self
    }

    pub fn nb_markers(&self) -> usize {
        self.labels.len()
    }

    pub fn nb_frames(&self) -> usize {
        self.nb_frames
    }

    /// `[3, nb_markers, nb_frames]`
    pub fn shape(&self) -> [usize; 3] {
        [3, self.nb_markers(), self.nb_frames]
    }

    pub fn frame(&self, frame: usize) -> &[glm::DVec3] {
        let n = self.nb_markers();
        &self.positions[frame * n..(frame + 1) * n]
    }

    pub fn position(&self, marker: usize, frame: usize) -> glm::DVec3 {
        self.positions[frame * self.nb_markers() + marker]
    }

    pub fn set_position(&mut self, marker: usize, frame: usize, value: glm::DVec3) {
        let n = self.nb_markers();
        self.positions[frame * n + marker] = value;
    }

    /// Value at `(axis, marker, frame)`.
    pub fn get(&self, axis: usize, marker: usize, frame: usize) -> f64 {
        self.position(marker, frame)[axis]
    }

    /// Every position of one marker, in frame order.
    pub fn trajectory(&self, marker: usize) -> impl Iterator<Item = glm::DVec3> + '_ {
        (0..self.nb_frames).map(move |frame| self.position(marker, frame))
    }

    /// Time stamp of every frame, starting at `first_frame / rate`.
    pub fn time(&self) -> Vec<f64> {
        let initial = self.first_frame as f64 / self.rate;
        (0..self.nb_frames)
            .map(|i| initial + i as f64 / self.rate)
            .collect()
    }

    /// Convert every position to metres and relabel the unit as `"m"`.
    pub fn adjust_unit_to_meters(&mut self) -> Result<(), BioError> {
        let factor = Unit::from_label(&self.units)?.conversion_factor();
        for p in self.positions.iter_mut() {
            *p /= factor;
        }
        self.units = Unit::Meter.symbol().to_string();
        Ok(())
    }

    /// Largest absolute x or y coordinate over all markers and frames.
    ///
    /// Missing samples (NaN) are ignored.
    pub fn max_xy_span(&self) -> f64 {
        self.positions
            .iter()
            .flat_map(|p| [p.x.abs(), p.y.abs()])
            .filter(|v| !v.is_nan())
            .fold(0.0, f64::max)
    }
}
