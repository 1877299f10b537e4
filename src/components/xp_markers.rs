use rerun::RecordingStream;

use super::{Component, is_finite, to_f32};
use crate::error::BioError;
use crate::markers::Markers;
use crate::settings::Settings;

/// Experimental markers, in metres, with an optional trail of past positions.
pub struct XpMarkers {
    pub name: String,
    pub markers: Markers,
    pub radius: f32,
    pub color: [u8; 4],
    pub trajectories: bool,
    pub trajectory_color: [u8; 4],
}

impl XpMarkers {
    pub fn new(name: impl Into<String>, markers: Markers, settings: &Settings) -> Self {
        Self {
            name: name.into(),
            markers,
            radius: settings.display.marker_radius,
            color: settings.colors.xp_marker_color,
            trajectories: settings.display.marker_trajectories,
            trajectory_color: settings.colors.trajectory_color,
        }
    }

    pub fn with_trajectories(mut self, trajectories: bool) -> Self {
        self.trajectories = trajectories;
        self
    }

    pub fn nb_frames(&self) -> usize {
        self.markers.nb_frames()
    }

    fn trajectories_entity(&self) -> String {
        format!("{}/trajectories", self.name)
    }

    /// One strip per marker through every valid position up to `frame`.
    fn log_curve(&self, rec: &RecordingStream, frame: usize) -> Result<(), BioError> {
        let strips: Vec<Vec<[f32; 3]>> = (0..self.markers.nb_markers())
            .map(|marker| {
                self.markers
                    .trajectory(marker)
                    .take(frame + 1)
                    .filter(is_finite)
                    .map(|p| to_f32(&p))
                    .collect()
            })
            .collect();
        rec.log(
            self.trajectories_entity(),
            &rerun::LineStrips3D::new(strips).with_colors([self.trajectory_color]),
        )?;
        Ok(())
    }
}

impl Component for XpMarkers {
    fn component_names(&self) -> Vec<String> {
        let mut names = vec![self.name.clone()];
        if self.trajectories {
            names.push(self.trajectories_entity());
        }
        names
    }

    fn log_frame(&self, rec: &RecordingStream, frame: usize) -> Result<(), BioError> {
        // Occluded markers are left out instead of being sent as NaN.
        let (positions, labels): (Vec<[f32; 3]>, Vec<String>) = self
            .markers
            .frame(frame)
            .iter()
            .zip(&self.markers.labels)
            .filter(|(p, _)| is_finite(p))
            .map(|(p, label)| (to_f32(p), label.clone()))
            .unzip();
        rec.log(
            self.name.as_str(),
            &rerun::Points3D::new(positions)
                .with_radii([self.radius])
                .with_colors([self.color])
                .with_labels(labels),
        )?;
        if self.trajectories {
            self.log_curve(rec, frame)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm as glm;

    fn markers() -> Markers {
        let frames = vec![
            vec![glm::vec3(0.0, 0.0, 1.0), glm::vec3(f64::NAN, 0.0, 0.0)],
            vec![glm::vec3(0.1, 0.0, 1.0), glm::vec3(1.0, 0.0, 0.0)],
        ];
        Markers::from_frames(vec!["a".into(), "b".into()], frames).unwrap()
    }

    #[test]
    fn trajectories_add_an_entity() {
        let xp = XpMarkers::new("walk.c3d", markers(), &Settings::default());
        assert_eq!(xp.component_names(), vec!["walk.c3d"]);
        let xp = xp.with_trajectories(true);
        assert_eq!(
            xp.component_names(),
            vec!["walk.c3d", "walk.c3d/trajectories"]
        );
    }

    #[test]
    fn frames_with_missing_markers_log() {
        let (rec, _storage) = rerun::RecordingStreamBuilder::new("xp_markers_test")
            .memory()
            .unwrap();
        let xp = XpMarkers::new("walk.c3d", markers(), &Settings::default()).with_trajectories(true);
        xp.log_frame(&rec, 0).unwrap();
        xp.log_frame(&rec, 1).unwrap();
    }
}
