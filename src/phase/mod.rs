//! Timeline container: everything shown over one time span, flushed frame by frame.

mod biorbd;
mod xp;

pub use biorbd::BiorbdRerunPhase;
pub use xp::XpRerunPhase;

use nalgebra_glm as glm;
use rerun::{RecordingStream, RecordingStreamBuilder};
use std::path::Path;
use std::time::Duration;

use crate::components::{Floor, ForcePlate, ForceVector, XpMarkers};
use crate::error::BioError;
use crate::markers::Markers;
use crate::model::{KinematicModel, PoseSequence};
use crate::settings::Settings;

/// Name of the timeline frames are stamped on.
pub const TIMELINE: &str = "stable_time";

/// Sequence timeline holding the phase index, so phases logged to one stream can be told apart.
pub const PHASE_TIMELINE: &str = "phase";

pub struct PhaseRerun {
    pub t_span: Vec<f64>,
    pub phase: usize,
    pub window: String,
    pub biorbd_models: BiorbdRerunPhase,
    pub xp_data: XpRerunPhase,
    settings: Settings,
}

impl PhaseRerun {
    /// `t_span` holds the time stamp of every frame, in seconds.
    pub fn new(t_span: Vec<f64>) -> Self {
        Self::with_phase(t_span, 0, "animation")
    }

    pub fn with_phase(t_span: Vec<f64>, phase: usize, window: &str) -> Self {
        Self {
            t_span,
            phase,
            window: window.to_string(),
            biorbd_models: BiorbdRerunPhase::new(window),
            xp_data: XpRerunPhase::new(window),
            settings: Settings::default(),
        }
    }

    /// Applies to the components added afterwards.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn nb_frames(&self) -> usize {
        self.t_span.len()
    }

    fn check_frames(&self, what: &str, nb_frames: usize) -> Result<(), BioError> {
        if nb_frames != self.nb_frames() {
            return Err(BioError::frame_count_mismatch(what, self.nb_frames(), nb_frames));
        }
        Ok(())
    }

    pub fn add_animated_model<M: KinematicModel + 'static>(
        &mut self,
        model: M,
        q: PoseSequence,
    ) -> Result<(), BioError> {
        self.check_frames("q", q.nb_frames())?;
        if q.nb_q() != model.nb_q() {
            return Err(BioError::q_size_mismatch(model.nb_q(), q.nb_q()));
        }
        self.biorbd_models
            .add_animated_model(Box::new(model), q, &self.settings);
        Ok(())
    }

    /// `markers` must already be in metres.
    pub fn add_xp_markers(&mut self, name: &str, markers: Markers) -> Result<(), BioError> {
        self.check_frames("markers", markers.nb_frames())?;
        let entity = self.xp_data.entity(name);
        self.xp_data
            .xp_markers
            .push(XpMarkers::new(entity, markers, &self.settings));
        Ok(())
    }

    /// `corners` in metres.
    pub fn add_force_plate(&mut self, name: &str, corners: [glm::DVec3; 4]) {
        let entity = self.xp_data.entity(name);
        self.xp_data
            .force_plates
            .push(ForcePlate::new(entity, corners, &self.settings));
    }

    /// Force applied at `force_origin` (metres), one sample per frame.
    pub fn add_force_data(
        &mut self,
        num: usize,
        force_origin: Vec<glm::DVec3>,
        force_vector: Vec<glm::DVec3>,
    ) -> Result<(), BioError> {
        let mut vector = ForceVector::new(num, force_origin, force_vector, &self.settings)?;
        self.check_frames("force", vector.nb_frames())?;
        vector.name = self.xp_data.entity(&vector.name);
        self.xp_data.force_vectors.push(vector);
        Ok(())
    }

    pub fn add_floor(&mut self, square_width: f64, height_offset: f64) {
        let mut floor = Floor::new(square_width, height_offset, &self.settings);
        floor.name = self.xp_data.entity(&floor.name);
        self.xp_data.floor = Some(floor);
    }

    pub fn component_names(&self) -> Vec<String> {
        let mut names = self.biorbd_models.component_names();
        names.extend(self.xp_data.component_names());
        names
    }

    /// Spawn a viewer and stream every frame to it.
    pub fn rerun(&self, name: &str) -> Result<(), BioError> {
        let rec = RecordingStreamBuilder::new(name).spawn()?;
        self.log_to(&rec)
    }

    /// Write the recording to an `.rrd` file.
    pub fn save(&self, name: &str, path: impl AsRef<Path>) -> Result<(), BioError> {
        let path = path.as_ref();
        let rec = RecordingStreamBuilder::new(name).save(path)?;
        self.log_to(&rec)?;
        log::info!("Saved recording to {}", path.display());
        Ok(())
    }

    /// Static data first, then every frame in time order.
    pub fn log_to(&self, rec: &RecordingStream) -> Result<(), BioError> {
        if let Some(t) = self.t_span.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(BioError::new("invalid-time").with_arg("t", t));
        }
        log::info!(
            "Logging {} frames of {} components",
            self.nb_frames(),
            self.component_names().len()
        );

        rec.log_static("/", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())?;
        self.biorbd_models.log_static(rec)?;
        self.xp_data.log_static(rec)?;

        rec.set_time_sequence(PHASE_TIMELINE, self.phase as i64);
        for (frame, &t) in self.t_span.iter().enumerate() {
            rec.set_time(TIMELINE, Duration::from_secs_f64(t));
            self.biorbd_models.to_rerun(rec, frame)?;
            self.xp_data.to_rerun(rec, frame)?;
        }
        Ok(())
    }
}
