use rerun::RecordingStream;

use crate::components::ModelUpdater;
use crate::error::BioError;
use crate::model::{KinematicModel, PoseSequence};
use crate::settings::Settings;

/// Animated models of one phase, each with its own pose sequence.
pub struct BiorbdRerunPhase {
    pub name: String,
    models: Vec<ModelUpdater>,
    q: Vec<PoseSequence>,
}

impl BiorbdRerunPhase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: Vec::new(),
            q: Vec::new(),
        }
    }

    /// Models are logged under `<phase name>/<index>_<model name>`.
    pub fn add_animated_model(
        &mut self,
        model: Box<dyn KinematicModel>,
        q: PoseSequence,
        settings: &Settings,
    ) {
        let name = format!("{}/{}_{}", self.name, self.nb_models(), model.name());
        self.models.push(ModelUpdater::new(name, model, settings));
        self.q.push(q);
    }

    pub fn nb_models(&self) -> usize {
        self.models.len()
    }

    pub fn component_names(&self) -> Vec<String> {
        self.models
            .iter()
            .flat_map(ModelUpdater::component_names)
            .collect()
    }

    pub fn log_static(&self, rec: &RecordingStream) -> Result<(), BioError> {
        for model in &self.models {
            model.log_static(rec)?;
        }
        Ok(())
    }

    pub fn to_rerun(&self, rec: &RecordingStream, frame: usize) -> Result<(), BioError> {
        for (model, q) in self.models.iter().zip(&self.q) {
            model.to_rerun(rec, q.frame(frame))?;
        }
        Ok(())
    }
}
