use rerun::RecordingStream;

use crate::components::{Component, Floor, ForcePlate, ForceVector, XpMarkers};
use crate::error::BioError;

/// Experimental data of one phase: markers, force plates, forces and floor.
pub struct XpRerunPhase {
    pub name: String,
    pub xp_markers: Vec<XpMarkers>,
    pub force_plates: Vec<ForcePlate>,
    pub force_vectors: Vec<ForceVector>,
    pub floor: Option<Floor>,
}

impl XpRerunPhase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xp_markers: Vec::new(),
            force_plates: Vec::new(),
            force_vectors: Vec::new(),
            floor: None,
        }
    }

    /// Entity path of a component of this phase.
    pub fn entity(&self, component: &str) -> String {
        format!("{}/{}", self.name, component)
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        let markers = self.xp_markers.iter().map(|c| c as &dyn Component);
        let plates = self.force_plates.iter().map(|c| c as &dyn Component);
        let vectors = self.force_vectors.iter().map(|c| c as &dyn Component);
        let floor = self.floor.iter().map(|c| c as &dyn Component);
        markers.chain(plates).chain(vectors).chain(floor)
    }

    pub fn component_names(&self) -> Vec<String> {
        self.components().flat_map(|c| c.component_names()).collect()
    }

    pub fn log_static(&self, rec: &RecordingStream) -> Result<(), BioError> {
        for component in self.components() {
            component.log_static(rec)?;
        }
        Ok(())
    }

    pub fn to_rerun(&self, rec: &RecordingStream, frame: usize) -> Result<(), BioError> {
        for component in self.components() {
            component.log_frame(rec, frame)?;
        }
        Ok(())
    }
}
