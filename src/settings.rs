use crate::CONFY_APP_NAME;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub show_floor: bool,
    pub show_force_plates: bool,
    pub show_forces: bool,
    pub marker_trajectories: bool,
    pub show_local_frames: bool,
    pub show_meshes: bool,
    pub show_center_of_mass: bool,
    /// Radius of experimental and model markers, in metres.
    pub marker_radius: f32,
    /// Arrow length per newton of ground reaction force.
    pub force_scale: f32,
    pub local_frame_scale: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_floor: true,
            show_force_plates: true,
            show_forces: true,
            marker_trajectories: false,
            show_local_frames: true,
            show_meshes: true,
            show_center_of_mass: true,
            marker_radius: 0.01,
            force_scale: 0.001,
            local_frame_scale: 0.3,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "display").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "display", self) {
            log::warn!("Failed to store display settings: {e}");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSettings {
    pub model_marker_color: [u8; 4],
    pub xp_marker_color: [u8; 4],
    pub center_of_mass_color: [u8; 4],
    pub force_plate_color: [u8; 4],
    pub force_color: [u8; 4],
    pub floor_color: [u8; 4],
    pub trajectory_color: [u8; 4],
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            model_marker_color: [0, 0, 255, 255],
            xp_marker_color: [0, 200, 0, 255],
            center_of_mass_color: [255, 200, 0, 255],
            force_plate_color: [255, 255, 255, 255],
            force_color: [255, 0, 255, 255],
            floor_color: [80, 80, 80, 255],
            trajectory_color: [0, 150, 0, 128],
        }
    }
}

impl ColorSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "colors").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "colors", self) {
            log::warn!("Failed to store color settings: {e}");
        }
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub display: DisplaySettings,
    pub colors: ColorSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            display: DisplaySettings::load(),
            colors: ColorSettings::load(),
        }
    }
}
