//! Stream biomechanical models and motion capture to the rerun viewer.
//!
//! Models are `.bioMod` files animated by pose sequences; motion capture comes
//! from `.c3d` files (markers, force plates, ground reaction forces).

pub mod c3d;
pub mod components;
pub mod error;
pub mod markers;
pub mod model;
pub mod phase;
pub mod rrc3d;
pub mod settings;
pub mod units;

pub const CONFY_APP_NAME: &str = "biorerun";

pub use c3d::C3d;
pub use error::BioError;
pub use markers::Markers;
pub use model::{BiomodModel, KinematicModel, PoseSequence, compute_markers};
pub use phase::PhaseRerun;
pub use rrc3d::{Rrc3dOptions, rrc3d};
pub use settings::Settings;
pub use units::Unit;
