//! Display a C3D file: markers, force plates, ground reaction forces and a floor.

use nalgebra_glm as glm;
use std::path::Path;

use crate::c3d::{C3d, ForcePlatform};
use crate::error::BioError;
use crate::markers::Markers;
use crate::phase::PhaseRerun;
use crate::settings::{DisplaySettings, Settings};
use crate::units::{Unit, to_meters_in_place};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rrc3dOptions {
    pub show_floor: bool,
    pub show_force_plates: bool,
    pub show_forces: bool,
    pub marker_trajectories: bool,
}

impl Default for Rrc3dOptions {
    fn default() -> Self {
        Self {
            show_floor: true,
            show_force_plates: true,
            show_forces: true,
            marker_trajectories: false,
        }
    }
}

impl Rrc3dOptions {
    pub fn from_display(display: &DisplaySettings) -> Self {
        Self {
            show_floor: display.show_floor,
            show_force_plates: display.show_force_plates,
            show_forces: display.show_forces,
            marker_trajectories: display.marker_trajectories,
        }
    }
}

/// Read `path` and stream it to a freshly spawned viewer.
pub fn rrc3d(path: impl AsRef<Path>, options: Rrc3dOptions) -> Result<(), BioError> {
    let (phase, name) = load(path.as_ref(), options)?;
    phase.rerun(&name)
}

/// Same as [`rrc3d`] but writes an `.rrd` file.
pub fn rrc3d_save(
    path: impl AsRef<Path>,
    options: Rrc3dOptions,
    out: impl AsRef<Path>,
) -> Result<(), BioError> {
    let (phase, name) = load(path.as_ref(), options)?;
    phase.save(&name, out)
}

fn load(path: &Path, options: Rrc3dOptions) -> Result<(PhaseRerun, String), BioError> {
    let c3d = C3d::open(path)?;
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "c3d file".to_string());
    let phase = build_phase(&c3d, &filename, options, Settings::load())?;
    Ok((phase, filename))
}

/// Fill a timeline with the content of `c3d`, converted to metres.
pub fn build_phase(
    c3d: &C3d,
    filename: &str,
    options: Rrc3dOptions,
    mut settings: Settings,
) -> Result<PhaseRerun, BioError> {
    let mut markers = c3d.markers();
    let units = markers.units.clone();
    markers.adjust_unit_to_meters()?;
    let t_span = markers.time();
    log::debug!(
        "{}: {} markers over {} frames, unit '{}'",
        filename,
        markers.nb_markers(),
        markers.nb_frames(),
        units
    );

    settings.display.marker_trajectories = options.marker_trajectories;
    let square_width = max_xy_coordinate_span_by_markers(&markers);
    let mut phase = PhaseRerun::new(t_span).with_settings(settings);
    phase.add_xp_markers(filename, markers)?;

    if options.show_force_plates {
        for (i, corners) in force_plates(c3d, &units)?.into_iter().enumerate() {
            phase.add_force_plate(&format!("force_plate_{i}"), corners);
        }
    }

    if options.show_forces {
        let nb_frames = phase.nb_frames();
        for (i, platform) in force_vectors(c3d)?.iter().enumerate() {
            let mut origins = downsample(&platform.center_of_pressure, nb_frames);
            let forces = downsample(&platform.force, nb_frames);
            let factor = Unit::from_label(&units)?.conversion_factor();
            origins.iter_mut().for_each(|p| *p /= factor);
            phase.add_force_data(i, origins, forces)?;
        }
    }

    if options.show_floor {
        let lowest = lowest_corner(c3d, &units)?;
        phase.add_floor(square_width, lowest);
    }

    Ok(phase)
}

/// Corners of every used force plate, in metres.
pub fn force_plates(c3d: &C3d, units: &str) -> Result<Vec<[glm::DVec3; 4]>, BioError> {
    let corners = c3d.force_platform_corners()?;
    if corners.is_empty() {
        return Ok(corners);
    }
    let factor = Unit::from_label(units)?.conversion_factor();
    Ok(corners
        .into_iter()
        .map(|plate| plate.map(|c| c / factor))
        .collect())
}

/// Lowest corner height over all plates, in metres; 0 without force plates.
pub fn lowest_corner(c3d: &C3d, units: &str) -> Result<f64, BioError> {
    let mut heights = c3d.force_platform_corner_heights();
    if heights.is_empty() {
        return Ok(0.0);
    }
    to_meters_in_place(&mut heights, units)?;
    Ok(heights.into_iter().fold(f64::INFINITY, f64::min))
}

/// Force, moment and centre of pressure of every plate at the analog rate.
pub fn force_vectors(c3d: &C3d) -> Result<Vec<ForcePlatform>, BioError> {
    Ok(c3d.force_platforms()?)
}

/// Keep every `len / nb_frames`-th sample starting at 0, at most `nb_frames` of them.
pub fn downsample<T: Copy>(samples: &[T], nb_frames: usize) -> Vec<T> {
    if nb_frames == 0 {
        return Vec::new();
    }
    let step = (samples.len() / nb_frames).max(1);
    samples.iter().step_by(step).take(nb_frames).copied().collect()
}

/// Largest absolute x or y coordinate reached by any marker.
pub fn max_xy_coordinate_span_by_markers(markers: &Markers) -> f64 {
    markers.max_xy_span()
}
