//! Force platform geometry and ground reaction extraction.
//!
//! Forces and moments are read from the analog channels listed in
//! `FORCE_PLATFORM:CHANNEL`, moved to the centre of the plate surface and
//! expressed in the laboratory frame. Lengths keep the point unit of the file.

use nalgebra_glm as glm;
use serde::Serialize;

use super::{AnalogData, C3dError, Parameters};

/// Below this vertical force (N) the centre of pressure is undefined.
const MIN_VERTICAL_FORCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForcePlatform {
    pub kind: u16,
    pub corners: [glm::DVec3; 4],
    /// Transducer origin relative to the surface centre, plate frame.
    pub origin: glm::DVec3,
    /// 0-based analog channels for Fx, Fy, Fz, Mx, My, Mz.
    pub channels: [usize; 6],
    pub force: Vec<glm::DVec3>,
    pub moment: Vec<glm::DVec3>,
    pub center_of_pressure: Vec<glm::DVec3>,
    pub free_moment: Vec<glm::DVec3>,
}

impl ForcePlatform {
    pub fn center(&self) -> glm::DVec3 {
        plate_center(&self.corners)
    }

    pub fn nb_samples(&self) -> usize {
        self.force.len()
    }
}

pub(crate) fn plate_center(corners: &[glm::DVec3; 4]) -> glm::DVec3 {
    corners.iter().fold(glm::DVec3::zeros(), |acc, c| acc + c) / 4.0
}

/// Rotation from the plate frame to the laboratory frame, built from the corners.
pub(crate) fn reference_frame(corners: &[glm::DVec3; 4]) -> glm::DMat3 {
    let x = corners[0] - corners[1];
    let y = corners[0] - corners[3];
    let z = x.cross(&y);
    let y = z.cross(&x);
    let (x, y, z) = (x.normalize(), y.normalize(), z.normalize());
    glm::DMat3::from_columns(&[x, y, z])
}

pub(crate) fn nb_used(parameters: &Parameters) -> usize {
    parameters.count("FORCE_PLATFORM", "USED").unwrap_or(0)
}

/// Corners of every plate declared in `FORCE_PLATFORM:CORNERS`, used or not.
pub(crate) fn all_corners(parameters: &Parameters) -> Vec<[glm::DVec3; 4]> {
    let Some(values) = parameters.numbers("FORCE_PLATFORM", "CORNERS") else {
        return Vec::new();
    };
    values
        .chunks_exact(12)
        .map(|plate| {
            let corner = |i: usize| glm::vec3(plate[3 * i], plate[3 * i + 1], plate[3 * i + 2]);
            [corner(0), corner(1), corner(2), corner(3)]
        })
        .collect()
}

/// Corners of the plates counted by `FORCE_PLATFORM:USED`.
pub(crate) fn used_corners(parameters: &Parameters) -> Result<Vec<[glm::DVec3; 4]>, C3dError> {
    let used = nb_used(parameters);
    if used == 0 {
        return Ok(Vec::new());
    }
    let corners = all_corners(parameters);
    if corners.len() < used {
        return Err(C3dError::InconsistentData(format!(
            "FORCE_PLATFORM:USED is {used} but CORNERS describes {} plates",
            corners.len()
        )));
    }
    Ok(corners.into_iter().take(used).collect())
}

pub(crate) fn extract(
    parameters: &Parameters,
    analogs: &AnalogData,
) -> Result<Vec<ForcePlatform>, C3dError> {
    let corners = used_corners(parameters)?;
    if corners.is_empty() {
        return Ok(Vec::new());
    }

    let kinds = parameters
        .counts("FORCE_PLATFORM", "TYPE")
        .ok_or(C3dError::missing("FORCE_PLATFORM", "TYPE"))?;
    let channel_param = parameters
        .get("FORCE_PLATFORM", "CHANNEL")
        .ok_or(C3dError::missing("FORCE_PLATFORM", "CHANNEL"))?;
    let channel_rows = channel_param.dimensions.first().copied().unwrap_or(6);
    let channels = parameters
        .counts("FORCE_PLATFORM", "CHANNEL")
        .ok_or(C3dError::missing("FORCE_PLATFORM", "CHANNEL"))?;
    let origins = parameters
        .numbers("FORCE_PLATFORM", "ORIGIN")
        .unwrap_or_default();
    let calibrations = parameters
        .numbers("FORCE_PLATFORM", "CAL_MATRIX")
        .unwrap_or_default();

    let mut platforms = Vec::with_capacity(corners.len());
    for (plate, corners) in corners.into_iter().enumerate() {
        let kind = kinds.get(plate).copied().unwrap_or(0) as u16;
        if kind != 2 && kind != 4 {
            log::warn!("force platform {plate} has unsupported type {kind}, skipping");
            continue;
        }
        let plate_channels = plate_channels(&channels, channel_rows, plate, analogs)?;

        let mut origin = origins
            .get(3 * plate..3 * plate + 3)
            .map(|o| glm::vec3(o[0], o[1], o[2]))
            .unwrap_or_else(glm::DVec3::zeros);
        if origin.z > 0.0 {
            origin = -origin;
        }

        let calibration = if kind == 4 {
            let values = calibrations.get(36 * plate..36 * plate + 36).ok_or(
                C3dError::missing("FORCE_PLATFORM", "CAL_MATRIX"),
            )?;
            Some(values.to_vec())
        } else {
            None
        };

        let mut platform = ForcePlatform {
            kind,
            corners,
            origin,
            channels: plate_channels,
            force: Vec::with_capacity(analogs.nb_samples()),
            moment: Vec::with_capacity(analogs.nb_samples()),
            center_of_pressure: Vec::with_capacity(analogs.nb_samples()),
            free_moment: Vec::with_capacity(analogs.nb_samples()),
        };
        fill_reactions(&mut platform, analogs, calibration.as_deref());
        platforms.push(platform);
    }
    Ok(platforms)
}

fn plate_channels(
    channels: &[usize],
    rows: usize,
    plate: usize,
    analogs: &AnalogData,
) -> Result<[usize; 6], C3dError> {
    let nb_channels = analogs.samples.first().map_or(0, Vec::len);
    let mut out = [0usize; 6];
    for (i, slot) in out.iter_mut().enumerate() {
        let one_based = channels.get(rows * plate + i).copied().unwrap_or(0);
        if one_based == 0 || (nb_channels > 0 && one_based > nb_channels) {
            return Err(C3dError::InconsistentData(format!(
                "force platform {plate} references analog channel {one_based}"
            )));
        }
        *slot = one_based - 1;
    }
    Ok(out)
}

fn fill_reactions(platform: &mut ForcePlatform, analogs: &AnalogData, calibration: Option<&[f64]>) {
    let rotation = reference_frame(&platform.corners);
    let center = platform.center();

    for sample in &analogs.samples {
        let mut raw = [0.0; 6];
        for (value, &channel) in raw.iter_mut().zip(platform.channels.iter()) {
            *value = sample[channel];
        }
        if let Some(cal) = calibration {
            raw = calibrate(cal, &raw);
        }
        let force = glm::vec3(raw[0], raw[1], raw[2]);
        let moment_at_origin = glm::vec3(raw[3], raw[4], raw[5]);
        let moment = moment_at_origin + platform.origin.cross(&force);

        let cop_local = if force.z.abs() < MIN_VERTICAL_FORCE {
            glm::DVec3::zeros()
        } else {
            glm::vec3(-moment.y / force.z, moment.x / force.z, 0.0)
        };
        let tz = moment.z - (cop_local.x * force.y - cop_local.y * force.x);

        platform.force.push(rotation * force);
        platform.moment.push(rotation * moment);
        platform.center_of_pressure.push(rotation * cop_local + center);
        platform.free_moment.push(rotation * glm::vec3(0.0, 0.0, tz));
    }
}

/// `CAL_MATRIX` is stored first-index-fastest: entry (row, col) is at `col * 6 + row`.
fn calibrate(cal: &[f64], raw: &[f64; 6]) -> [f64; 6] {
    let mut out = [0.0; 6];
    for (row, value) in out.iter_mut().enumerate() {
        *value = (0..6).map(|col| cal[col * 6 + row] * raw[col]).sum();
    }
    out
}
