use nalgebra_glm as glm;
use std::io::Read;

use super::{C3dError, Header, Parameters, Processor};

/// Point samples, one `Vec` of positions per frame, in the file unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointData {
    pub frames: Vec<Vec<glm::DVec3>>,
    pub residuals: Vec<Vec<f64>>,
}

/// Analog samples in physical units, one row per analog sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalogData {
    pub samples: Vec<Vec<f64>>,
}

impl AnalogData {
    pub fn nb_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(move |s| s[channel])
    }
}

/// Per-channel conversion of raw analog values.
struct AnalogCalibration {
    offsets: Vec<f64>,
    scales: Vec<f64>,
    general_scale: f64,
    unsigned: bool,
}

impl AnalogCalibration {
    fn from_parameters(parameters: &Parameters, nb_channels: usize) -> Self {
        let offsets = parameters.numbers("ANALOG", "OFFSET").unwrap_or_default();
        let scales = parameters.numbers("ANALOG", "SCALE").unwrap_or_default();
        let general_scale = parameters.number("ANALOG", "GEN_SCALE").unwrap_or(1.0);
        let unsigned = parameters
            .string("ANALOG", "FORMAT")
            .is_some_and(|f| f.eq_ignore_ascii_case("UNSIGNED"));
        if scales.len() < nb_channels {
            log::debug!(
                "ANALOG:SCALE has {} entries for {} channels, missing ones default to 1",
                scales.len(),
                nb_channels
            );
        }
        Self {
            offsets,
            scales,
            general_scale,
            unsigned,
        }
    }

    fn apply(&self, channel: usize, raw: f64) -> f64 {
        let offset = self.offsets.get(channel).copied().unwrap_or(0.0);
        let scale = self.scales.get(channel).copied().unwrap_or(1.0);
        (raw - offset) * scale * self.general_scale
    }
}

/// Read the interleaved point/analog blocks that follow the parameter section.
pub(crate) fn read_data<R: Read>(
    r: &mut R,
    processor: Processor,
    header: &Header,
    parameters: &Parameters,
    nb_frames: usize,
) -> Result<(PointData, AnalogData), C3dError> {
    let nb_points = header.nb_points as usize;
    let nb_channels = header.nb_analog_channels();
    let samples_per_frame = header.analog_samples_per_frame as usize;
    let is_float = header.is_float();
    let point_scale = header.scale_factor.abs() as f64;
    let calibration = AnalogCalibration::from_parameters(parameters, nb_channels);

    let mut points = PointData {
        frames: Vec::with_capacity(nb_frames),
        residuals: Vec::with_capacity(nb_frames),
    };
    let mut analogs = AnalogData {
        samples: Vec::with_capacity(nb_frames * samples_per_frame),
    };

    for _ in 0..nb_frames {
        let mut positions = Vec::with_capacity(nb_points);
        let mut residuals = Vec::with_capacity(nb_points);
        for _ in 0..nb_points {
            let (xyz, word) = if is_float {
                let x = processor.read_f32(r)? as f64;
                let y = processor.read_f32(r)? as f64;
                let z = processor.read_f32(r)? as f64;
                let w = processor.read_f32(r)? as i32;
                (glm::vec3(x, y, z), w)
            } else {
                let x = processor.read_i16(r)? as f64 * point_scale;
                let y = processor.read_i16(r)? as f64 * point_scale;
                let z = processor.read_i16(r)? as f64 * point_scale;
                let w = processor.read_i16(r)? as i32;
                (glm::vec3(x, y, z), w)
            };
            // The low byte of the fourth word is the residual, negative flags a missing sample.
            if word < 0 {
                positions.push(glm::vec3(f64::NAN, f64::NAN, f64::NAN));
                residuals.push(-1.0);
            } else {
                positions.push(xyz);
                residuals.push((word & 0xff) as f64 * point_scale);
            }
        }
        points.frames.push(positions);
        points.residuals.push(residuals);

        for _ in 0..samples_per_frame {
            let mut sample = Vec::with_capacity(nb_channels);
            for channel in 0..nb_channels {
                let raw = if is_float {
                    processor.read_f32(r)? as f64
                } else if calibration.unsigned {
                    processor.read_u16(r)? as f64
                } else {
                    processor.read_i16(r)? as f64
                };
                sample.push(calibration.apply(channel, raw));
            }
            analogs.samples.push(sample);
        }
    }

    Ok((points, analogs))
}
