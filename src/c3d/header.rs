use serde::Serialize;
use std::io::{Cursor, Seek, SeekFrom};

use super::{C3dError, Processor};

pub const BLOCK_SIZE: u64 = 512;

/// First 512-byte block of a C3D file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub parameter_block: u8,
    pub nb_points: u16,
    /// Analog measurements per point frame (channels × samples per frame).
    pub nb_analog_measurements: u16,
    /// 0-based, the file stores it 1-based.
    pub first_frame: usize,
    /// 0-based, inclusive.
    pub last_frame: usize,
    pub max_interpolation_gap: u16,
    /// Negative means point data is stored as floats.
    pub scale_factor: f32,
    pub data_block: u16,
    pub analog_samples_per_frame: u16,
    pub frame_rate: f32,
}

impl Header {
    pub(crate) fn parse(block: &[u8], processor: Processor) -> Result<Self, C3dError> {
        if block.len() < 24 {
            return Err(C3dError::InconsistentData("header block is truncated".into()));
        }
        if block[1] != 0x50 {
            return Err(C3dError::BadHeaderKey(block[1]));
        }
        let mut c = Cursor::new(block);
        c.seek(SeekFrom::Start(2))?;
        let nb_points = processor.read_u16(&mut c)?;
        let nb_analog_measurements = processor.read_u16(&mut c)?;
        let first_frame = processor.read_u16(&mut c)?;
        let last_frame = processor.read_u16(&mut c)?;
        let max_interpolation_gap = processor.read_u16(&mut c)?;
        let scale_factor = processor.read_f32(&mut c)?;
        let data_block = processor.read_u16(&mut c)?;
        let analog_samples_per_frame = processor.read_u16(&mut c)?;
        let frame_rate = processor.read_f32(&mut c)?;

        Ok(Self {
            parameter_block: block[0],
            nb_points,
            nb_analog_measurements,
            first_frame: (first_frame as usize).saturating_sub(1),
            last_frame: (last_frame as usize).saturating_sub(1),
            max_interpolation_gap,
            scale_factor,
            data_block,
            analog_samples_per_frame,
            frame_rate,
        })
    }

    pub fn nb_frames(&self) -> usize {
        if self.last_frame < self.first_frame {
            0
        } else {
            self.last_frame - self.first_frame + 1
        }
    }

    pub fn nb_analog_channels(&self) -> usize {
        if self.analog_samples_per_frame == 0 {
            0
        } else {
            (self.nb_analog_measurements / self.analog_samples_per_frame) as usize
        }
    }

    pub fn is_float(&self) -> bool {
        self.scale_factor < 0.0
    }
}
