use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{self, Read};

use super::C3dError;

/// Byte layout announced by the fourth byte of the parameter section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Processor {
    Intel,
    Dec,
    Mips,
}

impl Processor {
    pub fn from_byte(byte: u8) -> Result<Self, C3dError> {
        match byte {
            84 => Ok(Processor::Intel),
            85 => Ok(Processor::Dec),
            86 => Ok(Processor::Mips),
            other => Err(C3dError::UnknownProcessor(other)),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Processor::Intel => 84,
            Processor::Dec => 85,
            Processor::Mips => 86,
        }
    }

    pub fn read_i16<R: Read>(self, r: &mut R) -> io::Result<i16> {
        match self {
            Processor::Intel | Processor::Dec => r.read_i16::<LittleEndian>(),
            Processor::Mips => r.read_i16::<BigEndian>(),
        }
    }

    pub fn read_u16<R: Read>(self, r: &mut R) -> io::Result<u16> {
        match self {
            Processor::Intel | Processor::Dec => r.read_u16::<LittleEndian>(),
            Processor::Mips => r.read_u16::<BigEndian>(),
        }
    }

    pub fn read_f32<R: Read>(self, r: &mut R) -> io::Result<f32> {
        match self {
            Processor::Intel => r.read_f32::<LittleEndian>(),
            Processor::Mips => r.read_f32::<BigEndian>(),
            Processor::Dec => {
                // VAX F-float: swap the 16-bit words, then the exponent bias is off by 2.
                let mut b = [0u8; 4];
                r.read_exact(&mut b)?;
                let v = f32::from_le_bytes([b[2], b[3], b[0], b[1]]);
                Ok(if v == 0.0 { 0.0 } else { v / 4.0 })
            }
        }
    }
}
