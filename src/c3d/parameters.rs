use byteorder::ReadBytesExt;
use serde::Serialize;
use std::io::{Cursor, Read, Seek, SeekFrom};

use super::{C3dError, Processor};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParameterValue {
    Char(Vec<String>),
    Byte(Vec<u8>),
    Int(Vec<i16>),
    Float(Vec<f32>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub locked: bool,
    /// Column-major dimensions as stored in the file (first index varies fastest).
    pub dimensions: Vec<usize>,
    pub value: ParameterValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: u8,
    pub name: String,
    pub description: String,
    pub locked: bool,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Parameters {
    pub groups: Vec<Group>,
}

impl Parameters {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, group: &str, parameter: &str) -> Option<&Parameter> {
        self.group(group)?
            .parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(parameter))
    }

    /// Numeric values of a parameter widened to `f64`, whatever their stored type.
    pub fn numbers(&self, group: &str, parameter: &str) -> Option<Vec<f64>> {
        match &self.get(group, parameter)?.value {
            ParameterValue::Byte(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ParameterValue::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ParameterValue::Float(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ParameterValue::Char(_) => None,
        }
    }

    pub fn number(&self, group: &str, parameter: &str) -> Option<f64> {
        self.numbers(group, parameter)?.first().copied()
    }

    /// Integer values read as unsigned 16-bit words, the way counters such as
    /// `POINT:FRAMES` are meant to be read.
    pub fn counts(&self, group: &str, parameter: &str) -> Option<Vec<usize>> {
        match &self.get(group, parameter)?.value {
            ParameterValue::Byte(v) => Some(v.iter().map(|&x| x as usize).collect()),
            ParameterValue::Int(v) => Some(v.iter().map(|&x| x as u16 as usize).collect()),
            ParameterValue::Float(v) => Some(v.iter().map(|&x| x.max(0.0) as usize).collect()),
            ParameterValue::Char(_) => None,
        }
    }

    pub fn count(&self, group: &str, parameter: &str) -> Option<usize> {
        self.counts(group, parameter)?.first().copied()
    }

    pub fn strings(&self, group: &str, parameter: &str) -> Option<&[String]> {
        match &self.get(group, parameter)?.value {
            ParameterValue::Char(v) => Some(v),
            _ => None,
        }
    }

    pub fn string(&self, group: &str, parameter: &str) -> Option<&str> {
        self.strings(group, parameter)?.first().map(String::as_str)
    }

    /// Decode the parameter section. `section` starts at the 4-byte section header.
    pub(crate) fn parse(section: &[u8], processor: Processor) -> Result<Self, C3dError> {
        let mut groups: Vec<Group> = Vec::new();
        let mut orphans: Vec<(u8, Parameter)> = Vec::new();
        let mut pos: u64 = 4;
        let len = section.len() as u64;
        let mut c = Cursor::new(section);

        while pos + 2 <= len {
            c.seek(SeekFrom::Start(pos))?;
            let nb_char = c.read_i8()?;
            let id = c.read_i8()?;
            if nb_char == 0 || id == 0 {
                break;
            }
            let locked = nb_char < 0;
            let name = read_string(&mut c, nb_char.unsigned_abs() as usize)?;

            let offset_pos = c.position();
            let offset = processor.read_i16(&mut c)?;
            let next = if offset <= 0 {
                None
            } else {
                Some(offset_pos + offset as u64)
            };

            if id < 0 {
                let desc_len = c.read_u8()? as usize;
                let description = read_string(&mut c, desc_len)?;
                let gid = id.unsigned_abs();
                match groups.iter_mut().find(|g| g.id == gid) {
                    // A parameter may reference its group before the group entry shows up.
                    Some(g) => {
                        g.name = name;
                        g.description = description;
                        g.locked = locked;
                    }
                    None => groups.push(Group {
                        id: gid,
                        name,
                        description,
                        locked,
                        parameters: Vec::new(),
                    }),
                }
            } else {
                let parameter = read_parameter(&mut c, processor, name, locked)?;
                orphans.push((id as u8, parameter));
            }

            match next {
                Some(n) => pos = n,
                None => break,
            }
        }

        for (gid, parameter) in orphans {
            match groups.iter_mut().find(|g| g.id == gid) {
                Some(g) => g.parameters.push(parameter),
                None => log::warn!(
                    "C3D parameter {} references missing group {}",
                    parameter.name,
                    gid
                ),
            }
        }

        Ok(Self { groups })
    }
}

fn read_string<R: Read>(r: &mut R, len: usize) -> Result<String, C3dError> {
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).trim_end_matches('\0').to_string())
}

fn read_parameter<R: Read>(
    r: &mut R,
    processor: Processor,
    name: String,
    locked: bool,
) -> Result<Parameter, C3dError> {
    let data_type = r.read_i8()?;
    let nb_dims = r.read_u8()? as usize;
    let mut dimensions = Vec::with_capacity(nb_dims);
    for _ in 0..nb_dims {
        dimensions.push(r.read_u8()? as usize);
    }
    let count: usize = if dimensions.is_empty() {
        1
    } else {
        dimensions.iter().product()
    };

    let value = match data_type {
        -1 => {
            let mut bytes = vec![0u8; count];
            r.read_exact(&mut bytes)?;
            ParameterValue::Char(split_strings(&bytes, &dimensions))
        }
        1 => {
            let mut bytes = vec![0u8; count];
            r.read_exact(&mut bytes)?;
            ParameterValue::Byte(bytes)
        }
        2 => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(processor.read_i16(r)?);
            }
            ParameterValue::Int(values)
        }
        4 => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(processor.read_f32(r)?);
            }
            ParameterValue::Float(values)
        }
        other => {
            return Err(C3dError::InvalidParameterType {
                name,
                data_type: other,
            });
        }
    };

    let desc_len = r.read_u8()? as usize;
    let description = read_string(r, desc_len)?;

    Ok(Parameter {
        name,
        description,
        locked,
        dimensions,
        value,
    })
}

/// Char parameters are `[length, count, ...]` arrays of fixed-width, space padded strings.
fn split_strings(bytes: &[u8], dimensions: &[usize]) -> Vec<String> {
    let width = dimensions.first().copied().unwrap_or(1).max(1);
    bytes
        .chunks(width)
        .map(|chunk| String::from_utf8_lossy(chunk).trim().to_string())
        .collect()
}
