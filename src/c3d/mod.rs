//! Reader for the C3D motion-capture container.
//!
//! A file is a 512-byte header block, a parameter section and interleaved
//! point and analog data blocks. Only reading is supported.

mod data;
mod error;
mod force_platform;
mod header;
mod parameters;
mod processor;

#[cfg(test)]
pub(crate) mod fixture;

pub use data::{AnalogData, PointData};
pub use error::C3dError;
pub use force_platform::ForcePlatform;
pub use header::{BLOCK_SIZE, Header};
pub use parameters::{Group, Parameter, ParameterValue, Parameters};
pub use processor::Processor;

use nalgebra_glm as glm;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::markers::Markers;

#[derive(Debug, Clone)]
pub struct C3d {
    pub header: Header,
    pub parameters: Parameters,
    pub processor: Processor,
    pub points: PointData,
    pub analogs: AnalogData,
}

/// What the CLI prints for `--info`.
#[derive(Debug, Clone, Serialize)]
pub struct C3dSummary {
    pub processor: Processor,
    pub nb_frames: usize,
    pub first_frame: usize,
    pub point_rate: f64,
    pub point_units: String,
    pub point_labels: Vec<String>,
    pub analog_rate: f64,
    pub analog_labels: Vec<String>,
    pub nb_force_platforms: usize,
}

impl C3d {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, C3dError> {
        let path = path.as_ref();
        log::info!("Reading C3D file {}", path.display());
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader)
    }

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, C3dError> {
        let mut header_block = [0u8; BLOCK_SIZE as usize];
        reader.seek(SeekFrom::Start(0))?;
        reader.read_exact(&mut header_block)?;
        if header_block[1] != 0x50 {
            return Err(C3dError::BadHeaderKey(header_block[1]));
        }

        // The processor type lives in the parameter section but the header floats depend on it.
        let parameter_start = (header_block[0].max(1) as u64 - 1) * BLOCK_SIZE;
        reader.seek(SeekFrom::Start(parameter_start))?;
        let mut section_head = [0u8; 4];
        reader.read_exact(&mut section_head)?;
        let processor = Processor::from_byte(section_head[3])?;
        let header = Header::parse(&header_block, processor)?;

        let nb_blocks = (section_head[2] as u64).max(1);
        let mut section = vec![0u8; (nb_blocks * BLOCK_SIZE) as usize];
        reader.seek(SeekFrom::Start(parameter_start))?;
        read_up_to(reader, &mut section)?;
        let parameters = Parameters::parse(&section, processor)?;
        log::debug!(
            "C3D: {:?}, {} groups, {} points, {} analog channels",
            processor,
            parameters.groups.len(),
            header.nb_points,
            header.nb_analog_channels()
        );

        let nb_frames = match parameters.count("POINT", "FRAMES") {
            Some(frames) if frames > header.nb_frames() => frames,
            _ => header.nb_frames(),
        };

        let data_start = (header.data_block.max(1) as u64 - 1) * BLOCK_SIZE;
        reader.seek(SeekFrom::Start(data_start))?;
        let (points, analogs) = data::read_data(reader, processor, &header, &parameters, nb_frames)?;

        Ok(Self {
            header,
            parameters,
            processor,
            points,
            analogs,
        })
    }

    pub fn nb_frames(&self) -> usize {
        self.points.frames.len()
    }

    /// `POINT:UNITS`, `"mm"` when absent.
    pub fn point_units(&self) -> String {
        self.parameters
            .string("POINT", "UNITS")
            .filter(|u| !u.is_empty())
            .unwrap_or("mm")
            .to_string()
    }

    pub fn point_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .parameters
            .strings("POINT", "LABELS")
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        let nb_points = self.header.nb_points as usize;
        labels.truncate(nb_points);
        while labels.len() < nb_points {
            labels.push(format!("point_{}", labels.len()));
        }
        labels
    }

    pub fn point_rate(&self) -> f64 {
        self.parameters
            .number("POINT", "RATE")
            .unwrap_or(self.header.frame_rate as f64)
    }

    pub fn analog_rate(&self) -> f64 {
        self.parameters
            .number("ANALOG", "RATE")
            .unwrap_or(self.point_rate() * self.header.analog_samples_per_frame as f64)
    }

    pub fn analog_labels(&self) -> Vec<String> {
        self.parameters
            .strings("ANALOG", "LABELS")
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// Marker positions in the file unit, with rate and first frame filled in.
    pub fn markers(&self) -> Markers {
        let labels = self.point_labels();
        let mut markers = Markers::zeros(labels, self.nb_frames())
            .with_units(self.point_units())
            .with_rate(self.point_rate(), self.header.first_frame);
        for (frame, positions) in self.points.frames.iter().enumerate() {
            for (marker, p) in positions.iter().enumerate() {
                markers.set_position(marker, frame, *p);
            }
        }
        markers
    }

    pub fn nb_force_platforms(&self) -> usize {
        force_platform::nb_used(&self.parameters)
    }

    /// Corners of the used force plates in the file unit, four `[x, y, z]` per plate.
    pub fn force_platform_corners(&self) -> Result<Vec<[glm::DVec3; 4]>, C3dError> {
        force_platform::used_corners(&self.parameters)
    }

    /// z coordinates of every corner declared in `FORCE_PLATFORM:CORNERS`.
    pub fn force_platform_corner_heights(&self) -> Vec<f64> {
        force_platform::all_corners(&self.parameters)
            .iter()
            .flat_map(|plate| plate.iter().map(|c| c.z))
            .collect()
    }

    /// Force, moment and centre of pressure of each used plate at the analog rate.
    pub fn force_platforms(&self) -> Result<Vec<ForcePlatform>, C3dError> {
        force_platform::extract(&self.parameters, &self.analogs)
    }

    pub fn summary(&self) -> C3dSummary {
        C3dSummary {
            processor: self.processor,
            nb_frames: self.nb_frames(),
            first_frame: self.header.first_frame,
            point_rate: self.point_rate(),
            point_units: self.point_units(),
            point_labels: self.point_labels(),
            analog_rate: self.analog_rate(),
            analog_labels: self.analog_labels(),
            nb_force_platforms: self.nb_force_platforms(),
        }
    }
}

/// Fill as much of `buf` as the reader has; short files end their last block early.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), C3dError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::fixture::{C3dFixture, PlateFixture};
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn reads_float_points_and_labels() {
        let bytes = C3dFixture::new(2, 4).units("mm").first_frame(10).build();
        let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(c3d.processor, Processor::Intel);
        assert_eq!(c3d.nb_frames(), 4);
        assert_eq!(c3d.header.first_frame, 9);
        assert_eq!(c3d.point_units(), "mm");
        assert_eq!(c3d.point_labels(), vec!["M0", "M1"]);
        assert_relative_eq!(c3d.point_rate(), 100.0);

        let markers = c3d.markers();
        assert_eq!(markers.shape(), [3, 2, 4]);
        assert_relative_eq!(markers.position(1, 3).x, C3dFixture::point_value(1, 3, 0));
        assert_relative_eq!(markers.position(0, 2).z, C3dFixture::point_value(0, 2, 2));
    }

    #[test]
    fn scaled_integer_points_are_rescaled() {
        let bytes = C3dFixture::new(1, 2).integer_points(0.5).build();
        let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();
        let expected = (C3dFixture::point_value(0, 1, 1) / 0.5).round() * 0.5;
        assert_relative_eq!(c3d.points.frames[1][0].y, expected);
    }

    #[test]
    fn missing_samples_become_nan() {
        let bytes = C3dFixture::new(2, 3).missing(1, 2).build();
        let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();
        assert!(c3d.points.frames[2][1].x.is_nan());
        assert!(!c3d.points.frames[2][0].x.is_nan());
        assert_eq!(c3d.points.residuals[2], vec![0.0, -1.0]);
        assert_eq!(c3d.points.residuals[1], vec![0.0, 0.0]);
    }

    #[test]
    fn dec_and_mips_files_read_like_intel() {
        let plate = PlateFixture::centered_at(200.0, 0.0, 5.0);
        let fixture = C3dFixture::new(2, 3)
            .first_frame(4)
            .analog_samples_per_frame(2)
            .plate(plate.clone());
        let intel = C3d::read(&mut Cursor::new(fixture.build())).unwrap();

        for processor in [Processor::Dec, Processor::Mips] {
            let bytes = fixture.clone().processor(processor).build();
            let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();
            assert_eq!(c3d.processor, processor);
            assert_eq!(c3d.header.first_frame, 3);
            assert_eq!(c3d.nb_frames(), 3);
            assert_eq!(c3d.point_labels(), intel.point_labels());
            assert_relative_eq!(c3d.point_rate(), 100.0);
            assert_relative_eq!(c3d.points.frames[2][1].z, C3dFixture::point_value(1, 2, 2));
            assert_eq!(c3d.force_platform_corners().unwrap(), intel.force_platform_corners().unwrap());

            let platforms = c3d.force_platforms().unwrap();
            assert_eq!(platforms[0].nb_samples(), 6);
            assert_relative_eq!(platforms[0].force[5].z, plate.vertical_force, epsilon = 1e-3);
        }
    }

    #[test]
    fn mips_integer_points_are_rescaled() {
        let bytes = C3dFixture::new(1, 2)
            .integer_points(0.5)
            .processor(Processor::Mips)
            .build();
        let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();
        let expected = (C3dFixture::point_value(0, 1, 0) / 0.5).round() * 0.5;
        assert_relative_eq!(c3d.points.frames[1][0].x, expected);
    }

    #[test]
    fn no_force_platform_means_no_corners() {
        let bytes = C3dFixture::new(1, 1).build();
        let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(c3d.nb_force_platforms(), 0);
        assert!(c3d.force_platform_corners().unwrap().is_empty());
        assert!(c3d.force_platforms().unwrap().is_empty());
    }

    #[test]
    fn force_platform_corners_and_cop() {
        let plate = PlateFixture::centered_at(200.0, 0.0, 5.0);
        let bytes = C3dFixture::new(1, 3)
            .analog_samples_per_frame(2)
            .plate(plate.clone())
            .build();
        let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();

        let corners = c3d.force_platform_corners().unwrap();
        assert_eq!(corners.len(), 1);
        assert_relative_eq!(corners[0][2].z, 5.0);

        let platforms = c3d.force_platforms().unwrap();
        assert_eq!(platforms.len(), 1);
        assert_eq!(platforms[0].nb_samples(), 6);
        let cop = platforms[0].center_of_pressure[4];
        assert_relative_eq!(cop.x, 200.0 + plate.press_at[0], epsilon = 1e-3);
        assert_relative_eq!(cop.y, plate.press_at[1], epsilon = 1e-3);
        assert_relative_eq!(platforms[0].force[4].z, plate.vertical_force, epsilon = 1e-3);
    }

    #[test]
    fn summary_serialises_to_json() {
        let bytes = C3dFixture::new(2, 2).build();
        let c3d = C3d::read(&mut Cursor::new(bytes)).unwrap();
        let json = serde_json::to_value(c3d.summary()).unwrap();
        assert_eq!(json["nb_frames"], 2);
        assert_eq!(json["point_labels"][1], "M1");
        assert_eq!(json["processor"], "Intel");
    }

    #[test]
    fn garbage_is_rejected() {
        let bytes = vec![0u8; 1024];
        assert!(matches!(
            C3d::read(&mut Cursor::new(bytes)),
            Err(C3dError::BadHeaderKey(0))
        ));
    }
}
