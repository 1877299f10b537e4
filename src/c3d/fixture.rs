//! Builds small in-memory C3D files for tests.

use super::{BLOCK_SIZE, Processor};

/// Writes numbers the way `processor` expects to read them back.
#[derive(Debug, Clone, Copy)]
struct Encoder(Processor);

impl Encoder {
    fn i16(self, v: i16) -> [u8; 2] {
        match self.0 {
            Processor::Mips => v.to_be_bytes(),
            Processor::Intel | Processor::Dec => v.to_le_bytes(),
        }
    }

    fn u16(self, v: u16) -> [u8; 2] {
        match self.0 {
            Processor::Mips => v.to_be_bytes(),
            Processor::Intel | Processor::Dec => v.to_le_bytes(),
        }
    }

    fn f32(self, v: f32) -> [u8; 4] {
        match self.0 {
            Processor::Intel => v.to_le_bytes(),
            Processor::Mips => v.to_be_bytes(),
            Processor::Dec => {
                let b = (v * 4.0).to_le_bytes();
                [b[2], b[3], b[0], b[1]]
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PlateFixture {
    pub corners: [[f32; 3]; 4],
    /// Written as stored; the reader flips it below the surface.
    pub origin: [f32; 3],
    /// Pressing point relative to the plate centre, mm.
    pub press_at: [f64; 2],
    pub vertical_force: f64,
}

impl PlateFixture {
    /// A 400 mm square plate whose axes match the laboratory axes.
    pub fn centered_at(x: f32, y: f32, z: f32) -> Self {
        Self {
            corners: [
                [x + 200.0, y + 200.0, z],
                [x - 200.0, y + 200.0, z],
                [x - 200.0, y - 200.0, z],
                [x + 200.0, y - 200.0, z],
            ],
            origin: [0.0, 0.0, 20.0],
            press_at: [30.0, -40.0],
            vertical_force: 700.0,
        }
    }

    fn analog_sample(&self) -> [f32; 6] {
        let fz = self.vertical_force;
        let [x, y] = self.press_at;
        [0.0, 0.0, fz as f32, (y * fz) as f32, (-x * fz) as f32, 0.0]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct C3dFixture {
    nb_points: usize,
    nb_frames: usize,
    units: String,
    first_frame: u16,
    rate: f32,
    scale: f32,
    missing: Vec<(usize, usize)>,
    analog_samples_per_frame: u16,
    plate: Option<PlateFixture>,
    processor: Processor,
}

impl C3dFixture {
    pub fn new(nb_points: usize, nb_frames: usize) -> Self {
        Self {
            nb_points,
            nb_frames,
            units: "mm".to_string(),
            first_frame: 1,
            rate: 100.0,
            scale: -1.0,
            missing: Vec::new(),
            analog_samples_per_frame: 0,
            plate: None,
            processor: Processor::Intel,
        }
    }

    /// Value written for `(marker, frame, axis)`.
    pub fn point_value(marker: usize, frame: usize, axis: usize) -> f64 {
        100.0 * (marker + 1) as f64 + 10.0 * frame as f64 + axis as f64 + 0.25
    }

    pub fn units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    /// 1-based, as stored in the header.
    pub fn first_frame(mut self, first_frame: u16) -> Self {
        self.first_frame = first_frame;
        self
    }

    pub fn integer_points(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn missing(mut self, marker: usize, frame: usize) -> Self {
        self.missing.push((marker, frame));
        self
    }

    pub fn analog_samples_per_frame(mut self, samples: u16) -> Self {
        self.analog_samples_per_frame = samples;
        self
    }

    pub fn plate(mut self, plate: PlateFixture) -> Self {
        self.plate = Some(plate);
        if self.analog_samples_per_frame == 0 {
            self.analog_samples_per_frame = 1;
        }
        self
    }

    pub fn processor(mut self, processor: Processor) -> Self {
        self.processor = processor;
        self
    }

    fn nb_channels(&self) -> usize {
        if self.analog_samples_per_frame == 0 { 0 } else { 6 }
    }

    pub fn build(&self) -> Vec<u8> {
        let enc = Encoder(self.processor);
        let mut params = ParamWriter::new(enc);
        params.group(1, "POINT");
        params.int(1, "USED", &[1], &[self.nb_points as i16]);
        params.char(1, "UNITS", &[self.units.as_str()]);
        let labels: Vec<String> = (0..self.nb_points).map(|i| format!("M{i}")).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        params.char(1, "LABELS", &labels);
        params.float(1, "RATE", &[1], &[self.rate]);
        params.float(1, "SCALE", &[1], &[self.scale]);
        params.int(1, "FRAMES", &[1], &[self.nb_frames as i16]);

        params.group(2, "ANALOG");
        params.int(2, "USED", &[1], &[self.nb_channels() as i16]);
        params.float(
            2,
            "RATE",
            &[1],
            &[self.rate * self.analog_samples_per_frame as f32],
        );

        params.group(3, "FORCE_PLATFORM");
        match &self.plate {
            Some(plate) => {
                params.int(3, "USED", &[1], &[1]);
                params.int(3, "TYPE", &[1], &[2]);
                let corners: Vec<f32> = plate.corners.iter().flatten().copied().collect();
                params.float(3, "CORNERS", &[3, 4, 1], &corners);
                params.float(3, "ORIGIN", &[3, 1], &plate.origin);
                params.int(3, "CHANNEL", &[6, 1], &[1, 2, 3, 4, 5, 6]);
            }
            None => {
                params.int(3, "USED", &[1], &[0]);
                params.float(3, "CORNERS", &[3, 4, 0], &[]);
            }
        }

        let section = params.finish();
        let nb_param_blocks = section.len().div_ceil(BLOCK_SIZE as usize);
        let data_block = 2 + nb_param_blocks;

        let mut out = vec![0u8; BLOCK_SIZE as usize];
        out[0] = 2;
        out[1] = 0x50;
        out[2..4].copy_from_slice(&enc.u16(self.nb_points as u16));
        out[4..6].copy_from_slice(&enc.u16(
            self.nb_channels() as u16 * self.analog_samples_per_frame,
        ));
        out[6..8].copy_from_slice(&enc.u16(self.first_frame));
        out[8..10].copy_from_slice(&enc.u16(self.first_frame + self.nb_frames as u16 - 1));
        out[12..16].copy_from_slice(&enc.f32(self.scale));
        out[16..18].copy_from_slice(&enc.u16(data_block as u16));
        out[18..20].copy_from_slice(&enc.u16(self.analog_samples_per_frame));
        out[20..24].copy_from_slice(&enc.f32(self.rate));

        let mut section = section;
        section[2] = nb_param_blocks as u8;
        section.resize(nb_param_blocks * BLOCK_SIZE as usize, 0);
        out.extend(section);

        for frame in 0..self.nb_frames {
            for marker in 0..self.nb_points {
                let missing = self.missing.contains(&(marker, frame));
                for axis in 0..3 {
                    let v = Self::point_value(marker, frame, axis);
                    self.push_value(&mut out, v / self.scale.abs() as f64);
                }
                self.push_value(&mut out, if missing { -1.0 } else { 0.0 });
            }
            for _ in 0..self.analog_samples_per_frame {
                let sample = self
                    .plate
                    .as_ref()
                    .map(PlateFixture::analog_sample)
                    .unwrap_or([0.0; 6]);
                for v in sample {
                    self.push_value(&mut out, v as f64);
                }
            }
        }
        out
    }

    fn push_value(&self, out: &mut Vec<u8>, v: f64) {
        let enc = Encoder(self.processor);
        if self.scale < 0.0 {
            out.extend_from_slice(&enc.f32(v as f32));
        } else {
            out.extend_from_slice(&enc.i16(v.round() as i16));
        }
    }
}

struct ParamWriter {
    enc: Encoder,
    bytes: Vec<u8>,
}

impl ParamWriter {
    fn new(enc: Encoder) -> Self {
        Self {
            enc,
            bytes: vec![1, 0x50, 1, enc.0.to_byte()],
        }
    }

    fn group(&mut self, id: u8, name: &str) {
        self.bytes.push(name.len() as u8);
        self.bytes.push((-(id as i8)) as u8);
        self.bytes.extend_from_slice(name.as_bytes());
        self.bytes.extend_from_slice(&self.enc.i16(3));
        self.bytes.push(0);
    }

    fn entry(&mut self, group: u8, name: &str, data_type: i8, dims: &[u8], data: &[u8]) {
        self.bytes.push(name.len() as u8);
        self.bytes.push(group);
        self.bytes.extend_from_slice(name.as_bytes());
        let offset = 2 + 1 + 1 + dims.len() + data.len() + 1;
        self.bytes.extend_from_slice(&self.enc.i16(offset as i16));
        self.bytes.push(data_type as u8);
        self.bytes.push(dims.len() as u8);
        self.bytes.extend_from_slice(dims);
        self.bytes.extend_from_slice(data);
        self.bytes.push(0);
    }

    fn int(&mut self, group: u8, name: &str, dims: &[u8], values: &[i16]) {
        let data: Vec<u8> = values.iter().flat_map(|v| self.enc.i16(*v)).collect();
        self.entry(group, name, 2, dims, &data);
    }

    fn float(&mut self, group: u8, name: &str, dims: &[u8], values: &[f32]) {
        let data: Vec<u8> = values.iter().flat_map(|v| self.enc.f32(*v)).collect();
        self.entry(group, name, 4, dims, &data);
    }

    fn char(&mut self, group: u8, name: &str, values: &[&str]) {
        let width = values.iter().map(|s| s.len()).max().unwrap_or(0).max(1);
        let mut data = Vec::with_capacity(width * values.len());
        for v in values {
            let mut padded = v.as_bytes().to_vec();
            padded.resize(width, b' ');
            data.extend(padded);
        }
        let dims: Vec<u8> = if values.len() == 1 {
            vec![width as u8]
        } else {
            vec![width as u8, values.len() as u8]
        };
        self.entry(group, name, -1, &dims, &data);
    }

    fn finish(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(&[0, 0]);
        self.bytes
    }
}
