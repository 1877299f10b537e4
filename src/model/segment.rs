use nalgebra_glm as glm;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'x' => Some(Axis::X),
            'y' => Some(Axis::Y),
            'z' => Some(Axis::Z),
            _ => None,
        }
    }

    /// Parse a sequence such as `"xyz"` or `"zx"`.
    pub fn parse_sequence(s: &str) -> Option<Vec<Axis>> {
        s.chars().map(Axis::from_char).collect()
    }

    pub fn unit(self) -> glm::DVec3 {
        match self {
            Axis::X => glm::vec3(1.0, 0.0, 0.0),
            Axis::Y => glm::vec3(0.0, 1.0, 0.0),
            Axis::Z => glm::vec3(0.0, 0.0, 1.0),
        }
    }
}

/// One rigid body of the chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub name: String,
    /// Index of the parent segment, `None` for segments attached to the world.
    pub parent: Option<usize>,
    /// Fixed transform from the parent frame to this segment's frame.
    pub rt: glm::DMat4,
    pub translations: Vec<Axis>,
    pub rotations: Vec<Axis>,
    /// Index of this segment's first generalized coordinate.
    pub first_q: usize,
    pub mass: f64,
    /// Centre of mass in the segment frame.
    pub com: glm::DVec3,
    pub inertia: glm::DMat3,
    pub mesh_file: Option<PathBuf>,
    /// Inline mesh vertices in the segment frame.
    pub mesh: Vec<glm::DVec3>,
    pub mesh_color: Option<[f64; 3]>,
    pub mesh_scale: glm::DVec3,
    /// Placement of the mesh file in the segment frame.
    pub mesh_rt: glm::DMat4,
    pub ranges_q: Vec<[f64; 2]>,
    pub ranges_qdot: Vec<[f64; 2]>,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            rt: glm::DMat4::identity(),
            translations: Vec::new(),
            rotations: Vec::new(),
            first_q: 0,
            mass: 0.0,
            com: glm::DVec3::zeros(),
            inertia: glm::DMat3::zeros(),
            mesh_file: None,
            mesh: Vec::new(),
            mesh_color: None,
            mesh_scale: glm::vec3(1.0, 1.0, 1.0),
            mesh_rt: glm::DMat4::identity(),
            ranges_q: Vec::new(),
            ranges_qdot: Vec::new(),
        }
    }

    pub fn nb_q(&self) -> usize {
        self.translations.len() + self.rotations.len()
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh_file.is_some() || !self.mesh.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDef {
    pub name: String,
    pub parent: usize,
    /// Position in the parent segment frame.
    pub position: glm::DVec3,
    pub technical: bool,
    pub anatomical: bool,
}
