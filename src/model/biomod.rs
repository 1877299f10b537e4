//! Reader for the `.bioMod` text format.
//!
//! Only the kinematic part of the format is understood: segments with their
//! degrees of freedom, inertial parameters and meshes, plus markers. Other
//! top-level blocks such as muscles or contacts are skipped.

use nalgebra_glm as glm;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::KinematicModel;
use super::kinematics::{euler_transform, global_transforms, transform_point};
use super::segment::{Axis, MarkerDef, Segment};
use crate::error::BioError;

/// Keywords understood inside a `segment` block.
const SEGMENT_KEYWORDS: &[&str] = &[
    "parent",
    "rtinmatrix",
    "rt",
    "translations",
    "rotations",
    "mass",
    "com",
    "inertia",
    "meshfile",
    "mesh",
    "meshcolor",
    "meshscale",
    "meshrt",
    "rangesq",
    "ranges",
    "rangesqdot",
    "rangesqddot",
    "endsegment",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiomodModel {
    name: String,
    path: Option<PathBuf>,
    pub version: u32,
    pub gravity: glm::DVec3,
    segments: Vec<Segment>,
    markers: Vec<MarkerDef>,
    nb_q: usize,
}

/// What the CLI prints for `--info` on a model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub version: u32,
    pub gravity: [f64; 3],
    pub nb_q: usize,
    pub segment_names: Vec<String>,
    pub marker_names: Vec<String>,
    pub mesh_paths: Vec<PathBuf>,
}

impl BiomodModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BioError> {
        let path = path.as_ref();
        log::info!("Loading bioMod {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(|e| BioError::new("biomod-read").with_arg("path", path.display()).push_std(e))?;
        let name = model_name(path);
        let mut model = Self::parse_in(&name, &text, path.parent()).map_err(|e| {
            BioError::new("biomod-load")
                .with_arg("path", path.display())
                .push_bio(e)
        })?;
        model.path = Some(path.to_path_buf());
        Ok(model)
    }

    /// Parse a model held in memory; mesh files resolve against the working directory.
    pub fn parse(name: &str, text: &str) -> Result<Self, BioError> {
        Self::parse_in(name, text, None)
    }

    fn parse_in(name: &str, text: &str, base_dir: Option<&Path>) -> Result<Self, BioError> {
        let mut parser = Parser {
            tokens: Tokens::new(text),
            base_dir: base_dir.map(Path::to_path_buf),
            model: BiomodModel {
                name: name.to_string(),
                path: None,
                version: 4,
                gravity: glm::vec3(0.0, 0.0, -9.81),
                segments: Vec::new(),
                markers: Vec::new(),
                nb_q: 0,
            },
        };
        parser.run()?;
        let model = parser.model;
        log::debug!(
            "bioMod {}: {} segments, {} markers, {} dof",
            model.name,
            model.segments.len(),
            model.markers.len(),
            model.nb_q
        );
        Ok(model)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn marker_defs(&self) -> &[MarkerDef] {
        &self.markers
    }

    pub fn segment_index(&self, name: &str) -> Option<usize> {
        self.segments.iter().position(|s| s.name == name)
    }

    pub fn total_mass(&self) -> f64 {
        self.segments.iter().map(|s| s.mass).sum()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            name: self.name.clone(),
            version: self.version,
            gravity: [self.gravity.x, self.gravity.y, self.gravity.z],
            nb_q: self.nb_q,
            segment_names: self.segment_names(),
            marker_names: self.marker_names(),
            mesh_paths: self.mesh_paths(),
        }
    }

    fn check_q(&self, q: &[f64]) -> Result<(), BioError> {
        if q.len() != self.nb_q {
            return Err(BioError::q_size_mismatch(self.nb_q, q.len()));
        }
        Ok(())
    }
}

impl KinematicModel for BiomodModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn nb_q(&self) -> usize {
        self.nb_q
    }

    fn marker_names(&self) -> Vec<String> {
        self.markers.iter().map(|m| m.name.clone()).collect()
    }

    fn nb_markers(&self) -> usize {
        self.markers.len()
    }

    fn segment_names(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.name.clone()).collect()
    }

    fn nb_segments(&self) -> usize {
        self.segments.len()
    }

    fn segments_with_mesh(&self) -> Vec<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has_mesh())
            .map(|(i, _)| i)
            .collect()
    }

    fn mesh_file(&self, segment: usize) -> Option<PathBuf> {
        let path = self.segments.get(segment)?.mesh_file.as_ref()?;
        Some(std::path::absolute(path).unwrap_or_else(|_| path.clone()))
    }

    fn mesh_vertices(&self, segment: usize) -> Vec<glm::DVec3> {
        self.segments
            .get(segment)
            .map(|s| s.mesh.clone())
            .unwrap_or_default()
    }

    fn mesh_color(&self, segment: usize) -> Option<[f64; 3]> {
        self.segments.get(segment)?.mesh_color
    }

    fn mesh_placement(&self, segment: usize) -> glm::DMat4 {
        self.segments.get(segment).map_or_else(glm::DMat4::identity, |s| {
            s.mesh_rt * glm::scaling(&s.mesh_scale)
        })
    }

    fn segment_homogeneous_matrix_in_global(
        &self,
        q: &[f64],
        segment: usize,
    ) -> Result<glm::DMat4, BioError> {
        if segment >= self.segments.len() {
            return Err(BioError::index_out_of_range("segment", segment, self.segments.len()));
        }
        Ok(self.all_segment_matrices_in_global(q)?[segment])
    }

    fn all_segment_matrices_in_global(&self, q: &[f64]) -> Result<Vec<glm::DMat4>, BioError> {
        self.check_q(q)?;
        Ok(global_transforms(&self.segments, q))
    }

    fn markers(&self, q: &[f64]) -> Result<Vec<glm::DVec3>, BioError> {
        let globals = self.all_segment_matrices_in_global(q)?;
        Ok(self
            .markers
            .iter()
            .map(|m| transform_point(&globals[m.parent], &m.position))
            .collect())
    }

    fn center_of_mass(&self, q: &[f64]) -> Result<glm::DVec3, BioError> {
        let total = self.total_mass();
        if total <= 0.0 {
            return Err(BioError::new("massless-model").with_arg("model", &self.name));
        }
        let globals = self.all_segment_matrices_in_global(q)?;
        let weighted = self
            .segments
            .iter()
            .zip(&globals)
            .fold(glm::DVec3::zeros(), |acc, (s, g)| {
                acc + transform_point(g, &s.com) * s.mass
            });
        Ok(weighted / total)
    }
}

#[derive(Debug, Clone)]
struct Token {
    line: usize,
    text: String,
}

struct Tokens {
    items: Vec<Token>,
    pos: usize,
    variables: HashMap<String, f64>,
}

impl Tokens {
    fn new(text: &str) -> Self {
        let items = strip_comments(text)
            .into_iter()
            .flat_map(|(line, content)| {
                content
                    .split_whitespace()
                    .map(|w| Token {
                        line,
                        text: w.to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        Self {
            items,
            pos: 0,
            variables: HashMap::new(),
        }
    }

    fn line(&self) -> usize {
        self.items
            .get(self.pos)
            .or(self.items.last())
            .map_or(0, |t| t.line)
    }

    fn peek(&self) -> Option<&str> {
        self.items.get(self.pos).map(|t| t.text.as_str())
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.items.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn word(&mut self, what: &str) -> Result<Token, BioError> {
        let line = self.line();
        self.next()
            .ok_or_else(|| BioError::biomod_syntax(line, format!("expected {what}, found end of file")))
    }

    fn number(&mut self) -> Result<f64, BioError> {
        let token = self.word("a number")?;
        if token.text.starts_with('$') {
            return self
                .variables
                .get(&token.text.to_ascii_lowercase())
                .copied()
                .ok_or_else(|| BioError::unknown_name("variable", &token.text));
        }
        parse_number(&token.text).ok_or_else(|| {
            BioError::biomod_syntax(token.line, format!("'{}' is not a number", token.text))
        })
    }

    fn numbers<const N: usize>(&mut self) -> Result<[f64; N], BioError> {
        let mut out = [0.0; N];
        for v in out.iter_mut() {
            *v = self.number()?;
        }
        Ok(out)
    }

    fn vec3(&mut self) -> Result<glm::DVec3, BioError> {
        let [x, y, z] = self.numbers::<3>()?;
        Ok(glm::vec3(x, y, z))
    }

    fn flag(&mut self) -> Result<bool, BioError> {
        Ok(self.number()? != 0.0)
    }

    fn axes(&mut self) -> Result<Vec<Axis>, BioError> {
        let token = self.word("an axis sequence")?;
        Axis::parse_sequence(&token.text).ok_or_else(|| {
            BioError::biomod_syntax(token.line, format!("'{}' is not an axis sequence", token.text))
        })
    }

    /// `rx ry rz seq tx ty tz`
    fn euler_rt(&mut self) -> Result<glm::DMat4, BioError> {
        let angles = self.numbers::<3>()?;
        let sequence = self.axes()?;
        if sequence.len() != 3 {
            return Err(BioError::biomod_syntax(self.line(), "Euler sequences need three axes"));
        }
        let translation = self.vec3()?;
        Ok(euler_transform(&angles, &sequence, translation))
    }

    fn ranges(&mut self, nb_q: usize) -> Result<Vec<[f64; 2]>, BioError> {
        (0..nb_q).map(|_| self.numbers::<2>()).collect()
    }
}

struct Parser {
    tokens: Tokens,
    base_dir: Option<PathBuf>,
    model: BiomodModel,
}

impl Parser {
    fn run(&mut self) -> Result<(), BioError> {
        while let Some(token) = self.tokens.next() {
            match token.text.to_ascii_lowercase().as_str() {
                "version" => self.model.version = self.tokens.number()? as u32,
                "gravity" => self.model.gravity = self.tokens.vec3()?,
                "root_actuated" | "external_forces" => {
                    let value = self.tokens.flag()?;
                    log::debug!("bioMod line {}: {} {}", token.line, token.text, value);
                }
                "variables" => self.variables()?,
                "segment" => {
                    let name = self.tokens.word("a segment name")?.text;
                    self.segment(name)?;
                }
                "marker" => {
                    let name = self.tokens.word("a marker name")?.text;
                    self.marker(name)?;
                }
                other => self.skip_block(other, token.line)?,
            }
        }
        Ok(())
    }

    fn segment(&mut self, name: String) -> Result<(), BioError> {
        let mut segment = Segment::new(name);
        let mut rt_in_matrix = self.model.version < 3;

        loop {
            let token = self.tokens.word("endsegment")?;
            match token.text.to_ascii_lowercase().as_str() {
                "endsegment" => break,
                "parent" => {
                    let parent = self.tokens.word("a parent name")?.text;
                    segment.parent = self.resolve_parent(&parent)?;
                }
                "rtinmatrix" => rt_in_matrix = self.tokens.flag()?,
                "rt" => {
                    segment.rt = if rt_in_matrix {
                        glm::DMat4::from_row_slice(&self.tokens.numbers::<16>()?)
                    } else {
                        self.tokens.euler_rt()?
                    };
                }
                "translations" => segment.translations = self.tokens.axes()?,
                "rotations" => segment.rotations = self.tokens.axes()?,
                "mass" => segment.mass = self.tokens.number()?,
                "com" => segment.com = self.tokens.vec3()?,
                "inertia" => {
                    segment.inertia = glm::DMat3::from_row_slice(&self.tokens.numbers::<9>()?)
                }
                "meshfile" => {
                    let file = self.tokens.word("a mesh file")?.text;
                    segment.mesh_file = Some(match &self.base_dir {
                        Some(dir) => dir.join(file),
                        None => PathBuf::from(file),
                    });
                }
                "mesh" => {
                    let vertex = self.tokens.vec3()?;
                    segment.mesh.push(vertex);
                }
                "meshcolor" => segment.mesh_color = Some(self.tokens.numbers::<3>()?),
                "meshscale" => segment.mesh_scale = self.tokens.vec3()?,
                "meshrt" => segment.mesh_rt = self.tokens.euler_rt()?,
                "rangesq" | "ranges" => segment.ranges_q = self.tokens.ranges(segment.nb_q())?,
                "rangesqdot" => segment.ranges_qdot = self.tokens.ranges(segment.nb_q())?,
                "rangesqddot" => {
                    self.tokens.ranges(segment.nb_q())?;
                }
                other => {
                    log::warn!(
                        "bioMod line {}: ignoring '{}' in segment {}",
                        token.line,
                        other,
                        segment.name
                    );
                    while let Some(next) = self.tokens.peek() {
                        if SEGMENT_KEYWORDS.contains(&next.to_ascii_lowercase().as_str()) {
                            break;
                        }
                        self.tokens.next();
                    }
                }
            }
        }

        if self.model.segment_index(&segment.name).is_some() {
            return Err(BioError::biomod_syntax(
                self.tokens.line(),
                format!("segment '{}' is defined twice", segment.name),
            ));
        }
        segment.first_q = self.model.nb_q;
        self.model.nb_q += segment.nb_q();
        self.model.segments.push(segment);
        Ok(())
    }

    fn resolve_parent(&self, name: &str) -> Result<Option<usize>, BioError> {
        match self.model.segment_index(name) {
            Some(index) => Ok(Some(index)),
            None if name.eq_ignore_ascii_case("root") => Ok(None),
            None => Err(BioError::unknown_name("segment", name)),
        }
    }

    fn marker(&mut self, name: String) -> Result<(), BioError> {
        let start_line = self.tokens.line();
        let mut parent = None;
        let mut position = glm::DVec3::zeros();
        let mut technical = true;
        let mut anatomical = false;

        loop {
            let token = self.tokens.word("endmarker")?;
            match token.text.to_ascii_lowercase().as_str() {
                "endmarker" => break,
                "parent" => {
                    let segment = self.tokens.word("a parent name")?.text;
                    parent = self.resolve_parent(&segment)?;
                }
                "position" => position = self.tokens.vec3()?,
                "technical" => technical = self.tokens.flag()?,
                "anatomical" => anatomical = self.tokens.flag()?,
                "axestoremove" => {
                    self.tokens.word("axes")?;
                }
                other => {
                    return Err(BioError::biomod_syntax(
                        token.line,
                        format!("unexpected '{other}' in marker {name}"),
                    ));
                }
            }
        }

        let parent = parent.ok_or_else(|| {
            BioError::biomod_syntax(start_line, format!("marker '{name}' has no parent segment"))
        })?;
        self.model.markers.push(MarkerDef {
            name,
            parent,
            position,
            technical,
            anatomical,
        });
        Ok(())
    }

    /// `$name value` pairs up to `endvariables`; later numbers may use `$name`.
    fn variables(&mut self) -> Result<(), BioError> {
        loop {
            let token = self.tokens.word("endvariables")?;
            if token.text.eq_ignore_ascii_case("endvariables") {
                return Ok(());
            }
            if !token.text.starts_with('$') {
                return Err(BioError::biomod_syntax(
                    token.line,
                    format!("variable names start with '$', found '{}'", token.text),
                ));
            }
            let value = self.tokens.number()?;
            self.tokens.variables.insert(token.text.to_ascii_lowercase(), value);
        }
    }

    /// Skip `<keyword> … end<keyword>`.
    fn skip_block(&mut self, keyword: &str, line: usize) -> Result<(), BioError> {
        let end = format!("end{keyword}");
        log::debug!("bioMod line {line}: skipping '{keyword}' block");
        while let Some(token) = self.tokens.next() {
            if token.text.eq_ignore_ascii_case(&end) {
                return Ok(());
            }
        }
        Err(BioError::biomod_syntax(
            line,
            format!("'{keyword}' is not a known block or is missing '{end}'"),
        ))
    }
}

/// File name up to its first dot: `arm.v2.bioMod` is the model `arm`.
fn model_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy())
        .and_then(|s| s.split('.').next().map(str::to_string))
        .unwrap_or_default()
}

/// Remove `//` and `/* */` comments, keeping 1-based line numbers.
fn strip_comments(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut in_block = false;
    for (i, line) in text.lines().enumerate() {
        let mut rest = line;
        let mut kept = String::new();
        loop {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        rest = &rest[end + 2..];
                        in_block = false;
                    }
                    None => break,
                }
            } else {
                let line_comment = rest.find("//");
                let block_comment = rest
                    .find("/*")
                    .filter(|&b| line_comment.is_none_or(|l| b < l));
                match block_comment {
                    Some(b) => {
                        kept.push_str(&rest[..b]);
                        kept.push(' ');
                        rest = &rest[b + 2..];
                        in_block = true;
                    }
                    None => {
                        kept.push_str(&rest[..line_comment.unwrap_or(rest.len())]);
                        break;
                    }
                }
            }
        }
        out.push((i + 1, kept));
    }
    out
}

/// Plain numbers plus the `pi`, `-pi/2`, `2*pi` forms found in hand-written models.
fn parse_number(s: &str) -> Option<f64> {
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s),
    };
    let lower = body.to_ascii_lowercase();
    let value = if let Some(divisor) = lower.strip_prefix("pi/") {
        std::f64::consts::PI / divisor.parse::<f64>().ok()?
    } else if let Some(factor) = lower.strip_suffix("*pi") {
        factor.parse::<f64>().ok()? * std::f64::consts::PI
    } else if lower == "pi" {
        std::f64::consts::PI
    } else {
        return None;
    };
    Some(sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const DOUBLE_PENDULUM: &str = r#"
version 4

// Cart holding the first arm
segment Seg1
    translations y
    rotations x
    rangesQ -1 1
            -pi pi
    mass 1
    com 0 0 -0.5
    inertia 1 0 0
            0 1 0
            0 0 1
    meshfile mesh/arm.stl
endsegment

    marker marker_1
        parent Seg1
        position 0 0 -1
    endmarker

/* Second arm,
   hanging from the first */
segment Seg2
    parent Seg1
    rtinmatrix 0
    rt 0 0 0 xyz 0 0 -1
    rotations x
    mass 1
    com 0 0 -0.5
endsegment

    marker marker_2
        parent Seg2
        position 0 0 -1
        technical 1
        anatomical 1
    endmarker

musclegroup unused
    OriginParent Seg1
    InsertionParent Seg2
endmusclegroup
"#;

    fn pendulum() -> BiomodModel {
        BiomodModel::parse("double_pendulum", DOUBLE_PENDULUM).unwrap()
    }

    #[test]
    fn reads_segments_markers_and_dofs() {
        let model = pendulum();
        assert_eq!(model.name(), "double_pendulum");
        assert_eq!(model.nb_q(), 3);
        assert_eq!(model.segment_names(), vec!["Seg1", "Seg2"]);
        assert_eq!(model.marker_names(), vec!["marker_1", "marker_2"]);
        assert_eq!(model.segments()[1].parent, Some(0));
        assert_eq!(model.segments()[1].first_q, 2);
        assert_relative_eq!(model.segments()[0].ranges_q[1][0], -std::f64::consts::PI);
        assert!(model.marker_defs()[1].anatomical);
        assert_eq!(model.segments_with_mesh(), vec![0]);
        assert!(model.mesh_paths()[0].ends_with("mesh/arm.stl"));
    }

    #[test]
    fn bundled_demo_model_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/double_pendulum.bioMod");
        let model = BiomodModel::from_path(path).unwrap();
        assert_eq!(model.name(), "double_pendulum");
        assert_eq!(model.nb_q(), 3);
        assert_eq!(model.nb_markers(), 4);
        assert!(model.path().is_some());
    }

    #[test]
    fn marker_names_are_stable() {
        let model = pendulum();
        assert_eq!(model.marker_names(), model.marker_names());
    }

    #[test]
    fn neutral_pose_hangs_straight_down() {
        let model = pendulum();
        let markers = model.markers(&[0.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(markers[0], glm::vec3(0.0, 0.0, -1.0), epsilon = 1e-12);
        assert_relative_eq!(markers[1], glm::vec3(0.0, 0.0, -2.0), epsilon = 1e-12);
        let com = model.center_of_mass(&[0.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(com, glm::vec3(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn pendulum_forward_kinematics() {
        let model = pendulum();
        // Cart moved by 0.5, first arm horizontal, second arm folded back down.
        let q = [0.5, FRAC_PI_2, -FRAC_PI_2];
        let markers = model.markers(&q).unwrap();
        assert_relative_eq!(markers[0], glm::vec3(0.0, 1.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(markers[1], glm::vec3(0.0, 1.5, -1.0), epsilon = 1e-12);

        let com = model.center_of_mass(&q).unwrap();
        assert_relative_eq!(com, glm::vec3(0.0, 1.25, -0.25), epsilon = 1e-12);

        let g = model.segment_homogeneous_matrix_in_global(&q, 1).unwrap();
        assert_relative_eq!(g[(1, 3)], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn wrong_q_size_is_rejected() {
        let err = pendulum().markers(&[0.0]).unwrap_err();
        assert_eq!(err.key, "q-size-mismatch");
    }

    #[test]
    fn out_of_range_segment_is_rejected() {
        let err = pendulum()
            .segment_homogeneous_matrix_in_global(&[0.0; 3], 7)
            .unwrap_err();
        assert_eq!(err.key, "index-out-of-range");
    }

    #[test]
    fn massless_model_has_no_center_of_mass() {
        let model = BiomodModel::parse("m", "segment a rotations x endsegment").unwrap();
        assert_eq!(model.center_of_mass(&[0.0]).unwrap_err().key, "massless-model");
    }

    #[test]
    fn matrix_rt_is_row_major() {
        let text = "version 3 segment a rtinmatrix 1 rt 1 0 0 0.1 0 1 0 0.2 0 0 1 0.3 0 0 0 1 endsegment";
        let model = BiomodModel::parse("m", text).unwrap();
        assert_relative_eq!(model.segments()[0].rt[(0, 3)], 0.1);
        assert_relative_eq!(model.segments()[0].rt[(2, 3)], 0.3);
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let err = BiomodModel::parse("m", "segment a parent nowhere endsegment").unwrap_err();
        assert_eq!(err.key, "unknown-name");
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let err = BiomodModel::parse("m", "muscle m1 type hilldegroote").unwrap_err();
        assert_eq!(err.key, "biomod-syntax");
    }

    #[test]
    fn header_flags_are_single_values() {
        let text = "version 4\nroot_actuated 0\nexternal_forces 0\ngravity 0 0 -9.8\n\
                    segment a rotations x mass 1 endsegment";
        let model = BiomodModel::parse("m", text).unwrap();
        assert_eq!(model.segment_names(), vec!["a"]);
        assert_eq!(model.summary().gravity, [0.0, 0.0, -9.8]);
    }

    #[test]
    fn variables_are_substituted() {
        let text = "
            variables
                $len 0.4
                $Half_Pi pi/2
            endvariables
            segment a
                rtinmatrix 0
                rt $half_pi 0 0 xyz 0 0 $len
                rotations x
                mass 1
                com 0 0 $len
            endsegment
        ";
        let model = BiomodModel::parse("m", text).unwrap();
        assert_relative_eq!(model.segments()[0].com.z, 0.4);
        assert_relative_eq!(model.segments()[0].rt[(2, 3)], 0.4);
        assert_relative_eq!(model.segments()[0].rt[(2, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let err = BiomodModel::parse("m", "segment a com 0 0 $len endsegment").unwrap_err();
        assert_eq!(err.key, "unknown-name");
        assert_eq!(err.args["name"], "$len");
    }

    #[test]
    fn model_name_stops_at_first_dot() {
        assert_eq!(model_name(Path::new("models/arm.v2.bioMod")), "arm");
        assert_eq!(model_name(Path::new("double_pendulum.bioMod")), "double_pendulum");
    }

    #[test]
    fn load_errors_name_the_file() {
        let path = std::env::temp_dir().join(format!("biorerun_broken_{}.bioMod", std::process::id()));
        fs::write(&path, "segment a parent nowhere endsegment").unwrap();
        let err = BiomodModel::from_path(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert_eq!(err.key, "biomod-load");
        let source = std::error::Error::source(&err).map(|s| s.to_string()).unwrap();
        assert!(source.starts_with("unknown-name("));
    }

    #[test]
    fn comments_are_stripped() {
        let lines = strip_comments("a // b\nc /* d\ne */ f\ng // h /* i\nj /* k */ l // m");
        assert_eq!(lines[0].1.trim(), "a");
        assert_eq!(lines[1].1.trim(), "c");
        assert_eq!(lines[2].1.trim(), "f");
        assert_eq!(lines[3].1.trim(), "g");
        assert_eq!(lines[4].1.split_whitespace().collect::<Vec<_>>(), vec!["j", "l"]);
    }

    #[test]
    fn numbers_accept_pi_forms() {
        assert_relative_eq!(parse_number("-pi/2").unwrap(), -FRAC_PI_2);
        assert_relative_eq!(parse_number("2*pi").unwrap(), 2.0 * std::f64::consts::PI);
        assert_eq!(parse_number("1e-3"), Some(1e-3));
        assert_eq!(parse_number("abc"), None);
    }
}
