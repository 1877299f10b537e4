use std::{collections::BTreeMap, fmt, io, sync::Arc};

use crate::c3d::C3dError;

#[derive(Debug, Clone)]
pub struct BioError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<BioCause>,
}

#[derive(Debug, Clone)]
pub enum BioCause {
    Bio(Box<BioError>),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl BioError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_bio(mut self, cause: BioError) -> Self {
        self.causes.push(BioCause::Bio(Box::new(cause)));
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(BioCause::Std(Arc::new(cause)));
        self
    }

    /// Raised when a length label is none of mm, cm or m.
    pub fn unit_not_recognized(unit: &str) -> Self {
        BioError::new("unit-not-recognized")
            .with_arg("msg", "The unit of the c3d file is not in meters, mm or cm.")
            .with_arg("unit", unit)
    }

    pub fn frame_count_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        BioError::new("frame-count-mismatch")
            .with_arg("what", what)
            .with_arg("expected", expected)
            .with_arg("actual", actual)
    }

    pub fn q_size_mismatch(expected: usize, actual: usize) -> Self {
        BioError::new("q-size-mismatch")
            .with_arg("expected", expected)
            .with_arg("actual", actual)
    }

    pub fn biomod_syntax(line: usize, msg: impl ToString) -> Self {
        BioError::new("biomod-syntax")
            .with_arg("line", line)
            .with_arg("msg", msg)
    }

    pub fn unknown_name(kind: &'static str, name: &str) -> Self {
        BioError::new("unknown-name")
            .with_arg("kind", kind)
            .with_arg("name", name)
    }

    pub fn index_out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        BioError::new("index-out-of-range")
            .with_arg("what", what)
            .with_arg("index", index)
            .with_arg("len", len)
    }
}

impl fmt::Display for BioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for BioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            BioCause::Bio(e) => Some(e.as_ref() as &dyn std::error::Error),
            BioCause::Std(e) => Some(e.as_ref()),
        })
    }
}

impl From<io::Error> for BioError {
    fn from(err: io::Error) -> Self {
        BioError::new("io-error").push_std(err)
    }
}

impl From<C3dError> for BioError {
    fn from(err: C3dError) -> Self {
        BioError::new("c3d-error").push_std(err)
    }
}

impl From<rerun::RecordingStreamError> for BioError {
    fn from(err: rerun::RecordingStreamError) -> Self {
        BioError::new("rerun::RecordingStreamError").push_std(err)
    }
}
