//! Errors raised while decoding a C3D file.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum C3dError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Second header byte must be 0x50.
    #[error("not a C3D file: header key is {0:#04x}, expected 0x50")]
    BadHeaderKey(u8),

    #[error("unknown processor type {0} (expected 84, 85 or 86)")]
    UnknownProcessor(u8),

    #[error("invalid parameter data type {data_type} for {name}")]
    InvalidParameterType {
        /// Parameter name.
        name: String,
        /// Raw type byte.
        data_type: i8,
    },

    /// A parameter the reader cannot do without.
    #[error("missing parameter {group}:{parameter}")]
    MissingParameter {
        group: &'static str,
        parameter: &'static str,
    },

    #[error("inconsistent data: {0}")]
    InconsistentData(String),
}

impl C3dError {
    pub(crate) fn missing(group: &'static str, parameter: &'static str) -> Self {
        Self::MissingParameter { group, parameter }
    }
}
