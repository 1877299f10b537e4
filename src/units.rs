//! Length units found in motion files and their conversion to metres.

use serde::{Deserialize, Serialize};

use crate::error::BioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Millimeter,
    Centimeter,
    Meter,
}

impl Unit {
    /// Recognise a unit from a free-form label such as `"mm"` or `"m "`.
    ///
    /// The label only has to contain the unit symbol. Symbols are tried from
    /// the longest to the shortest so `"mm"` is never read as metres.
    pub fn from_label(label: &str) -> Result<Unit, BioError> {
        const LOOKUP: [(&str, Unit); 3] = [
            ("mm", Unit::Millimeter),
            ("cm", Unit::Centimeter),
            ("m", Unit::Meter),
        ];
        LOOKUP
            .iter()
            .find(|(symbol, _)| label.contains(symbol))
            .map(|(_, unit)| *unit)
            .ok_or_else(|| BioError::unit_not_recognized(label))
    }

    /// How many of this unit make one metre.
    pub fn conversion_factor(self) -> f64 {
        match self {
            Unit::Millimeter => 1000.0,
            Unit::Centimeter => 100.0,
            Unit::Meter => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
        }
    }
}

/// Divide every value by the unit's conversion factor, mutating the caller's buffer.
///
/// On an unknown label the buffer is left untouched.
pub fn to_meters_in_place(values: &mut [f64], unit: &str) -> Result<(), BioError> {
    let factor = Unit::from_label(unit)?.conversion_factor();
    values.iter_mut().for_each(|v| *v /= factor);
    Ok(())
}

/// Same as [`to_meters_in_place`] but returns a converted copy.
pub fn to_meters(values: &[f64], unit: &str) -> Result<Vec<f64>, BioError> {
    let factor = Unit::from_label(unit)?.conversion_factor();
    Ok(values.iter().map(|v| v / factor).collect())
}
