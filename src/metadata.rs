// src/metadata.rs
use std::collections::HashMap;

use log::debug;

use crate::error::{Result, WaterError};
use crate::processing::reflectance::Calibration;

const REFLECTANCE_MULT: &str = "REFLECTANCE_MULT_BAND_";
const REFLECTANCE_ADD: &str = "REFLECTANCE_ADD_BAND_";

/// Parsed value of a `KEY = VALUE` metadata line
#[derive(Debug, Clone, PartialEq)]
pub enum MtlValue {
    Number(f64),
    Text(String),
}

/// Parse a single `KEY = VALUE` line. Lines without a separator (`END`,
/// blank lines) yield `None`.
pub fn parse_mtl_line(line: &str) -> Option<(String, MtlValue)> {
    let (key, value) = line.trim().split_once(" = ")?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() {
        return None;
    }

    let parsed = match value.parse::<f64>() {
        Ok(number) => MtlValue::Number(number),
        Err(_) => MtlValue::Text(value.trim_matches('"').to_string()),
    };
    Some((key.to_string(), parsed))
}

/// Scene metadata (Landsat MTL), numeric values kept apart from text values
#[derive(Debug, Clone, Default)]
pub struct MtlMetadata {
    pub numeric: HashMap<String, f64>,
    pub text: HashMap<String, String>,
}

impl MtlMetadata {
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut metadata = Self::default();
        for line in lines {
            match parse_mtl_line(line.as_ref()) {
                Some((key, MtlValue::Number(value))) => {
                    metadata.numeric.insert(key, value);
                }
                Some((key, MtlValue::Text(value))) => {
                    metadata.text.insert(key, value);
                }
                None => {}
            }
        }

        debug!(
            "Parsed metadata: {} numeric items, {} text items",
            metadata.numeric.len(),
            metadata.text.len()
        );
        metadata
    }

    pub fn get_f64(&self, key: &str) -> Result<f64> {
        self.numeric
            .get(key)
            .copied()
            .ok_or_else(|| WaterError::MissingMetadata(key.to_string()))
    }

    /// Reflectance rescaling coefficients for `band`
    pub fn calibration(&self, band: u8) -> Result<Calibration> {
        Ok(Calibration {
            mult: self.get_f64(&format!("{REFLECTANCE_MULT}{band}"))?,
            add: self.get_f64(&format!("{REFLECTANCE_ADD}{band}"))?,
        })
    }
}
