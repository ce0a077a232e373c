//! Sketch parameters live in RON files. Anything left out of a file keeps
//! its default, so `()` is a valid (if dull) parameter file.
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::SketchError;

pub fn parse_params<T: DeserializeOwned>(text: &str) -> Result<T, SketchError> {
    ron::from_str(text).map_err(|e| SketchError::Params(e.to_string()))
}

/// Defaults when there is no file.
pub fn load_params<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, SketchError> {
    match path {
        Some(path) => {
            debug!("Loading parameters from {}", path.display());
            let text = std::fs::read_to_string(path)?;
            parse_params(&text)
        }
        None => Ok(T::default()),
    }
}

pub fn to_ron<T: Serialize>(params: &T) -> Result<String, SketchError> {
    ron::ser::to_string_pretty(params, PrettyConfig::default())
        .map_err(|e| SketchError::Params(e.to_string()))
}
