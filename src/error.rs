//! Error types for Ekman.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Only unrecoverable conditions surface as errors; invalid user choices are
//! logged and ignored by the control panes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Ekman operations.
pub type Result<T> = std::result::Result<T, EkmanError>;

/// Errors that can occur in Ekman.
#[derive(Debug, Error)]
pub enum EkmanError {
    /// The input handed to the dashboard cannot be explored.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failed to open a file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Variable not present in the dataset.
    #[error("Variable not found: {name}")]
    VariableNotFound { name: String },

    /// Dimension not present on an array.
    #[error("Dimension '{dim}' not found on '{array}'")]
    DimensionNotFound { array: String, dim: String },

    /// Array data does not match the declared dimensions.
    #[error("Shape mismatch for '{name}': {detail}")]
    ShapeMismatch { name: String, detail: String },

    /// Label or index selection failed.
    #[error("Selection error: {0}")]
    Selection(String),

    /// Failed to read NetCDF file.
    #[error("NetCDF error: {0}")]
    NetCDF(String),

    /// Malformed parameter text (initial parameters, CRS parameters).
    #[error("Invalid parameters: {0}")]
    Params(#[from] serde_json::Error),

    /// Unknown projection, CRS or projection parameter.
    #[error("Projection error: {0}")]
    Projection(String),

    /// The plot renderer rejected a request.
    #[error("Render error: {0}")]
    Render(String),

    /// Failed to access clipboard.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EkmanError {
    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create a VariableNotFound error.
    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound { name: name.into() }
    }

    /// Create a DimensionNotFound error.
    pub fn dimension_not_found(array: impl Into<String>, dim: impl Into<String>) -> Self {
        Self::DimensionNotFound {
            array: array.into(),
            dim: dim.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

impl From<netcdf::Error> for EkmanError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCDF(err.to_string())
    }
}
