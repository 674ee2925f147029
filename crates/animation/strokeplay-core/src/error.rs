//! Error types for the stroke animator

use serde::{Deserialize, Serialize};

/// Error type for loading, measuring and configuring a stroke animation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StrokeError {
    /// The SVG resource could not be fetched
    #[error("Failed to load SVG from {path}: {reason}")]
    Fetch { path: String, reason: String },

    /// The markup has no `<svg>` root element
    #[error("No <svg> root element found in markup")]
    MissingSvgRoot,

    /// The SVG has not been laid out yet, so lengths cannot be measured
    #[error("SVG not rendered yet: {reason}")]
    NotLaidOut { reason: String },

    /// A drawable shape carries geometry that cannot be interpreted
    #[error("Invalid geometry on <{tag}>: {reason}")]
    InvalidGeometry { tag: String, reason: String },

    /// An attribute value could not be interpreted
    #[error("Invalid value for attribute '{name}': {value}")]
    InvalidAttribute { name: String, value: String },

    /// A bounded retry ran out of attempts
    #[error("Gave up after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl StrokeError {
    /// Shorthand for the layout-not-ready failure
    pub fn not_laid_out(reason: impl Into<String>) -> Self {
        Self::NotLaidOut {
            reason: reason.into(),
        }
    }

    /// Check whether trying the same operation again later can succeed
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotLaidOut { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::MissingSvgRoot | Self::InvalidGeometry { .. } => "markup",
            Self::NotLaidOut { .. } | Self::RetriesExhausted { .. } => "layout",
            Self::InvalidAttribute { .. } => "config",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for StrokeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
