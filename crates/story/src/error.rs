//! Dataset load and parse errors.
//!
//! Two recovery classes exist. Transport and format failures (`Io`, `Http`,
//! `Csv`, `Json`) replace the chart area with a visible error message.
//! Structural gaps (`MissingColumns`, `Empty`) are logged as warnings and
//! leave the chart area blank. Individual malformed records never surface as
//! errors; they are dropped during the transform.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fetch failed for '{path}': {message}")]
    Http { path: String, message: String },

    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected columns not found (have: {available:?})")]
    MissingColumns { available: Vec<String> },

    #[error("no valid {what} after parsing")]
    Empty { what: &'static str },
}

impl LoadError {
    /// Whether this error should leave the chart blank (warning) instead of
    /// showing the error message.
    pub fn aborts_silently(&self) -> bool {
        matches!(
            self,
            LoadError::MissingColumns { .. } | LoadError::Empty { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors_abort_silently() {
        let missing = LoadError::MissingColumns {
            available: vec!["a".into()],
        };
        assert!(missing.aborts_silently());
        assert!(LoadError::Empty { what: "rows" }.aborts_silently());
    }

    #[test]
    fn test_transport_errors_are_visible() {
        let http = LoadError::Http {
            path: "data/x.csv".into(),
            message: "HTTP 404".into(),
        };
        assert!(!http.aborts_silently());
        assert_eq!(
            http.to_string(),
            "fetch failed for 'data/x.csv': HTTP 404"
        );

        let io = LoadError::Io {
            path: "x".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!io.aborts_silently());
    }
}
