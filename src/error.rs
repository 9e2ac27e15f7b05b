use std::{fmt, path::PathBuf};

/// Errors raised while constructing a single bucket.
///
/// Every variant is scoped to the bucket being built: the batch driver logs
/// it, records it in the summary, and moves on to the next bucket.
#[derive(Debug)]
pub enum ConstructError {
    /// A source file is missing or unreadable, or an output file could not be written.
    Io { path: PathBuf, source: std::io::Error },
    /// Malformed DEM header/data or polygon contour.
    Format { path: Option<PathBuf>, message: String },
    /// Input that cannot be triangulated (crossing constraints, bad coordinates).
    Geometry(String),
    /// Feature type name with no `AreaType` mapping.
    Config(String),
    /// The batch was cancelled before this bucket finished.
    Cancelled,
}

impl ConstructError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn format(path: Option<&std::path::Path>, message: impl Into<String>) -> Self {
        Self::Format { path: path.map(|p| p.to_path_buf()), message: message.into() }
    }

    /// Short category label used in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Format { .. } => "format",
            Self::Geometry(_) => "geometry",
            Self::Config(_) => "config",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::Format { path: Some(path), message } => write!(f, "format error in {}: {message}", path.display()),
            Self::Format { path: None, message } => write!(f, "format error: {message}"),
            Self::Geometry(message) => write!(f, "geometry error: {message}"),
            Self::Config(message) => write!(f, "config error: {message}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for ConstructError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T, E = ConstructError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = ConstructError::io("/tmp/missing.arr", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.to_string().contains("/tmp/missing.arr"));
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn format_without_path() {
        let err = ConstructError::format(None, "contour has 2 vertices");
        assert_eq!(err.to_string(), "format error: contour has 2 vertices");
    }
}
