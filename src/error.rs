use std::io;
use std::path::PathBuf;

/// Session-level failures. Per-frame anomalies never become one of these.
#[derive(Debug)]
pub enum QuizError {
    /// The frame source (camera or recorded stream) could not be opened.
    DeviceUnavailable { source: String, reason: String },
    /// The quiz file is missing or a block in it is malformed.
    QuizDefinition { path: PathBuf, reason: String },
    /// The quiz file parsed but held no questions.
    NoQuestions { path: PathBuf },
    /// The config file could not be read or parsed.
    Config { path: PathBuf, reason: String },
    Io(io::Error),
    Image(image::ImageError),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceUnavailable { source, reason } => {
                write!(f, "could not open frame source {source}: {reason}")
            }
            Self::QuizDefinition { path, reason } => {
                write!(f, "invalid quiz file {}: {reason}", path.display())
            }
            Self::NoQuestions { path } => {
                write!(f, "no questions found in {}", path.display())
            }
            Self::Config { path, reason } => {
                write!(f, "invalid config file {}: {reason}", path.display())
            }
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::Image(err) => write!(f, "image error: {err}"),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Image(err) => Some(err),
            Self::DeviceUnavailable { .. }
            | Self::QuizDefinition { .. }
            | Self::NoQuestions { .. }
            | Self::Config { .. } => None,
        }
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for QuizError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}
