use std::path::PathBuf;

use strum::Display;
use thiserror::Error;

use crate::point_parser::SyntaxError;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum PointKind {
    G1,
    G2,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Artifact file {} does not exist.", .0.display())]
    MissingFile(PathBuf),
    #[error("Failed to read artifact file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "Field {structure}.{field} contains no {kind} points; the artifact does not match the \
         expected proof system output format."
    )]
    NoMatches { structure: &'static str, field: &'static str, kind: PointKind },
    #[error("Field {structure}.{field}: {error}")]
    Syntax {
        structure: &'static str,
        field: &'static str,
        #[source]
        error: SyntaxError,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BatchSizeError {
    #[error("Batch size {0} is not a power of two.")]
    NotPowerOfTwo(u32),
    #[error("Batch size {size} exceeds the maximum of {max}.")]
    TooLarge { size: u32, max: u32 },
    #[error("Invalid batch size {0:?}.")]
    Unparsable(String),
}
