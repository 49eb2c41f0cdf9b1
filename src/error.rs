//! Error taxonomy shared by the parser, writer, chunker and file layer

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the CSV codec.
///
/// Structural irregularities such as ragged rows are not errors while reading.
/// The only hard parse failure is an unterminated quoted field.
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("Malformed input: quoted field opened on line {line} is never closed")]
    MalformedInput { line: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("CSV data is empty")]
    EmptyInput,

    #[error("Field count mismatch at line {line}: expected {expected} fields, got {actual} fields")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Parent directory does not exist: {}", .0.display())]
    ParentDirectoryMissing(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Payload-free discriminant of [`CsvError`], for callers that branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    InvalidArgument,
    EmptyInput,
    FieldCountMismatch,
    FileNotFound,
    NotAFile,
    ParentDirectoryMissing,
    PermissionDenied,
    Encoding,
    Io,
}

impl CsvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CsvError::MalformedInput { .. } => ErrorKind::MalformedInput,
            CsvError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CsvError::EmptyInput => ErrorKind::EmptyInput,
            CsvError::FieldCountMismatch { .. } => ErrorKind::FieldCountMismatch,
            CsvError::FileNotFound(_) => ErrorKind::FileNotFound,
            CsvError::NotAFile(_) => ErrorKind::NotAFile,
            CsvError::ParentDirectoryMissing(_) => ErrorKind::ParentDirectoryMissing,
            CsvError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            CsvError::Encoding(_) => ErrorKind::Encoding,
            CsvError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, CsvError>;
