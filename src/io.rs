//! File I/O for CSV documents
//!
//! Filesystem outcomes are translated into distinct error kinds so callers
//! can tell a missing file from a directory, a missing parent directory or
//! a permission problem.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use crate::error::{CsvError, Result};
use crate::parser::{parse_csv, parse_csv_typed, Document, ParseOptions, Rows, TypedDocument};
use crate::stream::{check_chunk_size, Chunks};
use crate::writer::generate;

/// Map a read-side I/O failure on `path`
pub fn map_read_error(err: io::Error, path: &Path) -> CsvError {
    match err.kind() {
        io::ErrorKind::NotFound => CsvError::FileNotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => CsvError::PermissionDenied(path.to_path_buf()),
        _ => CsvError::Io(err),
    }
}

/// Map a write-side I/O failure on `path`
pub fn map_write_error(err: io::Error, path: &Path) -> CsvError {
    match err.kind() {
        io::ErrorKind::NotFound => CsvError::ParentDirectoryMissing(parent_dir(path).to_path_buf()),
        io::ErrorKind::PermissionDenied => CsvError::PermissionDenied(path.to_path_buf()),
        _ => CsvError::Io(err),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Verify `path` names something readable that is not a directory
fn check_readable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| map_read_error(e, path))?;
    if metadata.is_dir() {
        return Err(CsvError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Load a whole file into memory as UTF-8 text
///
/// # Arguments
/// * `path` - Path to the file to load
///
/// # Returns
/// The file contents, or a `FileNotFound` / `NotAFile` / `PermissionDenied` /
/// `Encoding` error
pub fn load_corpus(path: &Path) -> Result<String> {
    check_readable(path)?;

    let bytes = fs::read(path).map_err(|e| map_read_error(e, path))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        CsvError::Encoding(format!(
            "{} is not valid UTF-8: {}",
            path.display(),
            e.utf8_error()
        ))
    })?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded csv file");
    Ok(text)
}

/// Read and parse a file into raw string records
pub fn read_document(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Document> {
    let text = load_corpus(path.as_ref())?;
    parse_csv(&text, options)
}

/// Read and parse a file, classifying every field
pub fn read_typed_document(path: impl AsRef<Path>, options: &ParseOptions) -> Result<TypedDocument> {
    let text = load_corpus(path.as_ref())?;
    parse_csv_typed(&text, options)
}

/// Read and parse a file honouring both option axes
pub fn read_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Rows> {
    if options.infer_types {
        read_typed_document(path, options).map(Rows::Typed)
    } else {
        read_document(path, options).map(Rows::Raw)
    }
}

/// Open a file for chunked reading
///
/// The file is read incrementally, one buffer at a time. Call
/// [`Chunks::typed`] on the result to classify fields.
pub fn open_chunks(
    path: impl AsRef<Path>,
    chunk_size: usize,
    trim: bool,
) -> Result<Chunks<BufReader<File>>> {
    let path = path.as_ref();
    check_chunk_size(chunk_size)?;
    check_readable(path)?;

    let file = File::open(path).map_err(|e| map_read_error(e, path))?;
    tracing::debug!(path = %path.display(), chunk_size, "streaming csv file");
    Chunks::new(BufReader::new(file), chunk_size, trim)
}

/// Serialize `records` and write them to `path`, replacing its contents
///
/// The whole document is validated and rendered before the filesystem is
/// touched, so a rejected write leaves any existing file unchanged.
pub fn write_file<R, S>(path: impl AsRef<Path>, records: &[R]) -> Result<()>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let text = generate(records)?;

    let parent = parent_dir(path);
    match fs::metadata(parent) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(CsvError::ParentDirectoryMissing(parent.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CsvError::ParentDirectoryMissing(parent.to_path_buf()))
        }
        Err(e) => return Err(map_write_error(e, parent)),
    }

    if path.is_dir() {
        return Err(CsvError::NotAFile(path.to_path_buf()));
    }

    fs::write(path, text.as_bytes()).map_err(|e| map_write_error(e, path))?;

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        bytes = text.len(),
        "wrote csv file"
    );
    Ok(())
}
