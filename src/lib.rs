//! # rfccsv
//!
//! A CSV codec for the RFC 4180 dialect: comma delimiter, double-quote
//! quoting with doubled-quote escapes, and `\n`, `\r\n` or `\r` record
//! separators on input (`\n` on output).
//!
//! Parsing is permissive: ragged rows and stray text after a closing quote
//! are accepted. The only hard parse failure is a quoted field left open at
//! end of input. Backslash sequences such as `\n` are ordinary text.
//!
//! ```
//! let records = rfccsv::parse("a,b\n\"x, y\",z").unwrap();
//! assert_eq!(records, vec![vec!["a", "b"], vec!["x, y", "z"]]);
//!
//! let text = rfccsv::generate(&records).unwrap();
//! assert_eq!(text, "a,b\n\"x, y\",z\n");
//! ```

pub mod error;
pub mod io;
pub mod parser;
pub mod stream;
pub mod value;
pub mod writer;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use error::{CsvError, ErrorKind, Result};
pub use parser::{
    parse_csv, parse_rows, Document, ParseOptions, Record, Rows, Tokenizer, TypedDocument,
    TypedRecord,
};
pub use stream::Chunks;
pub use value::{infer, TypedValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RAW: ParseOptions = ParseOptions {
    trim: false,
    infer_types: false,
};
const TRIM: ParseOptions = ParseOptions {
    trim: true,
    infer_types: false,
};
const TYPED: ParseOptions = ParseOptions {
    trim: false,
    infer_types: true,
};
const TYPED_TRIM: ParseOptions = ParseOptions {
    trim: true,
    infer_types: true,
};

/// Parse CSV text into raw string records
pub fn parse(text: &str) -> Result<Document> {
    parser::parse_csv(text, &RAW)
}

/// Parse CSV text, trimming spaces and tabs around every field
pub fn parse_trim(text: &str) -> Result<Document> {
    parser::parse_csv(text, &TRIM)
}

/// Parse CSV text, classifying fields as integer, float or string
pub fn parse_typed(text: &str) -> Result<TypedDocument> {
    parser::parse_csv_typed(text, &TYPED)
}

/// Parse CSV text with trimming and type classification
pub fn parse_typed_trim(text: &str) -> Result<TypedDocument> {
    parser::parse_csv_typed(text, &TYPED_TRIM)
}

/// Parse CSV text under arbitrary options
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Rows> {
    parser::parse_rows(text, options)
}

/// Read a CSV file into raw string records
pub fn read(path: impl AsRef<Path>) -> Result<Document> {
    io::read_document(path, &RAW)
}

/// Read a CSV file, trimming every field
pub fn read_trim(path: impl AsRef<Path>) -> Result<Document> {
    io::read_document(path, &TRIM)
}

/// Read a CSV file, classifying every field
pub fn read_typed(path: impl AsRef<Path>) -> Result<TypedDocument> {
    io::read_typed_document(path, &TYPED)
}

/// Read a CSV file with trimming and type classification
pub fn read_typed_trim(path: impl AsRef<Path>) -> Result<TypedDocument> {
    io::read_typed_document(path, &TYPED_TRIM)
}

/// Read a CSV file under arbitrary options
pub fn read_with_options(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Rows> {
    io::read_file(path, options)
}

/// Write records to a file
///
/// Fails with `EmptyInput` or `FieldCountMismatch` before touching the file.
pub fn write<R, S>(path: impl AsRef<Path>, records: &[R]) -> Result<()>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    io::write_file(path, records)
}

/// Render records as CSV text
pub fn generate<R, S>(records: &[R]) -> Result<String>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    writer::generate(records)
}

/// Split CSV text into batches of at most `chunk_size` records
pub fn stream(text: &str, chunk_size: usize) -> Result<Chunks<&[u8]>> {
    stream::stream_str(text, chunk_size, false)
}

/// Like [`stream`], trimming every field
pub fn stream_trim(text: &str, chunk_size: usize) -> Result<Chunks<&[u8]>> {
    stream::stream_str(text, chunk_size, true)
}

/// Stream a CSV file in batches, reading it incrementally
///
/// Use [`Chunks::typed`] on the result for classified batches.
pub fn stream_file(
    path: impl AsRef<Path>,
    chunk_size: usize,
    trim: bool,
) -> Result<Chunks<BufReader<File>>> {
    io::open_chunks(path, chunk_size, trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_entry_points() {
        assert_eq!(
            parse("a,b,c\n1,2,3").unwrap(),
            vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]
        );
        assert_eq!(
            parse_trim(" a , b \n 1 , 2 ").unwrap(),
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
    }

    #[test]
    fn test_parse_typed_integers() {
        let rows = parse_typed("value\n123\n-456\n0").unwrap();
        assert_eq!(rows[0], vec![TypedValue::String("value".to_string())]);
        assert_eq!(rows[1], vec![TypedValue::Integer(123)]);
        assert_eq!(rows[2], vec![TypedValue::Integer(-456)]);
        assert_eq!(rows[3], vec![TypedValue::Integer(0)]);
    }

    #[test]
    fn test_parse_typed_floats() {
        let rows = parse_typed("value\n123.45\n-0.67\n1.23e-4").unwrap();
        let expected = [123.45, -0.67, 0.000123];
        for (row, want) in rows[1..].iter().zip(expected) {
            assert!(row[0].is_float());
            assert!((row[0].as_f64().unwrap() - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_typed_trim() {
        let rows = parse_typed_trim("  name  ,  age  \n  Alice  ,  25  ").unwrap();
        assert_eq!(rows[1][0], TypedValue::String("Alice".to_string()));
        assert_eq!(rows[1][1], TypedValue::Integer(25));

        let untrimmed = parse_typed("a\n 25 ").unwrap();
        assert_eq!(untrimmed[1][0], TypedValue::String(" 25 ".to_string()));
    }

    #[test]
    fn test_empty_field_is_empty_string_when_typed() {
        let rows = parse_typed("empty,\n,x").unwrap();
        assert_eq!(rows[0][1], TypedValue::String(String::new()));
        assert_eq!(rows[1][0], TypedValue::String(String::new()));
    }

    #[test]
    fn test_generate_errors() {
        let empty: Vec<Vec<String>> = Vec::new();
        assert_eq!(generate(&empty).unwrap_err().kind(), ErrorKind::EmptyInput);

        let ragged = vec![vec!["a", "b"], vec!["c", "d", "e"]];
        assert!(matches!(
            generate(&ragged),
            Err(CsvError::FieldCountMismatch {
                line: 2,
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_stream_scenario() {
        let chunks: Vec<Document> = stream("a,b\n1,2\n3,4\n5,6", 2)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            chunks,
            vec![
                vec![vec!["a", "b"], vec!["1", "2"]],
                vec![vec!["3", "4"], vec!["5", "6"]],
            ]
        );
    }

    #[test]
    fn test_parse_with_options() {
        let options = ParseOptions::new().with_trim(true).with_infer_types(true);
        let rows = parse_with_options(" 1 , x ", &options).unwrap();
        assert_eq!(
            rows,
            Rows::Typed(vec![vec![
                TypedValue::Integer(1),
                TypedValue::String("x".to_string())
            ]])
        );
    }
}
