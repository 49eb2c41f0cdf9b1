//! CSV generator
//!
//! Rows are joined by `\n` and every row, including the last, is terminated.
//! A field is quoted exactly when it contains the delimiter, the quote
//! character or a line break, which is the inverse of the tokenizer's unquoting.

use crate::error::{CsvError, Result};
use crate::parser::{DELIMITER, QUOTE};

/// Whether `field` must be wrapped in quotes to survive a parse
#[inline]
pub fn needs_quotes(field: &str) -> bool {
    field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r')
}

/// Check that there is at least one record and all records share the first one's width.
///
/// Returns the common field count.
pub fn validate_shape<R, S>(records: &[R]) -> Result<usize>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let first = records.first().ok_or(CsvError::EmptyInput)?;
    let expected = first.as_ref().len();

    for (idx, record) in records.iter().enumerate().skip(1) {
        let actual = record.as_ref().len();
        if actual != expected {
            return Err(CsvError::FieldCountMismatch {
                line: idx + 1,
                expected,
                actual,
            });
        }
    }

    Ok(expected)
}

fn push_field(out: &mut String, field: &str) {
    if !needs_quotes(field) {
        out.push_str(field);
        return;
    }

    out.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
}

/// Serialize records to CSV text
///
/// Fails with `EmptyInput` for zero records and `FieldCountMismatch` for ragged ones;
/// nothing is produced in either case.
pub fn generate<R, S>(records: &[R]) -> Result<String>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    validate_shape(records)?;

    let estimate: usize = records
        .iter()
        .map(|r| r.as_ref().iter().map(|f| f.as_ref().len() + 1).sum::<usize>() + 1)
        .sum();
    let mut out = String::with_capacity(estimate);

    for record in records {
        for (idx, field) in record.as_ref().iter().enumerate() {
            if idx > 0 {
                out.push(DELIMITER);
            }
            push_field(&mut out, field.as_ref());
        }
        out.push('\n');
    }

    Ok(out)
}
