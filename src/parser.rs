//! CSV tokenizer for the fixed RFC 4180 dialect
//!
//! A single pass over the input characters drives a four-state machine.
//! The tokenizer is push-based: callers may feed the input in arbitrary
//! pieces and receive every completed record through a callback, which is
//! what lets the chunked reader in [`crate::stream`] work on bounded input.

use serde::Serialize;

use crate::error::{CsvError, Result};
use crate::value::{infer_record, TypedValue};

/// Field delimiter
pub const DELIMITER: char = ',';

/// Quote character; a doubled quote inside a quoted field is one literal quote
pub const QUOTE: char = '"';

pub type Record = Vec<String>;
pub type Document = Vec<Record>;
pub type TypedRecord = Vec<TypedValue>;
pub type TypedDocument = Vec<TypedRecord>;

/// Parse configuration, resolved before a parse begins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Strip leading/trailing ASCII spaces and tabs around every field
    pub trim: bool,
    /// Classify each field as integer, float or string
    pub infer_types: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_infer_types(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

/// Output of [`parse_rows`]: raw strings, or typed values when `infer_types` is set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rows {
    Raw(Document),
    Typed(TypedDocument),
}

impl Rows {
    pub fn len(&self) -> usize {
        match self {
            Rows::Raw(records) => records.len(),
            Rows::Typed(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    InUnquotedField,
    InQuotedField,
    QuoteSeenInQuotedField,
}

#[inline(always)]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Incremental tokenizer state
///
/// Feed text with [`Tokenizer::feed`], then call [`Tokenizer::finish`] once
/// at end of input to flush the last record.
#[derive(Debug)]
pub struct Tokenizer {
    trim: bool,
    state: State,
    field: String,
    /// Length of `field` at the point its closing quote was consumed.
    quoted_len: Option<usize>,
    record: Record,
    /// Any character consumed since the last record boundary.
    started: bool,
    /// Previous character was a record-terminating `\r`.
    skip_lf: bool,
    after_cr: bool,
    line: usize,
    quote_line: usize,
}

impl Tokenizer {
    pub fn new(trim: bool) -> Self {
        Self {
            trim,
            state: State::FieldStart,
            field: String::new(),
            quoted_len: None,
            record: Vec::new(),
            started: false,
            skip_lf: false,
            after_cr: false,
            line: 1,
            quote_line: 1,
        }
    }

    /// Physical line (1-indexed) the tokenizer is currently on
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consume `input`, handing every completed record to `emit`
    pub fn feed<F: FnMut(Record)>(&mut self, input: &str, mut emit: F) {
        for c in input.chars() {
            let after_cr = std::mem::replace(&mut self.after_cr, c == '\r');
            let skip_lf = std::mem::take(&mut self.skip_lf);

            if c == '\n' && after_cr {
                // second half of CRLF
                if skip_lf {
                    continue;
                }
            } else if c == '\n' || c == '\r' {
                self.line += 1;
            }

            self.step(c, &mut emit);
        }
    }

    /// Signal end of input. Returns the trailing record, if any.
    ///
    /// Fails only when a quoted field is still open.
    pub fn finish(&mut self) -> Result<Option<Record>> {
        self.skip_lf = false;
        self.after_cr = false;

        match self.state {
            State::InQuotedField => {
                let line = self.quote_line;
                self.reset();
                Err(CsvError::MalformedInput { line })
            }
            _ if !self.started => Ok(None),
            State::QuoteSeenInQuotedField => {
                self.close_quote();
                Ok(Some(self.end_record()))
            }
            State::FieldStart | State::InUnquotedField => Ok(Some(self.end_record())),
        }
    }

    fn reset(&mut self) {
        self.state = State::FieldStart;
        self.field.clear();
        self.quoted_len = None;
        self.record.clear();
        self.started = false;
    }

    #[inline(always)]
    fn step<F: FnMut(Record)>(&mut self, c: char, emit: &mut F) {
        self.started = true;

        match self.state {
            State::FieldStart => match c {
                QUOTE => {
                    self.state = State::InQuotedField;
                    self.quote_line = self.line;
                }
                DELIMITER => self.end_field(),
                '\n' | '\r' => self.terminate(c, emit),
                c if self.trim && is_blank(c) => {}
                c => {
                    self.field.push(c);
                    self.state = State::InUnquotedField;
                }
            },
            State::InUnquotedField => match c {
                DELIMITER => self.end_field(),
                '\n' | '\r' => self.terminate(c, emit),
                c => self.field.push(c),
            },
            State::InQuotedField => match c {
                QUOTE => self.state = State::QuoteSeenInQuotedField,
                c => self.field.push(c),
            },
            State::QuoteSeenInQuotedField => match c {
                QUOTE => {
                    self.field.push(QUOTE);
                    self.state = State::InQuotedField;
                }
                DELIMITER => {
                    self.close_quote();
                    self.end_field();
                }
                '\n' | '\r' => {
                    self.close_quote();
                    self.terminate(c, emit);
                }
                c => {
                    self.close_quote();
                    if !(self.trim && is_blank(c)) {
                        tracing::warn!(
                            line = self.line,
                            "text after closing quote kept as part of the field"
                        );
                    }
                    self.field.push(c);
                    self.state = State::InUnquotedField;
                }
            },
        }
    }

    #[inline(always)]
    fn close_quote(&mut self) {
        self.quoted_len = Some(self.field.len());
    }

    fn end_field(&mut self) {
        let raw = std::mem::take(&mut self.field);
        let quoted_len = self.quoted_len.take();
        let value = if self.trim {
            trim_field(raw, quoted_len)
        } else {
            raw
        };
        self.record.push(value);
        self.state = State::FieldStart;
    }

    fn end_record(&mut self) -> Record {
        self.end_field();
        self.started = false;
        std::mem::take(&mut self.record)
    }

    fn terminate<F: FnMut(Record)>(&mut self, terminator: char, emit: &mut F) {
        let record = self.end_record();
        self.skip_lf = terminator == '\r';
        emit(record);
    }
}

/// Strip boundary blanks. The interior of a quoted field is kept verbatim;
/// blanks before the opening quote never reach the buffer, so only the end
/// of the text after the closing quote is trimmed.
fn trim_field(raw: String, quoted_len: Option<usize>) -> String {
    match quoted_len {
        Some(len) => {
            let (interior, tail) = raw.split_at(len);
            let tail = tail.trim_end_matches(is_blank);
            let mut value = String::with_capacity(len + tail.len());
            value.push_str(interior);
            value.push_str(tail);
            value
        }
        None => {
            let trimmed = raw.trim_matches(is_blank);
            if trimmed.len() == raw.len() {
                raw
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// Parse CSV text into records of raw strings
pub fn parse_csv(input: &str, options: &ParseOptions) -> Result<Document> {
    let mut records = Vec::new();
    let mut tokenizer = Tokenizer::new(options.trim);

    tokenizer.feed(input, |record| records.push(record));
    if let Some(record) = tokenizer.finish()? {
        records.push(record);
    }

    Ok(records)
}

/// Parse CSV text and classify every field
pub fn parse_csv_typed(input: &str, options: &ParseOptions) -> Result<TypedDocument> {
    let records = parse_csv(input, options)?;
    Ok(records.into_iter().map(infer_record).collect())
}

/// Parse CSV text honouring both option axes
pub fn parse_rows(input: &str, options: &ParseOptions) -> Result<Rows> {
    if options.infer_types {
        parse_csv_typed(input, options).map(Rows::Typed)
    } else {
        parse_csv(input, options).map(Rows::Raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn raw(input: &str) -> Document {
        parse_csv(input, &ParseOptions::default()).unwrap()
    }

    fn trimmed(input: &str) -> Document {
        parse_csv(input, &ParseOptions::new().with_trim(true)).unwrap()
    }

    #[test]
    fn test_parse_simple_csv() {
        assert_eq!(
            raw("a,b,c\n1,2,3"),
            vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]
        );
    }

    #[test]
    fn test_parse_quoted_csv() {
        assert_eq!(
            raw("name,description\n\"John Doe\",\"Software Engineer\""),
            vec![
                vec!["name", "description"],
                vec!["John Doe", "Software Engineer"]
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(raw("").is_empty());
    }

    #[test]
    fn test_trailing_newline_adds_no_record() {
        assert_eq!(raw("a,b\n1,2\n"), vec![vec!["a", "b"], vec!["1", "2"]]);
        assert_eq!(raw("a,b\r\n1,2\r\n"), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_record_terminators() {
        let expected = vec![vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]];
        assert_eq!(raw("a,b\nc,d\ne,f"), expected);
        assert_eq!(raw("a,b\r\nc,d\r\ne,f"), expected);
        assert_eq!(raw("a,b\rc,d\re,f"), expected);
        assert_eq!(raw("a,b\r\nc,d\re,f\n"), expected);
    }

    #[test]
    fn test_blank_lines_are_single_empty_fields() {
        assert_eq!(raw("\n"), vec![vec![""]]);
        assert_eq!(raw("a\n\nb"), vec![vec!["a"], vec![""], vec!["b"]]);
        assert_eq!(raw("a\r\n\r\nb"), vec![vec!["a"], vec![""], vec!["b"]]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(raw(",,"), vec![vec!["", "", ""]]);
        assert_eq!(raw("a,\n,b"), vec![vec!["a", ""], vec!["", "b"]]);
        assert_eq!(raw("\"\",x"), vec![vec!["", "x"]]);
    }

    #[test]
    fn test_ragged_rows_are_not_errors() {
        assert_eq!(
            raw("a,b,c\n1\n2,3"),
            vec![vec!["a", "b", "c"], vec!["1"], vec!["2", "3"]]
        );
    }

    #[test]
    fn test_quoted_delimiters_and_newlines() {
        assert_eq!(
            raw("\"a,b\",\"line1\nline2\",\"cr\r\nlf\"\nz"),
            vec![vec!["a,b", "line1\nline2", "cr\r\nlf"], vec!["z"]]
        );
    }

    #[test]
    fn test_doubled_quote_escape() {
        assert_eq!(
            raw("\"say \"\"hi\"\"\",\"\"\"\"\n"),
            vec![vec!["say \"hi\"", "\""]]
        );
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(raw("ab\"c,d"), vec![vec!["ab\"c", "d"]]);
        assert_eq!(raw(" \"a\",b"), vec![vec![" \"a\"", "b"]]);
    }

    #[test]
    fn test_text_after_closing_quote_is_kept() {
        assert_eq!(raw("\"ab\"cd,e"), vec![vec!["abcd", "e"]]);
        assert_eq!(raw("\"ab\"c\"d\""), vec![vec!["abc\"d\""]]);
        assert_eq!(raw("\"a\" ,b"), vec![vec!["a ", "b"]]);
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let err = parse_csv("a,b\n1,\"open", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(matches!(err, CsvError::MalformedInput { line: 2 }));

        let err = parse_csv("\"", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CsvError::MalformedInput { line: 1 }));
    }

    #[test]
    fn test_malformed_line_counts_crlf_once() {
        let err = parse_csv("a\r\nb\r\n\"c\r\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CsvError::MalformedInput { line: 3 }));
    }

    #[test]
    fn test_backslash_n_is_literal_text() {
        assert_eq!(raw("a,b\\n1,2"), vec![vec!["a", "b\\n1", "2"]]);
        assert_eq!(raw("\"x\\ny\""), vec![vec!["x\\ny"]]);
    }

    #[test]
    fn test_unicode_fields() {
        assert_eq!(
            raw("名前,都市\n太郎,\"東京, 日本\"\n😀,é"),
            vec![
                vec!["名前", "都市"],
                vec!["太郎", "東京, 日本"],
                vec!["😀", "é"]
            ]
        );
    }

    #[test]
    fn test_trim_unquoted() {
        assert_eq!(
            trimmed(" a , b \n 1 , 2 "),
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
        assert_eq!(trimmed("\ta\t,\t"), vec![vec!["a", ""]]);
        assert_eq!(trimmed("a  b , c"), vec![vec!["a  b", "c"]]);
    }

    #[test]
    fn test_trim_disabled_keeps_whitespace() {
        assert_eq!(
            raw(" a , b \n 1 , 2 "),
            vec![vec![" a ", " b "], vec![" 1 ", " 2 "]]
        );
    }

    #[test]
    fn test_trim_around_quotes_keeps_interior() {
        assert_eq!(
            trimmed("  \" a, b \"  , c\n\"x\"\t"),
            vec![vec![" a, b ", "c"], vec!["x"]]
        );
    }

    #[test]
    fn test_trim_keeps_blanks_inside_text_after_quote() {
        assert_eq!(raw("\"a\" b "), vec![vec!["a b "]]);
        assert_eq!(trimmed("\"a\" b "), vec![vec!["a b"]]);
        assert_eq!(trimmed("\"a \" "), vec![vec!["a "]]);
        assert_eq!(trimmed(" \"a\"  b\tc\t,d"), vec![vec!["a  b\tc", "d"]]);
    }

    #[test]
    fn test_trim_only_strips_ascii_blanks() {
        assert_eq!(trimmed("\u{a0}a\u{a0}"), vec![vec!["\u{a0}a\u{a0}"]]);
    }

    #[test]
    fn test_feed_in_pieces_matches_whole_input() {
        let input = "a,\"b\r\nc\"\r\n\"d\"\"e\",f\rg,h\n";
        let whole = raw(input);

        for split in 0..=input.len() {
            if !input.is_char_boundary(split) {
                continue;
            }
            let mut records = Vec::new();
            let mut tokenizer = Tokenizer::new(false);
            tokenizer.feed(&input[..split], |r| records.push(r));
            tokenizer.feed(&input[split..], |r| records.push(r));
            if let Some(r) = tokenizer.finish().unwrap() {
                records.push(r);
            }
            assert_eq!(records, whole, "split at {}", split);
        }
    }

    #[test]
    fn test_parse_rows_honours_infer_types() {
        let rows = parse_rows("n\n1", &ParseOptions::default()).unwrap();
        assert_eq!(rows, Rows::Raw(vec![vec!["n".to_string()], vec!["1".to_string()]]));

        let rows = parse_rows("n\n1", &ParseOptions::new().with_infer_types(true)).unwrap();
        assert_eq!(
            rows,
            Rows::Typed(vec![
                vec![TypedValue::String("n".to_string())],
                vec![TypedValue::Integer(1)]
            ])
        );
        assert_eq!(rows.len(), 2);
    }
}
