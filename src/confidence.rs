/*!
Reader for the line-delimited confidence record stream.

Each non-blank line is a JSON object carrying at least an `index` and an
`assignment` field. Any other fields (scores, ranks, ...) are ignored.
*/

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while reading confidence file '{}'", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred at line {} of the confidence stream", line))]
    ReadLine {
        line: usize,
        source: std::io::Error,
    },
    #[snafu(display("Line {} is not a confidence record: '{}'", line, text))]
    MalformedRecord {
        line: usize,
        text: String,
        source: serde_json::Error,
    },
    #[snafu(display("The confidence stream contains no records"))]
    EmptyInput,
}

/// One guess from the ranking model: variable `index` (0-based) should be set to `assignment`.
///
/// `assignment` must be present but is kept as a raw JSON value; anything
/// other than the integers 0 or 1 is skipped later by the phase builder,
/// not rejected by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfidenceRecord {
    pub index: usize,
    pub assignment: Value,
}

impl ConfidenceRecord {
    pub fn new(index: usize, assignment: impl Into<Value>) -> Self {
        ConfidenceRecord {
            index,
            assignment: assignment.into(),
        }
    }
}

/// Lazily parses records from a buffered reader.
/// Blank lines are skipped; the first malformed line yields an error.
pub fn records<R: BufRead>(reader: R) -> impl Iterator<Item = Result<ConfidenceRecord, Error>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_no = idx + 1;
            let line = match line.context(ReadLine { line: line_no }) {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }

            Some(
                serde_json::from_str::<ConfidenceRecord>(trimmed).context(MalformedRecord {
                    line: line_no,
                    text: trimmed,
                }),
            )
        })
}

/// Reads every record from `reader`, failing if none were found.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ConfidenceRecord>, Error> {
    let records = records(reader).collect::<Result<Vec<_>, _>>()?;
    ensure!(!records.is_empty(), EmptyInput);

    debug!("Read {} confidence records", records.len());
    Ok(records)
}

/// Reads every record from the file at `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<ConfidenceRecord>, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).context(Io {
        path: path.to_owned(),
    })?);

    read_records(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_fields_and_blank_lines() {
        let input = "{\"index\": 3, \"assignment\": 1, \"confidence\": 0.97}\n\n   \n{\"assignment\": 0, \"index\": 0}\n";
        let records = read_records(input.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![ConfidenceRecord::new(3, 1), ConfidenceRecord::new(0, 0)]
        );
    }

    #[test]
    fn out_of_range_assignment_is_still_a_record() {
        let records = read_records("{\"index\": 5, \"assignment\": 2}".as_bytes()).unwrap();
        assert_eq!(records, vec![ConfidenceRecord::new(5, 2)]);
    }

    #[test]
    fn non_integer_assignment_is_still_a_record() {
        let input = "{\"index\": 0, \"assignment\": 1}\n{\"index\": 1, \"assignment\": \"1\"}\n{\"index\": 2, \"assignment\": null}\n{\"index\": 3, \"assignment\": 1.5}\n";
        let records = read_records(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0], ConfidenceRecord::new(0, 1));
        assert_eq!(records[1], ConfidenceRecord::new(1, "1"));
        assert_eq!(records[2], ConfidenceRecord::new(2, Value::Null));
    }

    #[test]
    fn missing_assignment_aborts() {
        let result = read_records("{\"index\": 4}".as_bytes());
        assert!(matches!(result, Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn malformed_line_aborts() {
        let input = "{\"index\": 0, \"assignment\": 1}\nnot json\n";
        match read_records(input.as_bytes()) {
            Err(Error::MalformedRecord { line, text, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(text, "not json");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_index_aborts() {
        let result = read_records("{\"assignment\": 1}".as_bytes());
        assert!(matches!(result, Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn empty_stream() {
        let result = read_records("\n  \n".as_bytes());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn records_are_lazy() {
        let input = "{\"index\": 1, \"assignment\": 0}\n{broken";
        let mut iter = records(input.as_bytes());
        assert_eq!(iter.next().unwrap().unwrap(), ConfidenceRecord::new(1, 0));
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
