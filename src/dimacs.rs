/*!
Line-level model of a DIMACS CNF file.

Only the problem line is interpreted; clause lines are carried verbatim.
*/

use std::{
    fmt::Display,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while reading CNF file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    HeaderNotFound,
}

/// Parsed problem line and where it sits in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// 0-based line number of the problem line.
    pub index: usize,
    pub num_variables: u64,
    pub num_clauses: u64,
}

impl Header {
    /// Problem line text without a line terminator.
    pub fn to_line(&self) -> String {
        format!("p cnf {} {}", self.num_variables, self.num_clauses)
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Parses a single line as a problem line, returning `(num_variables, num_clauses)`.
fn parse_problem_line(line: &str) -> Option<(u64, u64)> {
    let line = line.trim();
    if !line.starts_with("p cnf") {
        return None;
    }

    let splitted = line.split_whitespace().collect::<Vec<_>>();
    if splitted.len() < 4 {
        return None;
    }

    match (splitted[2].parse::<u64>(), splitted[3].parse::<u64>()) {
        (Ok(num_variables), Ok(num_clauses)) => Some((num_variables, num_clauses)),
        _ => {
            debug!("Skipping malformed problem line '{}'", line);
            None
        }
    }
}

/// Finds the first well-formed `p cnf` line. Comments and clauses before it are skipped.
pub fn parse_header<I, S>(lines: I) -> Result<Header, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .enumerate()
        .find_map(|(index, line)| {
            parse_problem_line(line.as_ref()).map(|(num_variables, num_clauses)| Header {
                index,
                num_variables,
                num_clauses,
            })
        })
        .context(HeaderNotFound)
}

/// A CNF file as an ordered list of lines, stored without terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CnfDocument {
    lines: Vec<String>,
}

impl CnfDocument {
    pub fn new(lines: Vec<String>) -> Self {
        CnfDocument { lines }
    }

    pub fn from_text(text: &str) -> Self {
        CnfDocument {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut text = String::new();
        File::open(path)
            .and_then(|file| BufReader::new(file).read_to_string(&mut text))
            .context(IoError {
                path: path.to_owned(),
            })?;

        Ok(CnfDocument::from_text(&text))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn header(&self) -> Result<Header, Error> {
        parse_header(&self.lines)
    }

    /// Copy of this document with the line at `header.index` replaced by `header`
    /// and `appended` lines added at the end.
    pub fn with_header_and_appended<I>(&self, header: &Header, appended: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut lines = self.lines.clone();
        lines[header.index] = header.to_line();
        lines.extend(appended);

        CnfDocument { lines }
    }
}

impl std::str::FromStr for CnfDocument {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CnfDocument::from_text(s))
    }
}

/// Every line is followed by `\n`, including the last.
impl Display for CnfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }

        Ok(())
    }
}
