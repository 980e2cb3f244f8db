/*!
File-to-file runs behind each command. Nothing is written until every input
has been read and validated.
*/

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    augment::{self, Options},
    confidence,
    dimacs::{self, CnfDocument, Header},
    output,
    phase::{self, PhaseArray, PhaseCounts, TopK},
    prelude::*,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to read confidence records"))]
    ReadRecords { source: confidence::Error },
    #[snafu(display("Failed to build the phase array"))]
    BuildPhases { source: phase::Error },
    #[snafu(display("Failed to read CNF"))]
    ReadCnf { source: dimacs::Error },
    #[snafu(display("I/O error occurred while reading '{}'", path.display()))]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to add unit clauses"))]
    Augment { source: augment::Error },
    #[snafu(display("Failed to parse phase file '{}'", path.display()))]
    ParsePhases { path: PathBuf, source: phase::Error },
    #[snafu(display(
        "Phase file has {} entries but the CNF declares {} variables",
        found,
        expected
    ))]
    LengthMismatch { expected: u64, found: usize },
    #[snafu(display("Failed to write output"))]
    WriteOutput { source: output::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSummary {
    pub entries: usize,
    pub stats: phase::BuildStats,
}

/// Reads confidence records from `input` and writes the phase hint line to `destination`.
pub fn generate_phases(
    input: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    topk: Option<TopK>,
) -> Result<PhaseSummary, Error> {
    let records = confidence::read_file(input).context(ReadRecords)?;
    let (phases, stats) = PhaseArray::build(&records, topk).context(BuildPhases)?;

    if stats.skipped > 0 {
        warn!("{} records had a non-binary assignment", stats.skipped);
    }

    output::write_atomically(destination, &phases.to_string()).context(WriteOutput)?;
    Ok(PhaseSummary {
        entries: phases.len(),
        stats,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AugmentSummary {
    pub header: Header,
    pub added: usize,
}

/// Appends the literals of the model at `assignment` to the CNF at `input` and writes `destination`.
pub fn augment_file(
    input: impl AsRef<Path>,
    assignment: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: Options,
) -> Result<AugmentSummary, Error> {
    let cnf = CnfDocument::from_file(input).context(ReadCnf)?;

    let assignment = assignment.as_ref();
    let model = fs::read_to_string(assignment).context(ReadInput { path: assignment })?;

    let augmented = augment::augment(&cnf, model.lines(), options).context(Augment)?;

    output::write_atomically(destination, &augmented.document.to_string()).context(WriteOutput)?;
    Ok(AugmentSummary {
        header: augmented.header,
        added: augmented.added,
    })
}

/// Parses a phase hint file and, if `cnf` is given, checks it covers exactly the declared variables.
pub fn check_phases(
    phases: impl AsRef<Path>,
    cnf: Option<&Path>,
) -> Result<PhaseCounts, Error> {
    let path = phases.as_ref();
    let text = fs::read_to_string(path).context(ReadInput { path })?;
    let phases = text
        .parse::<PhaseArray>()
        .context(ParsePhases { path })?;

    if let Some(cnf) = cnf {
        let header = CnfDocument::from_file(cnf)
            .and_then(|document| document.header())
            .context(ReadCnf)?;
        ensure!(
            phases.len() as u64 == header.num_variables,
            LengthMismatch {
                expected: header.num_variables,
                found: phases.len(),
            }
        );
    }

    Ok(phases.counts())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_input_leaves_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("conf.jsonl");
        let output = dir.path().join("phases.txt");
        fs::write(&input, "{\"index\": 0, \"assignment\": 1}\n{oops}\n").unwrap();
        fs::write(&output, "previous").unwrap();

        assert!(matches!(
            generate_phases(&input, &output, None),
            Err(Error::ReadRecords { .. })
        ));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }

    #[test]
    fn empty_confidence_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("conf.jsonl");
        fs::write(&input, "\n\n").unwrap();

        let result = generate_phases(&input, dir.path().join("out.txt"), None);
        assert!(matches!(
            result,
            Err(Error::ReadRecords {
                source: confidence::Error::EmptyInput
            })
        ));
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn missing_confidence_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate_phases(dir.path().join("nope"), dir.path().join("out"), None);
        assert!(matches!(
            result,
            Err(Error::ReadRecords {
                source: confidence::Error::Io { .. }
            })
        ));
    }

    #[test]
    fn phases_then_check_against_cnf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("conf.jsonl");
        let output = dir.path().join("nested/phases.txt");
        let cnf = dir.path().join("f.cnf");
        fs::write(
            &input,
            "{\"index\": 2, \"assignment\": 0}\n{\"index\": 0, \"assignment\": 1}\n{\"index\": 1, \"assignment\": 2}\n",
        )
        .unwrap();
        fs::write(&cnf, "p cnf 3 1\n1 2 3 0\n").unwrap();

        let summary = generate_phases(&input, &output, None).unwrap();
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.stats.skipped, 1);
        assert_eq!(fs::read_to_string(&output).unwrap(), "1 d 0");

        let counts = check_phases(&output, Some(cnf.as_path())).unwrap();
        assert_eq!(
            counts,
            PhaseCounts {
                positive: 1,
                negative: 1,
                dont_care: 1,
            }
        );

        fs::write(&cnf, "p cnf 4 1\n1 2 3 0\n").unwrap();
        assert!(matches!(
            check_phases(&output, Some(cnf.as_path())),
            Err(Error::LengthMismatch {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn augment_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let cnf = dir.path().join("in.cnf");
        let model = dir.path().join("model.txt");
        let output = dir.path().join("out/aug.cnf");
        fs::write(&cnf, "p cnf 3 2\n1 2 0\n-3 0\n").unwrap();
        fs::write(&model, "s SATISFIABLE\nv 4 -2\nv 0\n").unwrap();

        let summary = augment_file(&cnf, &model, &output, Options::default()).unwrap();
        assert_eq!(summary.added, 2);
        assert_eq!(summary.header.to_line(), "p cnf 4 4");
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "p cnf 4 4\n1 2 0\n-3 0\n4 0\n-2 0\n"
        );
    }

    #[test]
    fn augment_without_terminator_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cnf = dir.path().join("in.cnf");
        let model = dir.path().join("model.txt");
        let output = dir.path().join("aug.cnf");
        fs::write(&cnf, "p cnf 3 2\n1 2 0\n-3 0\n").unwrap();
        fs::write(&model, "v 1 -2 3\n").unwrap();

        assert!(matches!(
            augment_file(&cnf, &model, &output, Options::default()),
            Err(Error::Augment {
                source: augment::Error::NoTerminator { .. }
            })
        ));
        assert!(!output.exists());
    }
}
