/*!
Injects a model's literals into a CNF as unit clauses and keeps the
problem line consistent with the new body.
*/

use std::cmp::max;

use crate::{
    dimacs::{self, CnfDocument, Header},
    literal::{self, LiteralSequence},
    prelude::*,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to locate the CNF problem line"))]
    MissingHeader { source: dimacs::Error },
    #[snafu(display("Assignment text has no '0' terminator ({} literals discarded)", discarded))]
    NoTerminator { discarded: usize },
    #[snafu(display("No literals parsed from assignment text"))]
    NoLiterals,
    #[snafu(display(
        "Adding {} unit clauses to the declared {} clauses overflows the clause count",
        added,
        declared
    ))]
    ClauseCountOverflow { declared: u64, added: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Drop repeated literals before appending, keeping the first occurrence.
    pub dedup: bool,
}

/// New document plus what was done to it.
#[derive(Debug, Clone)]
pub struct Augmented {
    pub document: CnfDocument,
    pub header: Header,
    pub added: usize,
}

/// Returns `header` adjusted for `literals` appended as unit clauses.
pub fn adjusted_header(header: &Header, literals: &LiteralSequence) -> Result<Header, Error> {
    let max_variable = literals
        .max_variable()
        .map(|variable| variable.get())
        .unwrap_or(0);
    let num_clauses = header
        .num_clauses
        .checked_add(literals.len() as u64)
        .context(ClauseCountOverflow {
            declared: header.num_clauses,
            added: literals.len(),
        })?;

    Ok(Header {
        index: header.index,
        num_variables: max(header.num_variables, max_variable),
        num_clauses,
    })
}

/// Appends one `<literal> 0` line per literal and rewrites the problem line in place.
///
/// `cnf` is not modified; the body is copied verbatim into the result.
pub fn augment<I, S>(cnf: &CnfDocument, assignment: I, options: Options) -> Result<Augmented, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let header = cnf.header().context(MissingHeader)?;
    debug!(
        "Found problem line at line {}: {}",
        header.index + 1,
        header
    );

    let scan = literal::scan(assignment);
    ensure!(
        scan.terminated,
        NoTerminator {
            discarded: scan.literals.len(),
        }
    );
    let mut literals = scan.into_sequence();
    ensure!(!literals.is_empty(), NoLiterals);

    if options.dedup {
        let before = literals.len();
        literals = literals.dedup();
        debug!("Dedup removed {} literals", before - literals.len());
    }

    let header = adjusted_header(&header, &literals)?;
    let document = cnf.with_header_and_appended(
        &header,
        literals.iter().map(|literal| format!("{} 0", literal)),
    );

    info!("Appended {} unit clauses, header is now '{}'", literals.len(), header);
    Ok(Augmented {
        document,
        header,
        added: literals.len(),
    })
}
