/*!
Initial-phase hint arrays: building them from confidence records, and the
text format a solver reads them from.
*/

use std::{convert::TryFrom, fmt::Display, str::FromStr};

use serde_json::Value;

use crate::{confidence::ConfidenceRecord, prelude::*};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "Invalid phase token '{}' at index {} (use 1/0/d, +1/-1, true/false, ...)",
        token,
        index
    ))]
    InvalidToken { token: String, index: usize },
    #[snafu(display("Top-k fraction {} is out of range (must be within (0, 1])", fraction))]
    TopKRange { fraction: f64 },
    #[snafu(display("No confidence records to build phases from"))]
    NoRecords,
    #[snafu(display("Variable index {} is too large for a phase array", index))]
    IndexOverflow { index: usize },
}

/// 0-based position in a phase array.
///
/// Phase index `i` talks about DIMACS variable `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhaseIndex(usize);

impl PhaseIndex {
    pub fn new(index: usize) -> Self {
        PhaseIndex(index)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Negative,
    Positive,
    DontCare,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::DontCare
    }
}

impl Phase {
    /// Maps a record's assignment value; only the integers 0 and 1 are meaningful.
    pub fn from_assignment(assignment: &Value) -> Option<Self> {
        match assignment.as_u64() {
            Some(0) => Some(Phase::Negative),
            Some(1) => Some(Phase::Positive),
            _ => None,
        }
    }

    /// Parses one token of a hint file. Case-insensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "1" | "+1" | "t" | "true" => Some(Phase::Positive),
            "0" | "-1" | "f" | "false" => Some(Phase::Negative),
            "d" | "x" | "none" | "skip" | "*" => Some(Phase::DontCare),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Phase::Negative => "0",
            Phase::Positive => "1",
            Phase::DontCare => "d",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Fraction of variables whose records are applied, in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopK(f64);

impl TopK {
    pub fn fraction(&self) -> f64 {
        self.0
    }

    /// Number of leading records to keep out of `num_vars`; at least one.
    pub fn count(&self, num_vars: usize) -> usize {
        let k = (num_vars as f64 * self.0).ceil() as usize;
        k.max(1)
    }
}

impl TryFrom<f64> for TopK {
    type Error = Error;

    fn try_from(fraction: f64) -> Result<Self, Self::Error> {
        ensure!(fraction > 0.0 && fraction <= 1.0, TopKRange { fraction });
        Ok(TopK(fraction))
    }
}

impl FromStr for TopK {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fraction = s
            .parse::<f64>()
            .map_err(|e| format!("'{}' is not a number: {}", s, e))?;
        TopK::try_from(fraction).map_err(|e| e.to_string())
    }
}

/// Tallies of a phase array's symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub positive: usize,
    pub negative: usize,
    pub dont_care: usize,
}

/// What happened to the records while building a phase array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub applied: usize,
    pub skipped: usize,
    /// Records dropped by the top-k cut.
    pub unselected: usize,
}

/// Dense per-variable phase hints, indexed by [`PhaseIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseArray {
    phases: Vec<Phase>,
}

impl PhaseArray {
    /// Builds the phase array from records assumed sorted by descending confidence.
    ///
    /// The length is fixed by the largest index over *all* records, before the
    /// top-k cut. Later records overwrite earlier ones at the same index.
    pub fn build(
        records: &[ConfidenceRecord],
        topk: Option<TopK>,
    ) -> Result<(Self, BuildStats), Error> {
        let max_index = records
            .iter()
            .map(|record| record.index)
            .max()
            .context(NoRecords)?;
        let num_vars = max_index
            .checked_add(1)
            .context(IndexOverflow { index: max_index })?;
        let mut phases = vec![Phase::default(); num_vars];

        let selected = match topk {
            Some(topk) => {
                let k = topk.count(num_vars).min(records.len());
                debug!(
                    "Keeping top {} of {} records (fraction {})",
                    k,
                    records.len(),
                    topk.fraction()
                );
                &records[..k]
            }
            None => records,
        };

        let mut stats = BuildStats {
            unselected: records.len() - selected.len(),
            ..BuildStats::default()
        };

        for record in selected {
            match Phase::from_assignment(&record.assignment) {
                Some(phase) => {
                    phases[record.index] = phase;
                    stats.applied += 1;
                }
                None => {
                    warn!(
                        "Skipping record with non-binary assignment {} at index {}",
                        record.assignment, record.index
                    );
                    stats.skipped += 1;
                }
            }
        }

        Ok((PhaseArray { phases }, stats))
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, index: PhaseIndex) -> Option<Phase> {
        self.phases.get(index.as_usize()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Phase> + '_ {
        self.phases.iter().copied()
    }

    pub fn counts(&self) -> PhaseCounts {
        let mut counts = PhaseCounts::default();
        for phase in self.iter() {
            match phase {
                Phase::Positive => counts.positive += 1,
                Phase::Negative => counts.negative += 1,
                Phase::DontCare => counts.dont_care += 1,
            }
        }
        counts
    }
}

/// Single line of space separated symbols, no trailing newline.
impl Display for PhaseArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut iter = self.phases.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for phase in iter {
            write!(f, " {}", phase)?;
        }

        Ok(())
    }
}

impl FromStr for PhaseArray {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let phases = s
            .split_whitespace()
            .enumerate()
            .map(|(index, token)| {
                Phase::from_token(token).context(InvalidToken { token, index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PhaseArray { phases })
    }
}
