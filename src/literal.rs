/*!
Signed DIMACS literals and the reader for solver model text (`v ... 0` lines).
*/

use std::{collections::HashSet, fmt::Display, num::NonZeroI64};

/// 1-based DIMACS variable number.
///
/// This is a different index space from [`crate::phase::PhaseIndex`], which is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(u64);

impl Variable {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Non-zero signed integer; the sign is the polarity, the magnitude the variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal(NonZeroI64);

impl Literal {
    /// Returns `None` for zero, which is a clause terminator rather than a literal.
    pub fn new(value: i64) -> Option<Self> {
        NonZeroI64::new(value).map(Literal)
    }

    pub fn get(&self) -> i64 {
        self.0.get()
    }

    pub fn variable(&self) -> Variable {
        Variable(self.0.get().unsigned_abs())
    }

    pub fn positive(&self) -> bool {
        self.0.get() > 0
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a single whitespace-separated token of model text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `0` (or any zero-valued integer such as `-0` / `00`) ends the model.
    Terminator,
    Literal(Literal),
    /// Anything that is not a signed integer, e.g. a stray `v`.
    Other,
}

/// Returns true if `token` is an optional `-` followed by one or more ASCII digits.
fn is_signed_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub fn classify_token(token: &str) -> Token {
    if token == "0" {
        return Token::Terminator;
    }
    if !is_signed_integer(token) {
        return Token::Other;
    }

    match token.parse::<i64>() {
        Ok(value) => match Literal::new(value) {
            Some(literal) => Token::Literal(literal),
            None => Token::Terminator,
        },
        Err(_) => {
            warn!("Ignoring out-of-range integer token '{}'", token);
            Token::Other
        }
    }
}

/// Ordered literals in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralSequence {
    literals: Vec<Literal>,
}

impl LiteralSequence {
    pub fn new(literals: Vec<Literal>) -> Self {
        LiteralSequence { literals }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }

    /// Drops repeated literals, keeping the first occurrence of each value.
    /// `3` and `-3` are distinct values and both survive.
    pub fn dedup(self) -> Self {
        let mut seen = HashSet::new();
        let literals = self
            .literals
            .into_iter()
            .filter(|literal| seen.insert(*literal))
            .collect();

        LiteralSequence { literals }
    }

    /// Largest variable mentioned, `None` when empty.
    pub fn max_variable(&self) -> Option<Variable> {
        self.iter().map(|literal| literal.variable()).max()
    }
}

impl From<Vec<Literal>> for LiteralSequence {
    fn from(literals: Vec<Literal>) -> Self {
        LiteralSequence::new(literals)
    }
}

/// Result of scanning model text: literals seen and whether a terminator was reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub literals: LiteralSequence,
    pub terminated: bool,
}

impl Scan {
    /// An unterminated model is treated as truncated and yields no literals.
    pub fn into_sequence(self) -> LiteralSequence {
        if self.terminated {
            self.literals
        } else {
            LiteralSequence::default()
        }
    }
}

/// Scans model text until the first zero terminator.
///
/// Lines may carry a leading `v ` marker. The terminator stops the whole
/// scan, not just the current line.
pub fn scan<I, S>(lines: I) -> Scan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut literals = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let line = line.strip_prefix("v ").unwrap_or(line);

        for token in line.split_whitespace() {
            match classify_token(token) {
                Token::Terminator => {
                    trace!("Model terminated after {} literals", literals.len());
                    return Scan {
                        literals: literals.into(),
                        terminated: true,
                    };
                }
                Token::Literal(literal) => literals.push(literal),
                Token::Other => (),
            }
        }
    }

    debug!(
        "Model text ended without a terminator ({} literals discarded)",
        literals.len()
    );
    Scan {
        literals: literals.into(),
        terminated: false,
    }
}

/// Reads the literals of a model; empty if the text has no `0` terminator.
pub fn read_literals<I, S>(lines: I) -> LiteralSequence
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    scan(lines).into_sequence()
}
