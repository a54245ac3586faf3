//! Single-pass SQL scanner.
//!
//! The scanner walks a SQL string once, left to right, tracking a
//! [`LexMode`] and reporting placeholders found in plain SQL. Anything inside
//! a string literal, a dollar-quoted string, a delimited identifier or a
//! comment is skipped, which is what makes placeholder substitution safe.
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::dialect::Postgres;
//! use sqlweave::scan::{Detect, Scanner};
//!
//! let pg = Postgres::new();
//! let names: Vec<_> = Scanner::new("SELECT '$a', $b", &pg)
//!     .detect(Detect::BINDS)
//!     .map(|p| p.map(|p| p.name))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(names, ["b"]);
//! # Ok::<(), sqlweave::WeaveError>(())
//! ```

mod mode;
mod token;


use std::ops::Range;

use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};

pub use mode::{LexMode, LexRules, ModeKind, Transition};
pub use token::{Detect, Placeholder, PlaceholderKind};

/// One unit of progress: a range of the input and the mode it belongs to.
///
/// Delimiters belong to the region they delimit, so the opening and closing
/// quote of `'abc'` are both reported as [`ModeKind::SingleQuoted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    pub mode: ModeKind,
    pub range: Range<usize>,
    pub placeholder: Option<Placeholder<'a>>,
}

/// A maximal run of input in a single mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub mode: ModeKind,
    pub range: Range<usize>,
}

/// Forward-only scanner over one SQL string.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    mode: LexMode,
    rules: LexRules,
    detect: Detect,
    done: bool,
}

impl<'a> Scanner<'a> {
    /// Scan `src` with the lexical rules of `dialect`, reporting every placeholder family.
    pub fn new(src: &'a str, dialect: &dyn Dialect) -> Self {
        Self::with_rules(src, LexRules::for_dialect(dialect))
    }

    pub fn with_rules(src: &'a str, rules: LexRules) -> Self {
        Self {
            src,
            pos: 0,
            mode: LexMode::Plain,
            rules,
            detect: Detect::ALL,
            done: false,
        }
    }

    /// Restrict which placeholder families are reported.
    pub fn detect(mut self, detect: Detect) -> Self {
        self.detect = detect;
        self
    }

    /// The source being scanned.
    pub fn source(&self) -> &'a str {
        self.src
    }

    /// Byte offset of the next unread char.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Mode at [`position`](Self::position), with its state (dollar tag, escaping).
    pub fn mode(&self) -> &LexMode {
        &self.mode
    }

    /// Advance by one transition or one placeholder.
    ///
    /// Returns `Ok(None)` at end of input, or an error if the input ends
    /// inside a string literal.
    pub fn step(&mut self) -> WeaveResult<Option<Step<'a>>> {
        if self.done {
            return Ok(None);
        }
        if self.pos >= self.src.len() {
            self.done = true;
            if self.mode.is_string() {
                return Err(WeaveError::unterminated(self.src));
            }
            return Ok(None);
        }

        let start = self.pos;
        let transition = self.mode.transition(self.src, start, &self.rules);

        if transition.next.is_none() && self.mode == LexMode::Plain {
            if let Some(p) = token::detect(self.src, start, self.detect) {
                self.pos = p.end;
                tracing::trace!(
                    target: "sqlweave.scan",
                    kind = ?p.kind,
                    name = p.name,
                    start = p.start,
                    "placeholder"
                );
                return Ok(Some(Step {
                    mode: ModeKind::Plain,
                    range: p.start..p.end,
                    placeholder: Some(p),
                }));
            }
        }

        self.pos = start + transition.consumed;
        let mode = match transition.next {
            Some(next) => {
                // Opening delimiters belong to the new region, closing ones to the old.
                let kind = if self.mode == LexMode::Plain {
                    next.kind()
                } else {
                    self.mode.kind()
                };
                self.mode = next;
                kind
            }
            None => self.mode.kind(),
        };

        Ok(Some(Step {
            mode,
            range: start..self.pos,
            placeholder: None,
        }))
    }

    /// Advance to the next reported placeholder.
    pub fn next_placeholder(&mut self) -> WeaveResult<Option<Placeholder<'a>>> {
        while let Some(step) = self.step()? {
            if let Some(p) = step.placeholder {
                return Ok(Some(p));
            }
        }
        Ok(None)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = WeaveResult<Placeholder<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_placeholder().transpose()
    }
}

/// Collect every placeholder of the requested families, in order of appearance.
pub fn placeholders<'a>(
    src: &'a str,
    dialect: &dyn Dialect,
    detect: Detect,
) -> WeaveResult<Vec<Placeholder<'a>>> {
    Scanner::new(src, dialect).detect(detect).collect()
}

/// Split `src` into maximal runs of a single lexical mode.
///
/// Concatenating the segments' ranges reproduces `src` exactly.
pub fn segments(src: &str, dialect: &dyn Dialect) -> WeaveResult<Vec<Segment>> {
    let mut scanner = Scanner::new(src, dialect).detect(Detect::NONE);
    let mut out: Vec<Segment> = Vec::new();
    while let Some(step) = scanner.step()? {
        match out.last_mut() {
            Some(last) if last.mode == step.mode && last.range.end == step.range.start => {
                last.range.end = step.range.end;
            }
            _ => out.push(Segment {
                mode: step.mode,
                range: step.range,
            }),
        }
    }
    Ok(out)
}
