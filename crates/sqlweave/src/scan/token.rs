//! Placeholder tokens and their recognition in plain SQL.

use super::mode::{can_precede_new_token, prev_char};

/// The syntactic family of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `:name`, a named replacement.
    Named,
    /// `?`, a positional replacement.
    Positional,
    /// `$1`, a numbered bind parameter.
    Numbered,
    /// `$name`, a named bind parameter.
    NamedBind,
}

/// A placeholder found in plain SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub kind: PlaceholderKind,
    /// Name without its sigil. Empty for positional placeholders.
    pub name: &'a str,
    /// Byte offset of the sigil.
    pub start: usize,
    /// Byte offset just past the name.
    pub end: usize,
}

impl Placeholder<'_> {
    /// `$0`, `$01`, ...: numbered forms that cannot address a 1-based slot.
    pub fn is_malformed_number(&self) -> bool {
        self.kind == PlaceholderKind::Numbered && self.name.starts_with('0')
    }

    /// Whether this is one of the `$` forms.
    pub fn is_bind(&self) -> bool {
        matches!(self.kind, PlaceholderKind::Numbered | PlaceholderKind::NamedBind)
    }
}

/// Which placeholder families a scan reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detect {
    /// `$name` and `$1`.
    pub bind: bool,
    /// `:name`.
    pub named: bool,
    /// `?`.
    pub positional: bool,
}

impl Detect {
    pub const NONE: Self = Self {
        bind: false,
        named: false,
        positional: false,
    };
    pub const ALL: Self = Self {
        bind: true,
        named: true,
        positional: true,
    };
    pub const BINDS: Self = Self {
        bind: true,
        ..Self::NONE
    };
    pub const NAMED: Self = Self {
        named: true,
        ..Self::NONE
    };
    pub const POSITIONAL: Self = Self {
        positional: true,
        ..Self::NONE
    };
}

impl Default for Detect {
    fn default() -> Self {
        Self::ALL
    }
}

/// Recognize a placeholder starting at `pos`, which must be in plain SQL.
pub(crate) fn detect(src: &str, pos: usize, detect: Detect) -> Option<Placeholder<'_>> {
    let bytes = src.as_bytes();
    let sigil = bytes[pos];
    if !matches!(sigil, b'$' | b':' | b'?') {
        return None;
    }
    if !can_precede_new_token(prev_char(src, pos)) {
        return None;
    }

    match sigil {
        b'$' if detect.bind => {
            let name_start = pos + 1;
            let (kind, name_end) = match bytes.get(name_start) {
                Some(b) if b.is_ascii_digit() => (
                    PlaceholderKind::Numbered,
                    scan_while(bytes, name_start, |b| b.is_ascii_digit()),
                ),
                Some(&b) if is_name_start(b) => (
                    PlaceholderKind::NamedBind,
                    scan_while(bytes, name_start, is_name_byte),
                ),
                _ => return None,
            };
            terminated(src, name_end).then(|| Placeholder {
                kind,
                name: &src[name_start..name_end],
                start: pos,
                end: name_end,
            })
        }
        b':' if detect.named => {
            let name_start = pos + 1;
            if !bytes.get(name_start).copied().is_some_and(is_name_start) {
                return None;
            }
            let name_end = scan_while(bytes, name_start, is_name_byte);
            terminated(src, name_end).then(|| Placeholder {
                kind: PlaceholderKind::Named,
                name: &src[name_start..name_end],
                start: pos,
                end: name_end,
            })
        }
        // `?|` and `?&` are Postgres JSONB operators.
        b'?' if detect.positional => match bytes.get(pos + 1) {
            Some(b'|' | b'&') => None,
            _ => Some(Placeholder {
                kind: PlaceholderKind::Positional,
                name: "",
                start: pos,
                end: pos + 1,
            }),
        },
        _ => None,
    }
}

fn is_name_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_name_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

fn scan_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while bytes.get(pos).copied().is_some_and(&pred) {
        pos += 1;
    }
    pos
}

/// What may follow a placeholder name: `]`, `)`, `,`, `;`, `::`, whitespace or end of input.
fn terminated(src: &str, pos: usize) -> bool {
    let rest = &src[pos..];
    match rest.chars().next() {
        None => true,
        Some(']' | ')' | ',' | ';') => true,
        Some(':') => rest.starts_with("::"),
        Some(c) => c.is_whitespace(),
    }
}
