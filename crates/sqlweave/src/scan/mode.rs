//! Lexical modes and the transition function between them.

use crate::dialect::Dialect;

/// Where the scanner currently is, lexically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexMode {
    /// Ordinary SQL; the only mode in which placeholders are recognized.
    Plain,
    /// Inside `'...'`. `backslash_escapes` is fixed when the literal opens.
    SingleQuoted { backslash_escapes: bool },
    /// Inside `$tag$ ... $tag$`; only the identical tag closes it.
    DollarQuoted { tag: String },
    /// Inside a delimited identifier such as `"..."`, `` `...` `` or `[...]`.
    QuotedIdentifier { close: char },
    /// From `--` up to the next newline.
    LineComment,
    /// From `/*` up to the first `*/`.
    BlockComment,
}

/// Discriminant of [`LexMode`], without the per-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Plain,
    SingleQuoted,
    DollarQuoted,
    QuotedIdentifier,
    LineComment,
    BlockComment,
}

impl LexMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Plain => ModeKind::Plain,
            Self::SingleQuoted { .. } => ModeKind::SingleQuoted,
            Self::DollarQuoted { .. } => ModeKind::DollarQuoted,
            Self::QuotedIdentifier { .. } => ModeKind::QuotedIdentifier,
            Self::LineComment => ModeKind::LineComment,
            Self::BlockComment => ModeKind::BlockComment,
        }
    }

    /// Whether reaching end of input in this mode is an error.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::SingleQuoted { .. } | Self::DollarQuoted { .. })
    }

    /// Compute the transition taken at byte offset `pos` of `src`.
    ///
    /// `pos` must be a char boundary strictly inside `src`. The returned
    /// transition always consumes at least one whole char.
    pub fn transition(&self, src: &str, pos: usize, rules: &LexRules) -> Transition {
        let bytes = src.as_bytes();
        let b = bytes[pos];
        let next = bytes.get(pos + 1).copied();

        match self {
            Self::Plain => {
                let c = b as char;
                if b.is_ascii() && c == rules.identifier_open {
                    return Transition::enter(
                        Self::QuotedIdentifier {
                            close: rules.identifier_close,
                        },
                        1,
                    );
                }
                match b {
                    b'\'' => Transition::enter(
                        Self::SingleQuoted {
                            backslash_escapes: rules.backslash_escapes
                                || (rules.escape_string_constants && is_escape_prefix(src, pos)),
                        },
                        1,
                    ),
                    b'-' if next == Some(b'-') => Transition::enter(Self::LineComment, 2),
                    b'/' if next == Some(b'*') => Transition::enter(Self::BlockComment, 2),
                    b'$' => {
                        // `foo$bar`: part of an identifier.
                        if prev_char(src, pos).is_some_and(is_ident_char) {
                            return Transition::stay(1);
                        }
                        if rules.dollar_quotes {
                            if let Some(tag) = dollar_tag(src, pos) {
                                return Transition::enter(
                                    Self::DollarQuoted {
                                        tag: tag.to_string(),
                                    },
                                    tag.len() + 2,
                                );
                            }
                        }
                        Transition::stay(1)
                    }
                    _ => Transition::stay(char_len_at(src, pos)),
                }
            }
            Self::SingleQuoted { backslash_escapes } => match b {
                b'\\' if *backslash_escapes => {
                    // The escaped char is consumed with the backslash, so `\\`
                    // never escapes what follows it.
                    let escaped = if pos + 1 < src.len() {
                        char_len_at(src, pos + 1)
                    } else {
                        0
                    };
                    Transition::stay(1 + escaped)
                }
                b'\'' if next == Some(b'\'') => Transition::stay(2),
                b'\'' => Transition::enter(Self::Plain, 1),
                _ => Transition::stay(char_len_at(src, pos)),
            },
            Self::DollarQuoted { tag } => {
                if b == b'$' {
                    if let Some(found) = dollar_tag(src, pos) {
                        if found == tag {
                            return Transition::enter(Self::Plain, found.len() + 2);
                        }
                    }
                    return Transition::stay(1);
                }
                Transition::stay(char_len_at(src, pos))
            }
            Self::QuotedIdentifier { close } => {
                if b.is_ascii() && b as char == *close {
                    Transition::enter(Self::Plain, 1)
                } else {
                    Transition::stay(char_len_at(src, pos))
                }
            }
            Self::LineComment => {
                if b == b'\n' {
                    Transition::enter(Self::Plain, 1)
                } else {
                    Transition::stay(char_len_at(src, pos))
                }
            }
            Self::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    Transition::enter(Self::Plain, 2)
                } else {
                    Transition::stay(char_len_at(src, pos))
                }
            }
        }
    }
}

/// Result of [`LexMode::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// New mode, or `None` to stay in the current one.
    pub next: Option<LexMode>,
    /// Bytes consumed by this transition.
    pub consumed: usize,
}

impl Transition {
    fn stay(consumed: usize) -> Self {
        Self {
            next: None,
            consumed,
        }
    }

    fn enter(mode: LexMode, consumed: usize) -> Self {
        Self {
            next: Some(mode),
            consumed,
        }
    }
}

/// The dialect facts the transition function depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexRules {
    pub identifier_open: char,
    pub identifier_close: char,
    /// Backslashes escape inside every `'...'` literal.
    pub backslash_escapes: bool,
    /// `E'...'` literals exist and always accept backslash escapes.
    pub escape_string_constants: bool,
    pub dollar_quotes: bool,
}

impl LexRules {
    pub fn for_dialect(dialect: &dyn Dialect) -> Self {
        let (identifier_open, identifier_close) = dialect.identifier_delimiter();
        Self {
            identifier_open,
            identifier_close,
            backslash_escapes: dialect.can_backslash_escape(),
            escape_string_constants: dialect.supports_escape_string_constants(),
            dollar_quotes: dialect.supports_dollar_quoted_strings(),
        }
    }
}

/// Whether `c` may directly precede a placeholder or an `E'...'` prefix.
pub(crate) fn can_precede_new_token(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '(' | '[' | '>' | ',' | '='),
    }
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

pub(crate) fn prev_char(src: &str, pos: usize) -> Option<char> {
    src[..pos].chars().next_back()
}

pub(crate) fn char_len_at(src: &str, pos: usize) -> usize {
    src[pos..].chars().next().map_or(1, char::len_utf8)
}

/// `E'` or `e'` where the `E` starts a new token.
fn is_escape_prefix(src: &str, quote_pos: usize) -> bool {
    match prev_char(src, quote_pos) {
        Some('E' | 'e') => can_precede_new_token(prev_char(src, quote_pos - 1)),
        _ => false,
    }
}

/// Match `$tag$` (tag possibly empty) at `pos` and return the tag.
pub(crate) fn dollar_tag(src: &str, pos: usize) -> Option<&str> {
    let bytes = src.as_bytes();
    if bytes.get(pos) != Some(&b'$') {
        return None;
    }
    let start = pos + 1;
    let mut end = start;
    if let Some(&first) = bytes.get(end) {
        if first == b'_' || first.is_ascii_alphabetic() {
            end += 1;
            while bytes
                .get(end)
                .is_some_and(|&b| b == b'_' || b.is_ascii_alphanumeric())
            {
                end += 1;
            }
        }
    }
    (bytes.get(end) == Some(&b'$')).then(|| &src[start..end])
}
