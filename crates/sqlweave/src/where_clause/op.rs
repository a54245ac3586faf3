use std::fmt;

/// Comparison operator applied between an attribute and its operand.
///
/// # Example
/// ```ignore
/// use sqlweave::where_clause::Op;
///
/// assert_eq!(Op::Gte.keyword(), ">=");
/// assert_eq!(Op::from_name("notILike"), Some(Op::NotILike));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Is,
    IsNot,
    In,
    NotIn,
    Like,
    NotLike,
    ILike,
    NotILike,
    /// POSIX regular expression match (`~`)
    Regexp,
    NotRegexp,
    /// Case-insensitive regular expression match (`~*`)
    IRegexp,
    NotIRegexp,
    Between,
    NotBetween,
    /// Arrays or ranges share an element (`&&`)
    Overlap,
    /// `@>`
    Contains,
    /// `<@`
    Contained,
    /// Ranges are adjacent (`-|-`)
    Adjacent,
    StrictLeft,
    StrictRight,
    NoExtendRight,
    NoExtendLeft,
    /// Full-text search match (`@@`)
    Match,
    /// JSONB: any of the keys exist (`?|`)
    AnyKeyExists,
    /// JSONB: all of the keys exist (`?&`)
    AllKeysExist,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Substring,
    NotSubstring,
}

impl Op {
    /// Every operator, in catalogue order.
    pub const ALL: &'static [Op] = &[
        Op::Eq,
        Op::Ne,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
        Op::Is,
        Op::IsNot,
        Op::In,
        Op::NotIn,
        Op::Like,
        Op::NotLike,
        Op::ILike,
        Op::NotILike,
        Op::Regexp,
        Op::NotRegexp,
        Op::IRegexp,
        Op::NotIRegexp,
        Op::Between,
        Op::NotBetween,
        Op::Overlap,
        Op::Contains,
        Op::Contained,
        Op::Adjacent,
        Op::StrictLeft,
        Op::StrictRight,
        Op::NoExtendRight,
        Op::NoExtendLeft,
        Op::Match,
        Op::AnyKeyExists,
        Op::AllKeysExist,
        Op::StartsWith,
        Op::NotStartsWith,
        Op::EndsWith,
        Op::NotEndsWith,
        Op::Substring,
        Op::NotSubstring,
    ];

    /// Name used in JSON where trees (`"$gt"` without the `$`).
    pub fn name(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Is => "is",
            Op::IsNot => "isNot",
            Op::In => "in",
            Op::NotIn => "notIn",
            Op::Like => "like",
            Op::NotLike => "notLike",
            Op::ILike => "iLike",
            Op::NotILike => "notILike",
            Op::Regexp => "regexp",
            Op::NotRegexp => "notRegexp",
            Op::IRegexp => "iRegexp",
            Op::NotIRegexp => "notIRegexp",
            Op::Between => "between",
            Op::NotBetween => "notBetween",
            Op::Overlap => "overlap",
            Op::Contains => "contains",
            Op::Contained => "contained",
            Op::Adjacent => "adjacent",
            Op::StrictLeft => "strictLeft",
            Op::StrictRight => "strictRight",
            Op::NoExtendRight => "noExtendRight",
            Op::NoExtendLeft => "noExtendLeft",
            Op::Match => "match",
            Op::AnyKeyExists => "anyKeyExists",
            Op::AllKeysExist => "allKeysExist",
            Op::StartsWith => "startsWith",
            Op::NotStartsWith => "notStartsWith",
            Op::EndsWith => "endsWith",
            Op::NotEndsWith => "notEndsWith",
            Op::Substring => "substring",
            Op::NotSubstring => "notSubstring",
        }
    }

    /// Look up an operator by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Op> {
        Op::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// SQL spelling of the operator.
    ///
    /// The substring family is rewritten to `LIKE` / `NOT LIKE` with a `%`
    /// pattern before it reaches SQL, so that is what they report here.
    pub fn keyword(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Is => "IS",
            Op::IsNot => "IS NOT",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
            Op::Like | Op::StartsWith | Op::EndsWith | Op::Substring => "LIKE",
            Op::NotLike | Op::NotStartsWith | Op::NotEndsWith | Op::NotSubstring => "NOT LIKE",
            Op::ILike => "ILIKE",
            Op::NotILike => "NOT ILIKE",
            Op::Regexp => "~",
            Op::NotRegexp => "!~",
            Op::IRegexp => "~*",
            Op::NotIRegexp => "!~*",
            Op::Between => "BETWEEN",
            Op::NotBetween => "NOT BETWEEN",
            Op::Overlap => "&&",
            Op::Contains => "@>",
            Op::Contained => "<@",
            Op::Adjacent => "-|-",
            Op::StrictLeft => "<<",
            Op::StrictRight => ">>",
            Op::NoExtendRight => "&<",
            Op::NoExtendLeft => "&>",
            Op::Match => "@@",
            Op::AnyKeyExists => "?|",
            Op::AllKeysExist => "?&",
        }
    }

    /// `(leading %, trailing %)` for the substring family.
    pub(crate) fn like_pattern(self) -> Option<(bool, bool)> {
        match self {
            Op::StartsWith | Op::NotStartsWith => Some((false, true)),
            Op::EndsWith | Op::NotEndsWith => Some((true, false)),
            Op::Substring | Op::NotSubstring => Some((true, true)),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `ANY` / `ALL` applied to the right operand of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Any,
    All,
}

impl Quantifier {
    pub fn name(self) -> &'static str {
        match self {
            Quantifier::Any => "any",
            Quantifier::All => "all",
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Quantifier::Any => "ANY",
            Quantifier::All => "ALL",
        }
    }

    pub fn from_name(name: &str) -> Option<Quantifier> {
        match name {
            "any" => Some(Quantifier::Any),
            "all" => Some(Quantifier::All),
            _ => None,
        }
    }
}
