//! Requirements manifest parser.
//!
//! Parses the line-oriented `requirements.txt` format into ordered
//! [`Requirement`] entries: a package name, optional extras, and zero or
//! more `(operator, version)` constraints. Blank lines and comments are
//! skipped. Malformed lines either abort the parse ([`ParseMode::Strict`])
//! or are skipped with a warning ([`ParseMode::Lenient`]); the caller picks.

use thiserror::Error;

/// A malformed manifest line, carrying the offending line and reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line_no}: {reason}: '{line}'")]
pub struct ManifestParseError {
    pub line_no: usize,
    pub line: String,
    pub reason: String,
}

impl ManifestParseError {
    pub fn new(line_no: usize, line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line_no,
            line: line.into(),
            reason: reason.into(),
        }
    }
}

/// PEP 440 comparison operators accepted in constraint clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `===` arbitrary equality
    ArbitraryEq,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `>=`
    GreaterEq,
    /// `<=`
    LessEq,
    /// `~=` compatible release
    Compatible,
    /// `>`
    Greater,
    /// `<`
    Less,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::ArbitraryEq => "===",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::GreaterEq => ">=",
            Operator::LessEq => "<=",
            Operator::Compatible => "~=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }

    /// Split a leading operator off a constraint clause. Longest match wins
    /// so `===` is tried before `==` and `==` before nothing.
    fn strip_prefix(clause: &str) -> Option<(Operator, &str)> {
        const TABLE: [(&str, Operator); 8] = [
            ("===", Operator::ArbitraryEq),
            ("==", Operator::Eq),
            ("!=", Operator::NotEq),
            (">=", Operator::GreaterEq),
            ("<=", Operator::LessEq),
            ("~=", Operator::Compatible),
            (">", Operator::Greater),
            ("<", Operator::Less),
        ];
        TABLE
            .iter()
            .find_map(|(symbol, op)| clause.strip_prefix(symbol).map(|rest| (*op, rest)))
    }
}

/// One `(operator, version)` constraint pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: Operator,
    pub version: String,
}

impl Constraint {
    pub fn new(op: Operator, version: impl Into<String>) -> Self {
        Self {
            op,
            version: version.into(),
        }
    }

    /// The canonical `operator ++ version` token used for normalization.
    pub fn token(&self) -> String {
        format!("{}{}", self.op.as_str(), self.version)
    }
}

/// A parsed manifest entry, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraints: Vec<Constraint>,
    pub extras: Vec<String>,
}

/// Whether a malformed line aborts the whole parse or is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Strict,
    Lenient,
}

/// Parse a whole manifest into ordered requirements.
pub fn parse_manifest(text: &str, mode: ParseMode) -> Result<Vec<Requirement>, ManifestParseError> {
    let mut requirements = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line_no, line) {
            Ok(requirement) => requirements.push(requirement),
            Err(error) => match mode {
                ParseMode::Strict => return Err(error),
                ParseMode::Lenient => {
                    tracing::warn!(line_no, line, reason = %error.reason, "skipping malformed manifest line");
                }
            },
        }
    }

    Ok(requirements)
}

/// Find the first package name that appears more than once, if any.
///
/// Duplicate names within a single manifest are a hard input error: the
/// dependency set of one application keys on the package name.
pub fn find_duplicate_name(requirements: &[Requirement]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    requirements
        .iter()
        .find(|req| !seen.insert(req.name.as_str()))
        .map(|req| req.name.as_str())
}

/// Strip an inline comment: `#` at the start of the line or preceded by
/// whitespace begins a comment.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (pos, byte) in bytes.iter().enumerate() {
        if *byte == b'#' && (pos == 0 || bytes[pos - 1].is_ascii_whitespace()) {
            return &line[..pos];
        }
    }
    line
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn parse_line(line_no: usize, line: &str) -> Result<Requirement, ManifestParseError> {
    let name_end = line
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map(|(pos, _)| pos)
        .unwrap_or(line.len());

    let name = &line[..name_end];
    if name.is_empty() {
        return Err(ManifestParseError::new(
            line_no,
            line,
            "missing package name",
        ));
    }

    let mut rest = line[name_end..].trim_start();

    let extras = if let Some(after_bracket) = rest.strip_prefix('[') {
        let close = after_bracket.find(']').ok_or_else(|| {
            ManifestParseError::new(line_no, line, "unterminated extras bracket")
        })?;
        let extras = after_bracket[..close]
            .split(',')
            .map(str::trim)
            .filter(|extra| !extra.is_empty())
            .map(str::to_string)
            .collect();
        rest = after_bracket[close + 1..].trim_start();
        extras
    } else {
        Vec::new()
    };

    let constraints = if rest.is_empty() {
        Vec::new()
    } else {
        parse_constraints(line_no, line, rest)?
    };

    Ok(Requirement {
        name: name.to_string(),
        constraints,
        extras,
    })
}

fn parse_constraints(
    line_no: usize,
    line: &str,
    clauses: &str,
) -> Result<Vec<Constraint>, ManifestParseError> {
    clauses
        .split(',')
        .map(|clause| {
            let clause = clause.trim();
            let (op, version) = Operator::strip_prefix(clause).ok_or_else(|| {
                ManifestParseError::new(line_no, line, "missing comparison operator")
            })?;
            let version = version.trim();
            if version.is_empty() {
                return Err(ManifestParseError::new(line_no, line, "missing version"));
            }
            if !version.chars().all(|c| is_name_char(c) || c == '*' || c == '+') {
                return Err(ManifestParseError::new(
                    line_no,
                    line,
                    format!("invalid version '{}'", version),
                ));
            }
            Ok(Constraint::new(op, version))
        })
        .collect()
}
