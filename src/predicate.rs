//! Row predicates such as `Year>=2000` or `Model=Camry`.

use std::fmt;

use crate::{
    error::{Error, Result},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
}

/// Operator spellings recognized by [`parse_predicate`].
const COMPARATORS: &[(&str, Comparator)] = &[
    (">=", Comparator::Ge),
    ("<=", Comparator::Le),
    ("=", Comparator::Eq),
    ("==", Comparator::Eq),
    (">", Comparator::Gt),
    ("<", Comparator::Lt),
    ("!=", Comparator::NotEq),
];

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '=' | '>' | '!')
}

impl Comparator {
    pub fn from_token(token: &str) -> Option<Self> {
        COMPARATORS
            .iter()
            .find(|(spelling, _)| *spelling == token)
            .map(|(_, comparator)| *comparator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::NotEq => "!=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
        }
    }

    /// Applies the comparison. Ordering between a number and text is undefined,
    /// so the ordering comparators return `false` for such pairs.
    pub fn evaluate(&self, left: &Value, right: &Value) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            Comparator::Eq => left == right,
            Comparator::NotEq => left != right,
            Comparator::Gt => matches!(left.partial_cmp(right), Some(Greater)),
            Comparator::Ge => matches!(left.partial_cmp(right), Some(Greater | Equal)),
            Comparator::Lt => matches!(left.partial_cmp(right), Some(Less)),
            Comparator::Le => matches!(left.partial_cmp(right), Some(Less | Equal)),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub comparator: Comparator,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, comparator: Comparator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            comparator,
            value: value.into(),
        }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Comparator::Eq, value)
    }

    /// Tests a raw field, classifying it first so `"75,000"` compares as `75000`.
    pub fn matches(&self, raw: &str) -> bool {
        self.comparator.evaluate(&Value::classify(raw), &self.value)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.column, self.comparator, self.value)
    }
}

/// Splits `column<op>value` at the first run of `<`, `=`, `>`, `!` characters.
///
/// The value is classified, so `Year>=2000` compares numerically and
/// `Model=Camry` compares as text.
pub fn parse_predicate(expression: &str) -> Result<Predicate> {
    let invalid = |reason: &str| Error::InvalidPredicate {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };
    let start = expression
        .find(is_operator_char)
        .ok_or_else(|| invalid("no comparison operator"))?;
    let end = expression[start..]
        .find(|c| !is_operator_char(c))
        .map_or(expression.len(), |offset| start + offset);

    let column = expression[..start].trim();
    if column.is_empty() {
        return Err(invalid("missing column name"));
    }
    let token = &expression[start..end];
    let comparator = Comparator::from_token(token)
        .ok_or_else(|| invalid(&format!("unknown operator '{token}'")))?;
    let value = unquote(expression[end..].trim());
    Ok(Predicate::new(column, comparator, Value::classify(value)))
}

pub fn parse_predicates(expressions: &[String]) -> Result<Vec<Predicate>> {
    expressions.iter().map(|e| parse_predicate(e)).collect()
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        let last = bytes[value.len() - 1];
        if (bytes[0] == b'"' && last == b'"') || (bytes[0] == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
