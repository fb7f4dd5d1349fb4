use serde_json::Value;
use std::cmp::Ordering;
use std::fmt::Display;

use super::comparison::{compare, loose_eq};
use crate::common::{OP_EQ, OP_GT, OP_GTE, OP_LT, OP_LTE, OP_NE, OP_OR};
use crate::errors::{ErrorKind, PocketError, PocketResult};

/// The comparison operators understood by a query.
///
/// The set is closed: a query naming any other symbol is rejected with
/// [ErrorKind::UnsupportedOperator] when it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `$eq`, loose equality.
    Eq,
    /// `$ne`, loose inequality.
    Ne,
    /// `$or`, loose equality with any element of an array operand.
    Or,
    /// `$gt`
    Gt,
    /// `$gte`
    Gte,
    /// `$lt`
    Lt,
    /// `$lte`
    Lte,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Or,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => OP_EQ,
            Operator::Ne => OP_NE,
            Operator::Or => OP_OR,
            Operator::Gt => OP_GT,
            Operator::Gte => OP_GTE,
            Operator::Lt => OP_LT,
            Operator::Lte => OP_LTE,
        }
    }

    /// Resolves an operator from its symbol.
    pub fn from_symbol(symbol: &str) -> PocketResult<Operator> {
        Operator::ALL
            .iter()
            .find(|op| op.symbol() == symbol)
            .copied()
            .ok_or_else(|| {
                log::error!("Unrecognised operator '{}'", symbol);
                PocketError::new(
                    &format!("Unrecognised operator '{}'", symbol),
                    ErrorKind::UnsupportedOperator,
                )
            })
    }

    /// Checks that `operand` has the shape this operator needs.
    pub(crate) fn validate_operand(&self, operand: &Value) -> PocketResult<()> {
        match (self, operand) {
            (Operator::Or, Value::Array(_)) => Ok(()),
            (Operator::Or, other) => {
                log::error!("Operator '{}' expects an array, found {}", OP_OR, other);
                Err(PocketError::new(
                    &format!("Operator '{}' expects an array operand", OP_OR),
                    ErrorKind::MalformedOperatorArgument,
                ))
            }
            _ => Ok(()),
        }
    }

    /// Evaluates `value <op> operand`.
    pub fn apply(&self, value: &Value, operand: &Value) -> bool {
        match self {
            Operator::Eq => loose_eq(value, operand),
            Operator::Ne => !loose_eq(value, operand),
            Operator::Or => match operand {
                Value::Array(choices) => choices.iter().any(|choice| loose_eq(value, choice)),
                _ => false,
            },
            Operator::Gt => compare(value, operand) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                compare(value, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => compare(value, operand) == Some(Ordering::Less),
            Operator::Lte => matches!(
                compare(value, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
