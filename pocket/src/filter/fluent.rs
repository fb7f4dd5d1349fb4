use serde_json::Value;

use super::{Condition, Operator, Query};

/// Starts a query on a single field.
///
/// ```rust,ignore
/// let query = field("age").gt(17).and(field("surname").eq("Bar"));
/// let adults = patients.find(query)?;
/// ```
pub fn field(field_name: &str) -> FluentField {
    FluentField {
        field_name: field_name.to_string(),
    }
}

/// A field awaiting its operator. Each method yields a one-condition
/// [Query] that can be combined with [Query::and].
pub struct FluentField {
    field_name: String,
}

impl FluentField {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Query {
        self.build(Operator::Eq, value.into())
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Query {
        self.build(Operator::Ne, value.into())
    }

    /// Matches when the field loosely equals any of `values`.
    pub fn or<T: Into<Value>>(self, values: Vec<T>) -> Query {
        let choices = values.into_iter().map(Into::into).collect();
        self.build(Operator::Or, Value::Array(choices))
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Query {
        self.build(Operator::Gt, value.into())
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Query {
        self.build(Operator::Gte, value.into())
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Query {
        self.build(Operator::Lt, value.into())
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Query {
        self.build(Operator::Lte, value.into())
    }

    fn build(self, operator: Operator, operand: Value) -> Query {
        Query::from(Condition::unchecked(self.field_name, operator, operand))
    }
}

/// The query that matches every document.
pub fn all() -> Query {
    Query::all()
}
