use serde_json::{Map, Value};

use super::Operator;
use crate::collection::Document;
use crate::errors::{ErrorKind, PocketError, PocketResult};

/// A single `field <operator> operand` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: String,
    operator: Operator,
    operand: Value,
}

impl Condition {
    /// Creates a condition, checking the operand shape against the operator.
    pub fn new(field: &str, operator: Operator, operand: Value) -> PocketResult<Self> {
        operator.validate_operand(&operand)?;
        Ok(Condition {
            field: field.to_string(),
            operator,
            operand,
        })
    }

    // skips operand validation for callers that build well-formed operands
    pub(crate) fn unchecked(field: String, operator: Operator, operand: Value) -> Self {
        Condition {
            field,
            operator,
            operand,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Value {
        &self.operand
    }

    /// A document satisfies the condition only if it has the field.
    pub fn matches(&self, document: &Document) -> bool {
        document.with_field(&self.field, |value| match value {
            Some(value) => self.operator.apply(value, &self.operand),
            None => false,
        })
    }

    /// A single-key mapping whose key starts with `$` names an operator.
    /// Any other value, objects included, is compared with `$eq`.
    fn parse(field: &str, value: &Value) -> PocketResult<Self> {
        if let Value::Object(mapping) = value {
            if mapping.len() == 1 {
                if let Some((symbol, operand)) = mapping.iter().next() {
                    if symbol.starts_with('$') {
                        let operator = Operator::from_symbol(symbol)?;
                        return Condition::new(field, operator, operand.clone());
                    }
                }
            }
        }
        Condition::new(field, Operator::Eq, value.clone())
    }
}

/// A conjunction of [Condition]s evaluated in order.
///
/// A query is parsed from a JSON object where each entry is either
/// `field: literal` (loose equality) or `field: { "$op": operand }`. The
/// empty object matches every document. Every operator is validated while
/// parsing, so a bad query fails before any document is read.
///
/// ```rust,ignore
/// let adults = Query::parse(&doc!{ "age": { "$gte": 18 }, "surname": "Bar" })?;
/// let same = field("age").gte(18).and(field("surname").eq("Bar"));
/// assert_eq!(adults, same);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    /// The query that matches every document.
    pub fn all() -> Self {
        Query::default()
    }

    pub fn parse(value: &Value) -> PocketResult<Self> {
        match value {
            Value::Object(mapping) => Query::parse_map(mapping),
            other => {
                log::error!("Query must be a JSON object, found {}", other);
                Err(PocketError::new(
                    "Query must be a JSON object",
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    pub fn parse_map(mapping: &Map<String, Value>) -> PocketResult<Self> {
        let conditions = mapping
            .iter()
            .map(|(field, value)| Condition::parse(field, value))
            .collect::<PocketResult<Vec<_>>>()?;
        Ok(Query { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Appends the conditions of `other`; both must hold.
    pub fn and(mut self, other: Query) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|condition| condition.matches(document))
    }

    /// Narrows `documents` one condition at a time, keeping their order.
    pub(crate) fn select(&self, documents: &[Document]) -> Vec<Document> {
        let mut candidates = documents.to_vec();
        for condition in &self.conditions {
            if candidates.is_empty() {
                break;
            }
            candidates.retain(|document| condition.matches(document));
        }
        candidates
    }
}

impl From<Condition> for Query {
    fn from(condition: Condition) -> Self {
        Query {
            conditions: vec![condition],
        }
    }
}

/// Conversion into a [Query], so collection reads accept JSON objects,
/// documents and prebuilt queries alike.
pub trait IntoQuery {
    fn into_query(self) -> PocketResult<Query>;
}

impl IntoQuery for Query {
    fn into_query(self) -> PocketResult<Query> {
        Ok(self)
    }
}

impl IntoQuery for &Query {
    fn into_query(self) -> PocketResult<Query> {
        Ok(self.clone())
    }
}

impl IntoQuery for Value {
    fn into_query(self) -> PocketResult<Query> {
        Query::parse(&self)
    }
}

impl IntoQuery for &Value {
    fn into_query(self) -> PocketResult<Query> {
        Query::parse(self)
    }
}

impl IntoQuery for Map<String, Value> {
    fn into_query(self) -> PocketResult<Query> {
        Query::parse_map(&self)
    }
}

/// Every field of the document, `_id` included, must match.
impl IntoQuery for &Document {
    fn into_query(self) -> PocketResult<Query> {
        Query::parse_map(&self.to_fields())
    }
}
