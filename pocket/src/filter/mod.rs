//! Query evaluation for selecting documents from collections.
//!
//! Queries are built from JSON objects or from the fluent API:
//! - `doc!{ "surname": "Bar" }` - loose equality
//! - `doc!{ "age": { "$gt": 17 } }` - an operator mapping
//! - `field("age").gt(17).and(field("surname").eq("Bar"))` - fluent conjunction
//! - `all()` or `doc!{}` - match every document
//!
//! # Supported Operators
//!
//! - **Equality**: `$eq`, `$ne`
//! - **Membership**: `$or` (operand is an array of choices)
//! - **Comparison**: `$gt`, `$gte`, `$lt`, `$lte`
//!
//! Conditions combine by AND. Any other operator symbol is rejected with
//! `ErrorKind::UnsupportedOperator` while the query is parsed.

mod comparison;
mod fluent;
mod operator;
mod query;

pub use fluent::*;
pub use operator::*;
pub use query::*;
