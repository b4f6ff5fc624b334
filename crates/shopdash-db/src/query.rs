//! # Query Contract
//!
//! One structured query object, interpreted by exactly one function per
//! backend.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Query                                                                  │
//! │  ├── filters:  [Filter { field, condition }]   (all must match)         │
//! │  │             condition ∈ Eq | In | Gte | Lte                          │
//! │  ├── order_by: Option<OrderBy { field, Asc | Desc }>                    │
//! │  └── limit:    Option<usize>                                            │
//! │                                                                         │
//! │        │                                    │                           │
//! │        ▼                                    ▼                           │
//! │  apply_query (MemoryStore)          push_query (SQLite, QueryBuilder)   │
//! │  filters a slice of rows            appends WHERE / ORDER BY / LIMIT    │
//! │                                     with bound parameters only          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names are checked against [`Record::FIELDS`] before anything runs,
//! so a typo is an [`DbError::InvalidQuery`] on both backends and no
//! caller-supplied text ever reaches SQL.
//!
//! ## NULL Ordering
//! Missing values sort first in ascending order and last in descending
//! order, which is what SQLite does.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use shopdash_core::{
    Contact, CustomerType, DailySalesPoint, DiscountType, Order, OrderStatus, Payment,
    PaymentProvider, PaymentStatus, Product, Promotion, Review,
};

use crate::error::{DbError, DbResult};

// =============================================================================
// Values
// =============================================================================

/// A comparable field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

/// The type of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Bool,
    Timestamp,
    Date,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Int => "integer",
            FieldKind::Bool => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Date => "date",
        }
    }
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Text(_) => FieldKind::Text,
            Value::Int(_) => FieldKind::Int,
            Value::Bool(_) => FieldKind::Bool,
            Value::Timestamp(_) => FieldKind::Timestamp,
            Value::Date(_) => FieldKind::Date,
        }
    }

    /// Compares two values of the same kind.
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn push_bind(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Value::Text(v) => builder.push_bind(v.clone()),
            Value::Int(v) => builder.push_bind(*v),
            Value::Bool(v) => builder.push_bind(*v),
            Value::Timestamp(v) => builder.push_bind(*v),
            Value::Date(v) => builder.push_bind(*v),
        };
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

macro_rules! text_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Text(v.as_str().to_string())
                }
            }
        )+
    };
}

text_value!(CustomerType, OrderStatus, PaymentProvider, PaymentStatus, DiscountType);

// =============================================================================
// Query
// =============================================================================

/// How a filter matches a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Eq(Value),
    /// Matches any of the values. An empty list matches nothing.
    In(Vec<Value>),
    Gte(Value),
    Lte(Value),
}

impl Condition {
    fn values(&self) -> &[Value] {
        match self {
            Condition::Eq(v) | Condition::Gte(v) | Condition::Lte(v) => std::slice::from_ref(v),
            Condition::In(values) => values,
        }
    }

    fn matches(&self, actual: Option<&Value>) -> bool {
        // NULL never satisfies a comparison, as in SQL
        let Some(actual) = actual else {
            return false;
        };
        match self {
            Condition::Eq(v) => actual.compare(v) == Some(Ordering::Equal),
            Condition::In(values) => values
                .iter()
                .any(|v| actual.compare(v) == Some(Ordering::Equal)),
            Condition::Gte(v) => matches!(
                actual.compare(v),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Condition::Lte(v) => matches!(
                actual.compare(v),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Structured read query over one entity set.
///
/// ## Example
/// ```rust
/// use shopdash_core::OrderStatus;
/// use shopdash_db::query::{Direction, Query};
///
/// let query = Query::new()
///     .is_in("status", [OrderStatus::Paid, OrderStatus::Delivered])
///     .order_by("created_at", Direction::Desc)
///     .limit(20);
/// assert_eq!(query.filters.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    /// A query matching every row.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, Condition::Eq(value.into()))
    }

    pub fn is_in<V: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(field, Condition::In(values))
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, Condition::Gte(value.into()))
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, Condition::Lte(value.into()))
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn filter(mut self, field: &str, condition: Condition) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            condition,
        });
        self
    }

    /// Checks every field name and value type against `R`.
    pub fn validate<R: Record>(&self) -> DbResult<()> {
        for filter in &self.filters {
            let kind = field_kind::<R>(&filter.field)?;
            for value in filter.condition.values() {
                if value.kind() != kind {
                    return Err(DbError::invalid_query(
                        R::TABLE,
                        format!(
                            "field '{}' is {}, got a {} value",
                            filter.field,
                            kind.name(),
                            value.kind().name()
                        ),
                    ));
                }
            }
        }
        if let Some(order) = &self.order_by {
            field_kind::<R>(&order.field)?;
        }
        Ok(())
    }
}

// =============================================================================
// Record
// =============================================================================

/// An entity the query contract can filter and sort.
pub trait Record: Clone {
    /// Table (or view) holding the entity.
    const TABLE: &'static str;

    /// Queryable columns and their types.
    const FIELDS: &'static [(&'static str, FieldKind)];

    /// Column breaking ties after `ORDER BY`, so SQL keeps insertion order
    /// like the in-memory sort does.
    const TIE_BREAK: &'static str = "rowid";

    /// Value of a queryable field; `None` for NULL or unknown names.
    fn field(&self, name: &str) -> Option<Value>;
}

fn field_kind<R: Record>(name: &str) -> DbResult<FieldKind> {
    R::FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| DbError::invalid_query(R::TABLE, format!("unknown field '{}'", name)))
}

/// Column name as a `'static` string from the whitelist.
fn column<R: Record>(name: &str) -> DbResult<&'static str> {
    R::FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(field, _)| *field)
        .ok_or_else(|| DbError::invalid_query(R::TABLE, format!("unknown field '{}'", name)))
}

// =============================================================================
// In-Memory Interpretation
// =============================================================================

/// Runs `query` over `rows`.
///
/// Sorting is stable, so rows that compare equal keep their input order.
pub fn apply_query<R: Record>(rows: &[R], query: &Query) -> DbResult<Vec<R>> {
    query.validate::<R>()?;

    let mut matched: Vec<R> = rows
        .iter()
        .filter(|row| {
            query
                .filters
                .iter()
                .all(|f| f.condition.matches(row.field(&f.field).as_ref()))
        })
        .cloned()
        .collect();

    if let Some(order) = &query.order_by {
        matched.sort_by(|a, b| {
            let ordering = compare_nullable(a.field(&order.field), b.field(&order.field));
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = query.limit {
        matched.truncate(limit);
    }

    Ok(matched)
}

fn compare_nullable(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
    }
}

// =============================================================================
// SQL Interpretation
// =============================================================================

/// Appends `WHERE`, `ORDER BY` and `LIMIT` clauses for `query` to `builder`.
///
/// The builder must already hold `SELECT ... FROM <R::TABLE>`. Column names
/// come from [`Record::FIELDS`]; every value is a bound parameter.
pub fn push_query<R: Record>(builder: &mut QueryBuilder<'_, Sqlite>, query: &Query) -> DbResult<()> {
    query.validate::<R>()?;

    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        let column = column::<R>(&filter.field)?;

        match &filter.condition {
            Condition::Eq(value) => {
                builder.push(column).push(" = ");
                value.push_bind(builder);
            }
            Condition::Gte(value) => {
                builder.push(column).push(" >= ");
                value.push_bind(builder);
            }
            Condition::Lte(value) => {
                builder.push(column).push(" <= ");
                value.push_bind(builder);
            }
            Condition::In(values) if values.is_empty() => {
                builder.push("0 = 1");
            }
            Condition::In(values) => {
                builder.push(column).push(" IN (");
                for (j, value) in values.iter().enumerate() {
                    if j > 0 {
                        builder.push(", ");
                    }
                    value.push_bind(builder);
                }
                builder.push(")");
            }
        }
    }

    if let Some(order) = &query.order_by {
        let column = column::<R>(&order.field)?;
        builder.push(" ORDER BY ").push(column).push(match order.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
        builder.push(", ").push(R::TIE_BREAK).push(" ASC");
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }

    Ok(())
}

// =============================================================================
// Record Implementations
// =============================================================================

fn opt<T: Into<Value>>(value: Option<T>) -> Option<Value> {
    value.map(Into::into)
}

impl Record for Contact {
    const TABLE: &'static str = "contacts";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("id", FieldKind::Text),
        ("username", FieldKind::Text),
        ("full_name", FieldKind::Text),
        ("email", FieldKind::Text),
        ("customer_type", FieldKind::Text),
        ("total_messages", FieldKind::Int),
        ("created_at", FieldKind::Timestamp),
        ("last_contact_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.clone().into()),
            "username" => Some(self.username.clone().into()),
            "full_name" => Some(self.full_name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "customer_type" => Some(self.customer_type.into()),
            "total_messages" => Some(self.total_messages.into()),
            "created_at" => Some(self.created_at.into()),
            "last_contact_at" => opt(self.last_contact_at),
            _ => None,
        }
    }
}

impl Record for Order {
    const TABLE: &'static str = "orders";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("id", FieldKind::Text),
        ("order_number", FieldKind::Text),
        ("contact_id", FieldKind::Text),
        ("status", FieldKind::Text),
        ("total_cents", FieldKind::Int),
        ("created_at", FieldKind::Timestamp),
        ("paid_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.clone().into()),
            "order_number" => Some(self.order_number.clone().into()),
            "contact_id" => Some(self.contact_id.clone().into()),
            "status" => Some(self.status.into()),
            "total_cents" => Some(self.total_cents.into()),
            "created_at" => Some(self.created_at.into()),
            "paid_at" => opt(self.paid_at),
            _ => None,
        }
    }
}

impl Record for Payment {
    const TABLE: &'static str = "payments";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("id", FieldKind::Text),
        ("order_id", FieldKind::Text),
        ("provider", FieldKind::Text),
        ("transaction_id", FieldKind::Text),
        ("payment_status", FieldKind::Text),
        ("amount_cents", FieldKind::Int),
        ("created_at", FieldKind::Timestamp),
        ("completed_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.clone().into()),
            "order_id" => Some(self.order_id.clone().into()),
            "provider" => Some(self.provider.into()),
            "transaction_id" => Some(self.transaction_id.clone().into()),
            "payment_status" => Some(self.payment_status.into()),
            "amount_cents" => Some(self.amount_cents.into()),
            "created_at" => Some(self.created_at.into()),
            "completed_at" => opt(self.completed_at),
            _ => None,
        }
    }
}

impl Record for Product {
    const TABLE: &'static str = "products";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("id", FieldKind::Text),
        ("sku", FieldKind::Text),
        ("name", FieldKind::Text),
        ("category", FieldKind::Text),
        ("price_cents", FieldKind::Int),
        ("stock_quantity", FieldKind::Int),
        ("is_active", FieldKind::Bool),
        ("is_featured", FieldKind::Bool),
        ("created_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.clone().into()),
            "sku" => opt(self.sku.clone()),
            "name" => Some(self.name.clone().into()),
            "category" => Some(self.category.clone().into()),
            "price_cents" => Some(self.price_cents.into()),
            "stock_quantity" => Some(self.stock_quantity.into()),
            "is_active" => Some(self.is_active.into()),
            "is_featured" => Some(self.is_featured.into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl Record for Promotion {
    const TABLE: &'static str = "promotions";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("id", FieldKind::Text),
        ("name", FieldKind::Text),
        ("discount_type", FieldKind::Text),
        ("start_date", FieldKind::Date),
        ("end_date", FieldKind::Date),
        ("is_active", FieldKind::Bool),
        ("created_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.clone().into()),
            "name" => Some(self.name.clone().into()),
            "discount_type" => Some(self.discount_type.into()),
            "start_date" => Some(self.start_date.into()),
            "end_date" => Some(self.end_date.into()),
            "is_active" => Some(self.is_active.into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl Record for Review {
    const TABLE: &'static str = "reviews";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("id", FieldKind::Text),
        ("contact_id", FieldKind::Text),
        ("order_id", FieldKind::Text),
        ("rating", FieldKind::Int),
        ("created_at", FieldKind::Timestamp),
    ];

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.clone().into()),
            "contact_id" => Some(self.contact_id.clone().into()),
            "order_id" => opt(self.order_id.clone()),
            "rating" => Some(self.rating.into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl Record for DailySalesPoint {
    const TABLE: &'static str = "daily_sales";
    // Views have no rowid; one row per date anyway
    const TIE_BREAK: &'static str = "sale_date";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("sale_date", FieldKind::Date),
        ("total_orders", FieldKind::Int),
        ("revenue_cents", FieldKind::Int),
        ("unique_customers", FieldKind::Int),
    ];

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "sale_date" => Some(self.sale_date.into()),
            "total_orders" => Some(self.total_orders.into()),
            "revenue_cents" => Some(self.revenue_cents.into()),
            "unique_customers" => Some(self.unique_customers.into()),
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn review(id: &str, rating: i64, order_id: Option<&str>, day: u32) -> Review {
        Review {
            id: id.to_string(),
            contact_id: "c1".to_string(),
            order_id: order_id.map(str::to_string),
            rating,
            comment: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Review> {
        vec![
            review("r1", 5, Some("o1"), 1),
            review("r2", 3, None, 2),
            review("r3", 4, Some("o2"), 3),
            review("r4", 5, Some("o3"), 4),
        ]
    }

    fn ids(rows: &[Review]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let rows = apply_query(&sample(), &Query::new()).unwrap();
        assert_eq!(ids(&rows), vec!["r1", "r2", "r3", "r4"]);
    }

    #[test]
    fn test_filters_are_combined() {
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 3, 23, 0, 0).unwrap();
        let query = Query::new().gte("rating", 4_i64).lte("created_at", cutoff);
        let rows = apply_query(&sample(), &query).unwrap();
        assert_eq!(ids(&rows), vec!["r1", "r3"]);
    }

    #[test]
    fn test_in_condition() {
        let query = Query::new().is_in("order_id", ["o1", "o3"]);
        assert_eq!(ids(&apply_query(&sample(), &query).unwrap()), vec!["r1", "r4"]);

        let none: [&str; 0] = [];
        let query = Query::new().is_in("order_id", none);
        assert!(apply_query(&sample(), &query).unwrap().is_empty());
    }

    #[test]
    fn test_null_never_matches() {
        let query = Query::new().lte("order_id", "zzz");
        let rows = apply_query(&sample(), &query).unwrap();
        assert!(!ids(&rows).contains(&"r2"));
    }

    #[test]
    fn test_order_and_limit() {
        let query = Query::new().order_by("rating", Direction::Desc).limit(3);
        let rows = apply_query(&sample(), &query).unwrap();
        // Stable: r1 before r4 among the fives
        assert_eq!(ids(&rows), vec!["r1", "r4", "r3"]);
    }

    #[test]
    fn test_nulls_sort_first_ascending() {
        let query = Query::new().order_by("order_id", Direction::Asc);
        let rows = apply_query(&sample(), &query).unwrap();
        assert_eq!(rows[0].id, "r2");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = apply_query(&sample(), &Query::new().eq("stars", 5_i64)).unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery { .. }));

        let err = apply_query(&sample(), &Query::new().order_by("stars", Direction::Asc)).unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery { .. }));
    }

    #[test]
    fn test_mismatched_value_type_is_rejected() {
        let err = apply_query(&sample(), &Query::new().eq("rating", "five")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid query on reviews: field 'rating' is integer, got a text value"
        );
    }

    #[test]
    fn test_enum_values_use_wire_names() {
        assert_eq!(Value::from(OrderStatus::PendingPayment), Value::Text("pending_payment".to_string()));
        assert_eq!(Value::from(CustomerType::Vip), Value::Text("vip".to_string()));
    }

    #[test]
    fn test_push_query_binds_values() {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM reviews");
        let query = Query::new()
            .eq("contact_id", "c1")
            .is_in("rating", [4_i64, 5])
            .order_by("created_at", Direction::Desc)
            .limit(10);
        push_query::<Review>(&mut builder, &query).unwrap();

        assert_eq!(
            builder.sql(),
            "SELECT * FROM reviews WHERE contact_id = ? AND rating IN (?, ?) \
             ORDER BY created_at DESC, rowid ASC LIMIT ?"
        );
    }

    #[test]
    fn test_push_query_empty_in() {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM reviews");
        let none: [i64; 0] = [];
        push_query::<Review>(&mut builder, &Query::new().is_in("rating", none)).unwrap();
        assert_eq!(builder.sql(), "SELECT * FROM reviews WHERE 0 = 1");
    }
}
