//! # Query Predicate Builder
//!
//! Pure translation from a parsed search query into an executable
//! predicate/order/limit triple. Nothing here touches the database; the
//! record-store adapter renders the `Predicate` tree into whatever its
//! backend composes conditions with.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::fields::{LogicalOperator, TableField};
use crate::filter::token;

/// A composable boolean condition over the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every record. The empty filter set is a no-op, not an error.
    All,
    /// Case-insensitive substring match.
    Contains { column: &'static str, value: String },
    NotContains { column: &'static str, value: String },
    StartsWith { column: &'static str, value: String },
    EndsWith { column: &'static str, value: String },
    Eq { column: &'static str, value: String },
    NotEq { column: &'static str, value: String },
    /// Membership test for categorical fields.
    InSet { column: &'static str, values: Vec<String> },
    NotInSet { column: &'static str, values: Vec<String> },
    /// Closed interval on a date column (both bounds inclusive).
    Between { column: &'static str, from: NaiveDate, to: NaiveDate },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// Column and direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

/// A fully parsed list request: pagination, sort, date range, combinator and
/// the raw token per recognized filter field.
///
/// `page` and `per_page` must be clamped to >= 1 by the caller (the API
/// boundary does this); the builder trusts them.
#[derive(Debug, Clone)]
pub struct SearchQuery<F: TableField> {
    pub page: i64,
    pub per_page: i64,
    pub sort: Option<String>,
    pub operator: LogicalOperator,
    pub from: Option<String>,
    pub to: Option<String>,
    pub view_id: Option<Uuid>,
    pub filters: Vec<(F, String)>,
}

impl<F: TableField> Default for SearchQuery<F> {
    fn default() -> Self {
        SearchQuery {
            page: 1,
            per_page: crate::filter::params::DEFAULT_PER_PAGE,
            sort: None,
            operator: LogicalOperator::And,
            from: None,
            to: None,
            view_id: None,
            filters: Vec::new(),
        }
    }
}

impl<F: TableField> SearchQuery<F> {
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Resolves the `"field.direction"` sort string against the entity's
    /// real columns. Absent sort falls back to newest-first; an unknown
    /// field falls back to descending by id so pagination stays
    /// deterministic on bad input. Never errors.
    pub fn order_by(&self) -> OrderBy {
        let Some(sort) = self.sort.as_deref() else {
            return OrderBy { column: "created_at", descending: true };
        };

        let mut parts = sort.split('.').filter(|p| !p.is_empty());
        let column = parts.next().and_then(F::sort_column);
        let descending = parts.next() != Some("asc");

        match column {
            Some(column) => OrderBy { column, descending },
            None => OrderBy { column: "id", descending: true },
        }
    }

    /// Builds the single predicate for this query: one condition per
    /// non-empty filter, plus a closed date interval when both bounds are
    /// present, combined with the chosen operator.
    pub fn predicate(&self) -> Predicate {
        let mut conditions: Vec<Predicate> = self
            .filters
            .iter()
            .filter_map(|(field, raw)| filter_column(*field, raw))
            .collect();

        let from = self.from.as_deref().and_then(parse_day);
        let to = self.to.as_deref().and_then(parse_day);
        if let (Some(from), Some(to)) = (from, to) {
            conditions.push(Predicate::Between { column: "created_at", from, to });
        }

        match conditions.len() {
            0 => Predicate::All,
            1 => conditions.remove(0),
            _ => match self.operator {
                LogicalOperator::And => Predicate::And(conditions),
                LogicalOperator::Or => Predicate::Or(conditions),
            },
        }
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Turns one field's raw token into a column condition.
///
/// Selectable fields always filter by membership; numeric fields by exact
/// match; text fields by the comparison named in the token, defaulting to a
/// case-insensitive contains. An empty token contributes nothing.
fn filter_column<F: TableField>(field: F, raw: &str) -> Option<Predicate> {
    let decoded = token::decode(raw);
    if decoded.values.is_empty() {
        return None;
    }

    let column = field.column();
    let operator = decoded.operator.as_deref().unwrap_or("");

    if field.is_selectable() {
        return Some(match operator {
            "notEq" => Predicate::NotInSet { column, values: decoded.values },
            _ => Predicate::InSet { column, values: decoded.values },
        });
    }

    // Single raw value from here on; extra dot segments are rejoined so the
    // original text survives.
    let value = decoded.values.join(".");

    if field.is_numeric() {
        return Some(match operator {
            "notEq" => Predicate::NotEq { column, value },
            _ => Predicate::Eq { column, value },
        });
    }

    Some(match operator {
        "eq" => Predicate::Eq { column, value },
        "notEq" => Predicate::NotEq { column, value },
        "startsWith" => Predicate::StartsWith { column, value },
        "endsWith" => Predicate::EndsWith { column, value },
        "notIlike" => Predicate::NotContains { column, value },
        _ => Predicate::Contains { column, value },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::PostField;

    #[test]
    fn empty_query_matches_everything() {
        let query = SearchQuery::<PostField>::default();
        assert_eq!(query.predicate(), Predicate::All);
        assert_eq!(query.order_by(), OrderBy { column: "created_at", descending: true });
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn title_contains_or_status_in_set() {
        let query = SearchQuery {
            operator: LogicalOperator::Or,
            filters: vec![
                (PostField::Title, "kick".to_string()),
                (PostField::Status, "draft.published~eq~multi".to_string()),
            ],
            ..SearchQuery::default()
        };

        assert_eq!(
            query.predicate(),
            Predicate::Or(vec![
                Predicate::Contains { column: "title", value: "kick".into() },
                Predicate::InSet {
                    column: "status",
                    values: vec!["draft".into(), "published".into()],
                },
            ])
        );
        // No sort given: newest first.
        assert_eq!(query.order_by(), OrderBy { column: "created_at", descending: true });
    }

    #[test]
    fn single_condition_is_not_wrapped() {
        let query = SearchQuery {
            filters: vec![(PostField::AuthorName, "al~contains".to_string())],
            ..SearchQuery::default()
        };
        assert_eq!(
            query.predicate(),
            Predicate::Contains { column: "author_name", value: "al".into() }
        );
    }

    #[test]
    fn numeric_field_matches_exactly() {
        let query = SearchQuery {
            filters: vec![
                (PostField::CommentsNumber, "42~eq".to_string()),
                (PostField::Title, String::new()),
            ],
            ..SearchQuery::default()
        };
        // The empty title token contributes nothing.
        assert_eq!(
            query.predicate(),
            Predicate::Eq { column: "comments_number", value: "42".into() }
        );
    }

    #[test]
    fn date_range_requires_both_bounds() {
        let half_open = SearchQuery::<PostField> {
            from: Some("2024-02-01".into()),
            ..SearchQuery::default()
        };
        assert_eq!(half_open.predicate(), Predicate::All);

        let closed = SearchQuery::<PostField> {
            from: Some("2024-02-01".into()),
            to: Some("2024-03-01".into()),
            ..SearchQuery::default()
        };
        assert_eq!(
            closed.predicate(),
            Predicate::Between {
                column: "created_at",
                from: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            }
        );
    }

    #[test]
    fn sort_falls_back_on_unknown_column() {
        let bad = SearchQuery::<PostField> {
            sort: Some("label.asc".into()),
            ..SearchQuery::default()
        };
        assert_eq!(bad.order_by(), OrderBy { column: "id", descending: true });

        let good = SearchQuery::<PostField> {
            sort: Some("commentsNumber.asc".into()),
            ..SearchQuery::default()
        };
        assert_eq!(good.order_by(), OrderBy { column: "comments_number", descending: false });
    }

    #[test]
    fn pagination_offset() {
        let query = SearchQuery::<PostField> { page: 3, per_page: 20, ..SearchQuery::default() };
        assert_eq!(query.offset(), 40);
        assert_eq!(query.limit(), 20);
    }
}
