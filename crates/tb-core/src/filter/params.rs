//! # Filter Param Model
//!
//! `FilterParams` is the canonical serialization unit for table state: it is
//! what gets persisted as a view's `filter_params` column and what gets
//! reconstructed from a URL query string. The same value must survive both
//! trips, so the field set is validated here and everything unknown is
//! dropped rather than rejected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::{LogicalOperator, TableField};
use crate::filter::token;
use crate::view_state::SelectedOption;

/// Default page size for every table.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// The sort the table applies when the URL carries none.
pub const DEFAULT_SORT: &str = "createdAt.desc";

/// One persisted filter. `value` is itself an encoded token
/// (`values~operator`), keeping the persisted shape flat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterItem<F: TableField> {
    pub field: F,
    pub value: String,
    pub is_multi: bool,
}

/// Structured filter/sort state, as stored in a view row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams<F: TableField> {
    pub operator: Option<LogicalOperator>,
    pub sort: Option<String>,
    pub filters: Vec<FilterItem<F>>,
}

// Manual impl: the derive would demand `F: Default`, which the field enums
// deliberately do not have.
impl<F: TableField> Default for FilterParams<F> {
    fn default() -> Self {
        FilterParams { operator: None, sort: None, filters: Vec::new() }
    }
}

// The serde mirror keeps `field` a plain string so that stale or
// cross-entity payloads deserialize cleanly and drop their unknown fields.
#[derive(Serialize, Deserialize)]
struct RawFilterItem {
    field: String,
    value: String,
    #[serde(rename = "isMulti", default)]
    is_multi: bool,
}

#[derive(Serialize, Deserialize, Default)]
struct RawFilterParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<Vec<RawFilterItem>>,
}

impl<F: TableField> FilterParams<F> {
    /// Builds the params from the live filter chips plus the operator/sort
    /// currently in the URL. Options without any filter value are skipped;
    /// each kept option's values and comparison operator are folded into a
    /// single token string.
    pub fn from_selected_options(
        options: &[SelectedOption<F>],
        operator: LogicalOperator,
        sort: Option<&str>,
    ) -> Self {
        let filters = options
            .iter()
            .filter(|option| !option.filter_values.is_empty())
            .map(|option| FilterItem {
                field: option.field,
                value: token::encode(
                    &option.filter_values,
                    option.filter_operator.as_deref(),
                    false,
                ),
                is_multi: option.is_multi,
            })
            .collect();

        FilterParams {
            operator: Some(operator),
            sort: sort.map(str::to_string),
            filters,
        }
    }

    /// Renders the query string that reproduces this state: one
    /// `field=token` pair per filter (with the `~multi` marker re-attached),
    /// `operator`/`sort` when present, a forced first page with the default
    /// page size, and the owning view's id when one is associated.
    pub fn to_url_query(&self, view_id: Option<Uuid>) -> String {
        let mut qs = url::form_urlencoded::Serializer::new(String::new());

        for item in &self.filters {
            // Re-encode through the codec so a multi marker never collides
            // with the operator slot.
            let decoded = token::decode(&item.value);
            let value = token::encode(&decoded.values, decoded.operator.as_deref(), item.is_multi);
            qs.append_pair(item.field.as_str(), &value);
        }

        if let Some(operator) = self.operator {
            qs.append_pair("operator", operator.as_str());
        }
        if let Some(sort) = &self.sort {
            qs.append_pair("sort", sort);
        }

        qs.append_pair("page", "1");
        qs.append_pair("per_page", &DEFAULT_PER_PAGE.to_string());

        if let Some(id) = view_id {
            qs.append_pair("viewId", &id.to_string());
        }

        qs.finish()
    }

    /// Permissive JSON decode of a persisted payload. Filters whose field is
    /// not in this entity's fixed set are silently dropped.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let raw: RawFilterParams = serde_json::from_value(value.clone()).unwrap_or_default();
        FilterParams::from_raw(raw)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.to_raw()).unwrap_or(serde_json::Value::Null)
    }

    fn from_raw(raw: RawFilterParams) -> Self {
        FilterParams {
            operator: raw.operator.as_deref().map(LogicalOperator::parse),
            sort: raw.sort,
            filters: raw
                .filters
                .unwrap_or_default()
                .into_iter()
                .filter_map(|item| {
                    F::parse(&item.field).map(|field| FilterItem {
                        field,
                        value: item.value,
                        is_multi: item.is_multi,
                    })
                })
                .collect(),
        }
    }

    fn to_raw(&self) -> RawFilterParams {
        RawFilterParams {
            operator: self.operator.map(|op| op.as_str().to_string()),
            sort: self.sort.clone(),
            filters: Some(
                self.filters
                    .iter()
                    .map(|item| RawFilterItem {
                        field: item.field.as_str().to_string(),
                        value: item.value.clone(),
                        is_multi: item.is_multi,
                    })
                    .collect(),
            ),
        }
    }
}

impl<F: TableField> Serialize for FilterParams<F> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl<'de, F: TableField> Deserialize<'de> for FilterParams<F> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawFilterParams::deserialize(deserializer)?;
        Ok(FilterParams::from_raw(raw))
    }
}

/// Parses a query string (with or without a leading `?`) into ordered
/// key/value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// True iff the query string reflects a user-made filter choice: any
/// fixed-set field present, or a sort/operator other than the defaults.
/// The default sort and combinator deliberately do not count.
pub fn is_filtered<F: TableField>(query: &[(String, String)]) -> bool {
    query.iter().any(|(key, value)| match key.as_str() {
        "sort" => value != DEFAULT_SORT,
        "operator" => value != "and",
        other => F::parse(other).is_some(),
    })
}
