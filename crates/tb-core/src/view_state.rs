//! # View State Reconciler
//!
//! The URL query string is the single source of truth for table state on
//! navigation; between navigations the filter-builder UI edits an in-memory
//! selection. This module is the pure state machine between the two: it
//! rebuilds the selection from a query string, measures how far the live
//! state has diverged from the selected (or default) view, and produces the
//! transition that applying a view means.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::fields::{FieldDef, LogicalOperator, TableField};
use crate::filter::params::{is_filtered, FilterParams};
use crate::filter::token;
use crate::models::View;

/// The live, editable representation of one filter chip in the builder UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedOption<F: TableField> {
    pub field: F,
    pub label: String,
    /// Discrete choices offered for categorical fields; empty for free text.
    pub choices: Vec<String>,
    pub filter_values: Vec<String>,
    pub filter_operator: Option<String>,
    pub is_multi: bool,
}

/// In-memory UI state for one table, rehydrated from the URL on navigation.
#[derive(Debug, Clone)]
pub struct TableState<F: TableField> {
    pub selected: Vec<SelectedOption<F>>,
    pub filter_builder_open: bool,
    pub view_id: Option<Uuid>,
}

impl<F: TableField> Default for TableState<F> {
    fn default() -> Self {
        TableState { selected: Vec::new(), filter_builder_open: false, view_id: None }
    }
}

/// How the live selection relates to the selected view (or the default
/// state when no view is selected). The three flags drive three mutually
/// exclusive UI affordances, so their exact combinators matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub is_filtered: bool,
    pub is_columns_updated: bool,
    pub is_updated: bool,
}

/// The effect of selecting a view: a total column-visibility reset plus the
/// query string that reproduces the view's filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTransition {
    pub column_visibility: BTreeMap<&'static str, bool>,
    pub url_query: String,
}

impl<F: TableField> TableState<F> {
    /// Rebuilds the selection from a navigated-to query string. Every key is
    /// checked against the field registry; unknown keys are ignored. Calling
    /// this twice with the same query is a no-op the second time, so rapid
    /// repeated navigation cannot double-apply.
    pub fn on_navigate(&mut self, query: &[(String, String)], defs: &[FieldDef<F>]) {
        self.selected = selected_options_from_query(query, defs);
        self.view_id = query
            .iter()
            .find(|(key, _)| key == "viewId")
            .and_then(|(_, value)| Uuid::parse_str(value).ok());

        if !self.selected.is_empty() {
            self.filter_builder_open = true;
        }
    }

    /// The `FilterParams` equivalent of the current selection, with the
    /// operator and sort taken from the live query string.
    pub fn filter_params(&self, query: &[(String, String)]) -> FilterParams<F> {
        let operator = query
            .iter()
            .find(|(key, _)| key == "operator")
            .map(|(_, value)| LogicalOperator::parse(value))
            .unwrap_or_default();
        let sort = query
            .iter()
            .find(|(key, _)| key == "sort")
            .map(|(_, value)| value.as_str());

        FilterParams::from_selected_options(&self.selected, operator, sort)
    }
}

/// Decodes every recognized filter key of a query string into a selection,
/// in query order.
pub fn selected_options_from_query<F: TableField>(
    query: &[(String, String)],
    defs: &[FieldDef<F>],
) -> Vec<SelectedOption<F>> {
    query
        .iter()
        .filter_map(|(key, value)| {
            let def = defs.iter().find(|def| def.field.as_str() == key)?;
            let decoded = token::decode(value);
            Some(SelectedOption {
                field: def.field,
                label: def.label.to_string(),
                choices: def.choices.iter().map(|c| c.to_string()).collect(),
                filter_values: decoded.values,
                filter_operator: decoded.operator,
                is_multi: decoded.is_multi,
            })
        })
        .collect()
}

/// Measures the live state against the selected view, or against the
/// default (unfiltered, default-columns) state when no view is selected.
pub fn compute_divergence<F: TableField>(
    query: &[(String, String)],
    current_view: Option<&View<F>>,
    live_params: &FilterParams<F>,
    live_columns: &[String],
) -> Divergence {
    let is_columns_updated = match current_view {
        Some(view) => view.columns.as_deref() != Some(live_columns),
        None => F::DEFAULT_COLUMNS != live_columns,
    };

    let view_params = current_view.and_then(|view| view.filter_params.as_ref());
    let is_updated = view_params != Some(live_params) || is_columns_updated;

    Divergence {
        is_filtered: is_filtered::<F>(query),
        is_columns_updated,
        is_updated,
    }
}

/// Applying a view is a total reset: columns the view does not list become
/// hidden (a view without a captured column set hides everything hideable),
/// and the URL is recomputed from the view's filters with its id attached.
pub fn select_view<F: TableField>(view: &View<F>) -> ViewTransition {
    let column_visibility = F::DEFAULT_COLUMNS
        .iter()
        .map(|column| {
            let visible = view
                .columns
                .as_ref()
                .is_some_and(|columns| columns.iter().any(|c| c == column));
            (*column, visible)
        })
        .collect();

    let params = view.filter_params.clone().unwrap_or_default();

    ViewTransition {
        column_visibility,
        url_query: params.to_url_query(Some(view.id)),
    }
}

/// Leaving view mode resets visibility to "no overrides" (everything
/// visible) rather than to the nominal default column list. "No view" and
/// "default view" are intentionally not the same state.
pub fn clear_to_default() -> BTreeMap<&'static str, bool> {
    BTreeMap::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{PostField, POST_FIELD_DEFS};
    use crate::filter::params::parse_query;
    use chrono::Utc;

    fn state_from(query: &str) -> TableState<PostField> {
        let mut state = TableState::default();
        state.on_navigate(&parse_query(query), POST_FIELD_DEFS);
        state
    }

    fn view(
        columns: Option<&[&str]>,
        filter_params: Option<FilterParams<PostField>>,
    ) -> View<PostField> {
        View {
            id: Uuid::new_v4(),
            name: "mine".into(),
            columns: columns.map(|c| c.iter().map(|s| s.to_string()).collect()),
            filter_params,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn navigate_decodes_recognized_keys() {
        let state = state_from("?authorName=al~contains~multi&operator=and&page=2");

        assert_eq!(state.selected.len(), 1);
        let option = &state.selected[0];
        assert_eq!(option.field, PostField::AuthorName);
        assert_eq!(option.filter_values, strings(&["al"]));
        assert_eq!(option.filter_operator.as_deref(), Some("contains"));
        assert!(option.is_multi);
        assert!(state.filter_builder_open);
    }

    #[test]
    fn navigate_is_idempotent() {
        let query = parse_query("?title=kick~contains&status=draft~eq~multi");
        let mut state = TableState::default();
        state.on_navigate(&query, POST_FIELD_DEFS);
        let first = state.selected.clone();
        state.on_navigate(&query, POST_FIELD_DEFS);
        assert_eq!(state.selected, first);
    }

    #[test]
    fn navigate_ignores_unknown_keys_and_bad_view_id() {
        let state = state_from("?label=bug~eq&viewId=not-a-uuid");
        assert!(state.selected.is_empty());
        assert_eq!(state.view_id, None);
    }

    #[test]
    fn url_round_trip_reconstructs_selection() {
        let original = state_from("?title=kick~contains&status=draft.published~eq~multi&operator=or&sort=title.asc");
        let query = parse_query("?operator=or&sort=title.asc");
        let params = original.filter_params(&query);

        let url = params.to_url_query(None);
        let reparsed = state_from(&format!("?{url}"));

        assert_eq!(reparsed.selected, original.selected);
        let reparams = reparsed.filter_params(&parse_query(&url));
        assert_eq!(reparams, params);
    }

    #[test]
    fn divergence_against_default_state() {
        let query = parse_query("?page=1&per_page=10");
        let live = FilterParams::default();
        let columns = strings(PostField::DEFAULT_COLUMNS);

        let div = compute_divergence::<PostField>(&query, None, &live, &columns);
        assert!(!div.is_filtered);
        assert!(!div.is_columns_updated);
        // No view selected: live params can never equal a view's params.
        assert!(div.is_updated);
    }

    #[test]
    fn divergence_against_matching_view() {
        let state = state_from("?title=kick~contains&operator=and");
        let query = parse_query("?title=kick~contains&operator=and");
        let live = state.filter_params(&query);
        let v = view(
            Some(&["title", "status", "createdAt"]),
            Some(live.clone()),
        );

        let columns = strings(&["title", "status", "createdAt"]);
        let div = compute_divergence(&query, Some(&v), &live, &columns);
        assert!(div.is_filtered);
        assert!(!div.is_columns_updated);
        assert!(!div.is_updated);

        // Hiding a column flips both column and update flags.
        let narrowed = strings(&["title", "createdAt"]);
        let div = compute_divergence(&query, Some(&v), &live, &narrowed);
        assert!(div.is_columns_updated);
        assert!(div.is_updated);
    }

    #[test]
    fn select_view_is_a_total_reset() {
        let v = view(Some(&["title", "createdAt"]), None);
        let transition = select_view(&v);

        assert_eq!(transition.column_visibility.get("title"), Some(&true));
        assert_eq!(transition.column_visibility.get("status"), Some(&false));
        assert_eq!(transition.column_visibility.get("commentsNumber"), Some(&false));

        // A view without filters still yields a navigable URL.
        let pairs = parse_query(&transition.url_query);
        assert!(pairs.contains(&("page".into(), "1".into())));
        assert!(pairs.contains(&("viewId".into(), v.id.to_string())));
    }

    #[test]
    fn clearing_view_clears_overrides_instead_of_restoring_defaults() {
        assert!(clear_to_default().is_empty());
    }
}
