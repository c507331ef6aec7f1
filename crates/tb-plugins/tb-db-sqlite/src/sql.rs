//! Rendering of `Predicate` trees into parameterized SQLite fragments.
//!
//! Column names only ever come from the closed field enums in tb-core, so
//! interpolating them is safe; every user-supplied value is bound.

use tb_core::filter::predicate::{OrderBy, Predicate};

/// Renders a predicate into a boolean SQL expression plus its bind values,
/// in order of appearance.
pub(crate) fn where_clause(predicate: &Predicate) -> (String, Vec<String>) {
    let mut sql = String::new();
    let mut binds = Vec::new();
    render(predicate, &mut sql, &mut binds);
    (sql, binds)
}

fn render(predicate: &Predicate, sql: &mut String, binds: &mut Vec<String>) {
    match predicate {
        Predicate::All => sql.push_str("1 = 1"),
        Predicate::Contains { column, value } => {
            sql.push_str(&format!("instr(lower({column}), lower(?)) > 0"));
            binds.push(value.clone());
        }
        Predicate::NotContains { column, value } => {
            sql.push_str(&format!("instr(lower({column}), lower(?)) = 0"));
            binds.push(value.clone());
        }
        Predicate::StartsWith { column, value } => {
            sql.push_str(&format!("lower({column}) LIKE lower(?) || '%'"));
            binds.push(value.clone());
        }
        Predicate::EndsWith { column, value } => {
            sql.push_str(&format!("lower({column}) LIKE '%' || lower(?)"));
            binds.push(value.clone());
        }
        Predicate::Eq { column, value } => {
            sql.push_str(&format!("{column} = ?"));
            binds.push(value.clone());
        }
        Predicate::NotEq { column, value } => {
            sql.push_str(&format!("{column} <> ?"));
            binds.push(value.clone());
        }
        Predicate::InSet { column, values } => {
            render_in(column, values, false, sql, binds);
        }
        Predicate::NotInSet { column, values } => {
            render_in(column, values, true, sql, binds);
        }
        Predicate::Between { column, from, to } => {
            sql.push_str(&format!("date({column}) BETWEEN date(?) AND date(?)"));
            binds.push(from.format("%Y-%m-%d").to_string());
            binds.push(to.format("%Y-%m-%d").to_string());
        }
        Predicate::And(children) => render_group(children, " AND ", sql, binds),
        Predicate::Or(children) => render_group(children, " OR ", sql, binds),
    }
}

fn render_in(
    column: &str,
    values: &[String],
    negated: bool,
    sql: &mut String,
    binds: &mut Vec<String>,
) {
    if values.is_empty() {
        // IN () is a syntax error; an empty set matches nothing (or
        // everything when negated).
        sql.push_str(if negated { "1 = 1" } else { "1 = 0" });
        return;
    }

    let placeholders = vec!["?"; values.len()].join(", ");
    let keyword = if negated { "NOT IN" } else { "IN" };
    sql.push_str(&format!("{column} {keyword} ({placeholders})"));
    binds.extend(values.iter().cloned());
}

fn render_group(children: &[Predicate], joiner: &str, sql: &mut String, binds: &mut Vec<String>) {
    if children.is_empty() {
        sql.push_str("1 = 1");
        return;
    }

    let mut first = true;
    sql.push('(');
    for child in children {
        if !first {
            sql.push_str(joiner);
        }
        first = false;
        render(child, sql, binds);
    }
    sql.push(')');
}

pub(crate) fn order_clause(order: &OrderBy) -> String {
    let direction = if order.descending { "DESC" } else { "ASC" };
    format!("ORDER BY {} {direction}", order.column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn renders_or_group_with_membership() {
        let predicate = Predicate::Or(vec![
            Predicate::Contains { column: "title", value: "kick".into() },
            Predicate::InSet {
                column: "status",
                values: vec!["draft".into(), "published".into()],
            },
        ]);

        let (sql, binds) = where_clause(&predicate);
        assert_eq!(
            sql,
            "(instr(lower(title), lower(?)) > 0 OR status IN (?, ?))"
        );
        assert_eq!(binds, vec!["kick", "draft", "published"]);
    }

    #[test]
    fn match_all_renders_truth() {
        let (sql, binds) = where_clause(&Predicate::All);
        assert_eq!(sql, "1 = 1");
        assert!(binds.is_empty());
    }

    #[test]
    fn empty_in_set_matches_nothing() {
        let (sql, _) = where_clause(&Predicate::InSet { column: "status", values: vec![] });
        assert_eq!(sql, "1 = 0");
    }

    #[test]
    fn between_binds_day_strings() {
        let (sql, binds) = where_clause(&Predicate::Between {
            column: "created_at",
            from: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        });
        assert_eq!(sql, "date(created_at) BETWEEN date(?) AND date(?)");
        assert_eq!(binds, vec!["2024-02-01", "2024-03-01"]);
    }

    #[test]
    fn order_clause_uses_direction() {
        let clause = order_clause(&OrderBy { column: "comments_number", descending: false });
        assert_eq!(clause, "ORDER BY comments_number ASC");
    }
}
