//! Rewrites a SQL template with a single `%s` substitution point into a final
//! statement with numbered `$n` placeholders and a flat parameter list.

use tracing::trace;

use crate::types::{RowValues, SqlArg};

/// Marker replaced by the generated placeholder list.
pub const SUBSTITUTION_POINT: &str = "%s";

/// Finished statement text plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub statement: String,
    pub params: Vec<RowValues>,
}

/// Flatten `args` into numbered placeholders and substitute them into `template`.
///
/// Scalars take one placeholder each; lists take one per element. Numbering
/// starts at `$1` and runs across all arguments in order.
///
/// ```rust
/// use pg_mapper::prelude::*;
///
/// let prepared = prepare(
///     "INSERT INTO t VALUES (%s)",
///     &[42_i64.into(), vec!["a", "b"].into()],
/// );
/// assert_eq!(prepared.statement, "INSERT INTO t VALUES ($1,$2,$3)");
/// assert_eq!(prepared.params.len(), 3);
/// ```
///
/// An empty list contributes nothing, so a template whose only argument is an
/// empty list ends up with an empty substitution (`IN ()`), which Postgres rejects.
#[must_use]
pub fn prepare(template: &str, args: &[SqlArg]) -> Prepared {
    let capacity = args.iter().map(SqlArg::placeholder_count).sum();
    let mut params = Vec::with_capacity(capacity);
    let mut placeholders = String::with_capacity(capacity * 4);

    for arg in args {
        match arg {
            SqlArg::Scalar(value) => push_placeholder(&mut placeholders, &mut params, value),
            SqlArg::List(items) => {
                for value in items {
                    push_placeholder(&mut placeholders, &mut params, value);
                }
            }
        }
    }

    let statement = substitute(template, placeholders.trim_start_matches(','));
    trace!(statement = %statement, params = params.len(), "prepared statement");

    Prepared { statement, params }
}

fn push_placeholder(placeholders: &mut String, params: &mut Vec<RowValues>, value: &RowValues) {
    params.push(value.clone());
    placeholders.push_str(&format!(",${}", params.len()));
}

/// Replace the first `%s` with `replacement` and unescape `%%`.
fn substitute(template: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(template.len() + replacement.len());
    let mut substituted = false;
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("%%") {
            out.push('%');
            rest = &tail[2..];
        } else if !substituted && tail.starts_with(SUBSTITUTION_POINT) {
            out.push_str(replacement);
            substituted = true;
            rest = &tail[SUBSTITUTION_POINT.len()..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_argument_expands_in_order() {
        let prepared = prepare(
            "SELECT * FROM t WHERE id = ANY(%s)",
            &[vec![1_i64, 2, 3].into()],
        );
        assert_eq!(prepared.statement, "SELECT * FROM t WHERE id = ANY($1,$2,$3)");
        assert_eq!(
            prepared.params,
            vec![RowValues::Int(1), RowValues::Int(2), RowValues::Int(3)]
        );
    }

    #[test]
    fn scalar_then_list_share_one_counter() {
        let prepared = prepare(
            "INSERT INTO t VALUES (%s)",
            &[42_i64.into(), vec!["a", "b"].into()],
        );
        assert_eq!(prepared.statement, "INSERT INTO t VALUES ($1,$2,$3)");
        assert_eq!(
            prepared.params,
            vec![
                RowValues::Int(42),
                RowValues::Text("a".into()),
                RowValues::Text("b".into()),
            ]
        );
    }

    #[test]
    fn lists_between_scalars_keep_numbering() {
        let prepared = prepare(
            "SELECT f(%s)",
            &[
                SqlArg::list([true, false]),
                "x".into(),
                SqlArg::list([10_i64]),
            ],
        );
        assert_eq!(prepared.statement, "SELECT f($1,$2,$3,$4)");
        assert_eq!(prepared.params[2], RowValues::Text("x".into()));
        assert_eq!(prepared.params[3], RowValues::Int(10));
    }

    #[test]
    fn empty_list_alone_leaves_empty_substitution() {
        let prepared = prepare("DELETE FROM t WHERE id IN (%s)", &[SqlArg::List(vec![])]);
        assert_eq!(prepared.statement, "DELETE FROM t WHERE id IN ()");
        assert!(prepared.params.is_empty());
    }

    #[test]
    fn empty_list_between_scalars_is_skipped() {
        let prepared = prepare(
            "VALUES (%s)",
            &[1_i64.into(), SqlArg::List(vec![]), 2_i64.into()],
        );
        assert_eq!(prepared.statement, "VALUES ($1,$2)");
        assert_eq!(prepared.params, vec![RowValues::Int(1), RowValues::Int(2)]);
    }

    #[test]
    fn escaped_percent_is_unescaped() {
        let prepared = prepare(
            "SELECT * FROM t WHERE name LIKE 'a%%' AND id IN (%s)",
            &[5_i64.into()],
        );
        assert_eq!(
            prepared.statement,
            "SELECT * FROM t WHERE name LIKE 'a%' AND id IN ($1)"
        );
    }

    #[test]
    fn only_first_substitution_point_is_replaced() {
        let prepared = prepare("SELECT %s, '%s'", &[1_i64.into()]);
        assert_eq!(prepared.statement, "SELECT $1, '%s'");
    }

    #[test]
    fn template_without_marker_is_untouched() {
        let prepared = prepare("SELECT * FROM t WHERE id = $1", &[9_i64.into()]);
        assert_eq!(prepared.statement, "SELECT * FROM t WHERE id = $1");
        assert_eq!(prepared.params, vec![RowValues::Int(9)]);
    }

    #[test]
    fn placeholders_past_nine_are_multi_digit() {
        let prepared = prepare("VALUES (%s)", &[SqlArg::list(0_i64..11)]);
        assert!(prepared.statement.ends_with("$9,$10,$11)"));
        assert_eq!(prepared.params.len(), 11);
    }
}
