//! GitHub search query construction.

use crate::date_range::DateRange;
use crate::request::IssueStateFilter;

/// Builds an issue search query scoped to one repository.
///
/// Format: `repo:{org}/{repo} is:issue [state:{state}] [label:{label}...]
/// [created:...] [updated:...]`. Labels containing whitespace are quoted.
pub fn build_search_query(
    org: &str,
    repo: &str,
    labels: &[String],
    state: IssueStateFilter,
    range: &DateRange,
) -> String {
    let mut parts = vec![format!("repo:{org}/{repo}"), "is:issue".to_string()];

    if let Some(state) = state.query_value() {
        parts.push(format!("state:{state}"));
    }

    for label in labels {
        if label.chars().any(char::is_whitespace) {
            parts.push(format!("label:\"{label}\""));
        } else {
            parts.push(format!("label:{label}"));
        }
    }

    if let Some(created) = range.created_query() {
        parts.push(created);
    }
    if let Some(updated) = range.updated_query() {
        parts.push(updated);
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::{resolve_date_range, DateRangeArgs};
    use chrono::NaiveDate;

    #[test]
    fn minimal_query_has_repo_and_type() {
        let query = build_search_query(
            "acme",
            "widgets",
            &[],
            IssueStateFilter::All,
            &DateRange::default(),
        );
        assert_eq!(query, "repo:acme/widgets is:issue");
    }

    #[test]
    fn state_and_labels_are_appended() {
        let labels = vec!["bug".to_string(), "needs triage".to_string()];
        let query = build_search_query(
            "acme",
            "widgets",
            &labels,
            IssueStateFilter::Closed,
            &DateRange::default(),
        );
        assert_eq!(
            query,
            "repo:acme/widgets is:issue state:closed label:bug label:\"needs triage\""
        );
    }

    #[test]
    fn date_fragments_are_appended() {
        let range = resolve_date_range(&DateRangeArgs {
            created_after: NaiveDate::from_ymd_opt(2024, 1, 1),
            created_before: NaiveDate::from_ymd_opt(2024, 6, 30),
            updated_after: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..Default::default()
        })
        .unwrap();

        let query = build_search_query("acme", "widgets", &[], IssueStateFilter::Open, &range);
        assert_eq!(
            query,
            "repo:acme/widgets is:issue state:open \
             created:2024-01-01..2024-06-30 updated:>=2024-02-01"
        );
    }
}
