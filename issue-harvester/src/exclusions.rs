//! Repository exclusion list for organization-wide collection.

/// Merges repeated `--exclude-repo` values and a comma-separated
/// `--exclude-repos` string into one deduplicated list.
///
/// Entries are trimmed and kept in first-seen order with their original
/// casing. Empty inputs yield an empty list; there is no failure path.
#[must_use]
pub fn build_exclusion_list(repeated: &[String], comma_separated: Option<&str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut exclusions = Vec::new();

    let repeated_entries = repeated.iter().map(String::as_str);
    let comma_entries = comma_separated.unwrap_or_default().split(',');

    for entry in repeated_entries.chain(comma_entries) {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            exclusions.push(trimmed.to_string());
        }
    }

    exclusions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_yield_empty_list() {
        assert!(build_exclusion_list(&[], None).is_empty());
        assert!(build_exclusion_list(&[], Some("")).is_empty());
        assert!(build_exclusion_list(&[], Some(" , ,")).is_empty());
    }

    #[test]
    fn merges_both_sources() {
        let repeated = vec!["legacy".to_string()];
        let list = build_exclusion_list(&repeated, Some("archive,sandbox"));
        assert_eq!(list, vec!["legacy", "archive", "sandbox"]);
    }

    #[test]
    fn deduplicates_across_sources() {
        let repeated = vec!["legacy".to_string(), "archive".to_string()];
        let list = build_exclusion_list(&repeated, Some("archive, legacy, extra"));
        assert_eq!(list, vec!["legacy", "archive", "extra"]);
    }

    #[test]
    fn trims_whitespace_and_preserves_case() {
        let list = build_exclusion_list(&[], Some("  Widgets , gadgets  "));
        assert_eq!(list, vec!["Widgets", "gadgets"]);
    }
}
