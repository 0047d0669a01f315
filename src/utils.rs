// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Utility functions shared by the analysis modules.

/// Normalize an exercise name into its lookup key.
///
/// Keys are lower-case with spaces, hyphens and underscores removed, so
/// `"Push-Up"`, `"push_up"` and `"pushup"` all resolve to `"pushup"`.
///
/// # Arguments
///
/// * `name` - Exercise name as supplied by a caller or a data file.
///
/// # Returns
///
/// The normalized key.
#[must_use]
pub fn normalize_exercise(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Pluralize a report noun (`frame`, `rule`, `reference`, `violation`) for a count.
#[must_use]
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_exercise() {
        assert_eq!(normalize_exercise("Squat"), "squat");
        assert_eq!(normalize_exercise("  Push-Up "), "pushup");
        assert_eq!(normalize_exercise("push_up"), "pushup");
        assert_eq!(normalize_exercise("PUSH UP"), "pushup");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("violation", 1), "violation");
        assert_eq!(pluralize("violation", 2), "violations");
        assert_eq!(pluralize("frame", 0), "frames");
        assert_eq!(pluralize("reference", 3), "references");
        assert_eq!(pluralize("rule", 1), "rule");
    }
}
