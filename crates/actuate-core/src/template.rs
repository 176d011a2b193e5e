//! Placeholder expansion for candidate templates.
//!
//! Templates come from action titles, localized phrase tables and alias
//! lists. Two placeholder families are recognized: the task placeholder
//! (`${task}` or the format-string form `%@`) and the app-name placeholder
//! (`${applicationName}`).

/// Task placeholder used in action titles and intent keys.
pub const TASK_PLACEHOLDER: &str = "${task}";

/// Format-string task placeholder used by localized phrase values.
pub const TASK_FORMAT_PLACEHOLDER: &str = "%@";

/// Placeholder substituted with the discovered app name.
pub const APP_NAME_PLACEHOLDER: &str = "${applicationName}";

/// Whether the template needs a task value to be meaningful.
pub fn contains_task_placeholder(template: &str) -> bool {
    template.contains(TASK_PLACEHOLDER) || template.contains(TASK_FORMAT_PLACEHOLDER)
}

/// Expand a template into a concrete candidate.
///
/// Returns `None` when the template requires a task and `task` is blank,
/// or when the expanded text is empty after trimming.
pub fn expand(template: &str, task: &str, app_name: &str) -> Option<String> {
    if contains_task_placeholder(template) && task.trim().is_empty() {
        return None;
    }

    let expanded = template
        .replace(TASK_PLACEHOLDER, task)
        .replace(TASK_FORMAT_PLACEHOLDER, task)
        .replace(APP_NAME_PLACEHOLDER, app_name);

    let trimmed = expanded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_task_and_app_name() {
        assert_eq!(
            expand("Mark ${task} as complete in ${applicationName}", "Read", "Streaks"),
            Some("Mark Read as complete in Streaks".to_string())
        );
    }

    #[test]
    fn expands_format_placeholder() {
        assert_eq!(
            expand("Start %@ timer", "Walk", "Streaks"),
            Some("Start Walk timer".to_string())
        );
    }

    #[test]
    fn blank_task_drops_task_template() {
        assert_eq!(expand("Mark ${task} as complete", "", "Streaks"), None);
        assert_eq!(expand("Start %@ timer", "   ", "Streaks"), None);
    }

    #[test]
    fn blank_task_keeps_plain_template() {
        assert_eq!(
            expand("  All Tasks  ", "", "Streaks"),
            Some("All Tasks".to_string())
        );
    }

    #[test]
    fn empty_expansion_is_dropped() {
        assert_eq!(expand("   ", "", "Streaks"), None);
        assert_eq!(expand("${applicationName}", "", ""), None);
    }

    #[test]
    fn detects_task_placeholders() {
        assert!(contains_task_placeholder("Mark ${task} done"));
        assert!(contains_task_placeholder("Mark %@ done"));
        assert!(!contains_task_placeholder("List tasks"));
    }
}
