//! Sample metadata and indexes shaped like a real Streaks installation.

use actuate_core::{AppMetadata, AutomationIndex, AutomationRecord, PhraseTable};

/// Metadata with English and French phrasing for a few intents.
pub fn streaks_metadata() -> AppMetadata {
    AppMetadata::empty()
        .with_app_name("Streaks")
        .with_phrases(
            PhraseTable::default()
                .with_phrase("AppIntent.TaskList.AllTasks", "en", "All Tasks")
                .with_phrase("AppIntent.TaskList.AllTasks", "fr-FR", "Toutes les tâches")
                .with_phrase(
                    "AppIntent.TaskComplete.Mark${task}AsComplete",
                    "en",
                    "Mark ${task} as Complete",
                )
                .with_phrase(
                    "AppIntent.TaskComplete.Mark${task}AsComplete",
                    "fr-FR",
                    "Marquer ${task} comme terminée",
                )
                .with_phrase("AppIntent.Pause.Title", "en", "Pause All Tasks"),
        )
        .with_shortcut_phrases(
            PhraseTable::default().with_phrase(
                "AppIntent.TaskList.AllTasks.phrase1",
                "en",
                "Show my tasks in ${applicationName}",
            ),
        )
}

/// Index with one id-bearing record per name, ids derived from position.
pub fn index_with_ids(names: &[&str]) -> AutomationIndex {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| AutomationRecord::with_id(*name, format!("0000-{i:04}")))
        .collect()
}
