use crate::cli::ActionsCommand;
use crate::context::{Context, require_action};
use crate::error::CliResult;
use actuate_core::ActionCatalog;
use actuate_runtime::DispatchRequest;
use serde_json::json;

pub fn actions(ctx: &Context, command: ActionsCommand) -> CliResult<()> {
    match command {
        ActionsCommand::List => list(ctx),
        ActionsCommand::Describe { action, task } => describe(ctx, &action, task),
    }
}

fn list(ctx: &Context) -> CliResult<()> {
    let catalog = ActionCatalog::builtin();
    let output = ctx.output();
    if output.json {
        return output.print_json(&catalog);
    }
    for action in &catalog {
        let marker = if action.requires_task { " (task)" } else { "" };
        output.print_line(format!("{:<14} {}{marker}", action.id, action.title))?;
    }
    Ok(())
}

fn describe(ctx: &Context, action_id: &str, task: Option<String>) -> CliResult<()> {
    let action_id = require_action(action_id)?;
    let dispatcher = ctx.dispatcher(None);
    let action = dispatcher.catalog().find(action_id)?.clone();

    let mut request = DispatchRequest::new(action_id);
    if let Some(task) = task {
        request = request.with_task(task);
    }
    let candidates = dispatcher.candidates(&request)?;
    let mapping = dispatcher.mapping(action_id);

    let output = ctx.output();
    if output.json {
        return output.print_json(&json!({
            "action": action,
            "sample_payload": action.sample_payload(),
            "candidates": candidates,
            "mapping": mapping,
        }));
    }

    output.print_line(format!("{} - {}", action.id, action.title))?;
    output.print_line(format!("payload: {}", action.sample_payload()))?;
    if let Some(mapping) = mapping {
        output.print_line(format!("linked:  {}", mapping.label()))?;
    }
    output.print_line("candidates:")?;
    for candidate in candidates.iter() {
        output.print_line(format!("  {candidate}"))?;
    }
    Ok(())
}
