use crate::cli::LinkArgs;
use crate::context::{Context, require_action};
use crate::error::{CliError, CliResult};
use actuate_core::{ActionCatalog, AutomationRef};
use serde_json::json;

pub fn link(ctx: &Context, args: LinkArgs) -> CliResult<()> {
    let action = require_action(&args.action)?;
    ActionCatalog::builtin().find(action)?;

    if args.shortcut.is_none() && args.shortcut_id.is_none() {
        return Err(CliError::usage("link requires --shortcut or --shortcut-id"));
    }
    let reference = AutomationRef {
        name: args.shortcut,
        id: args.shortcut_id,
    };

    let label = reference.label().to_string();
    ctx.store.update(|config| config.set_mapping(action, reference))?;
    tracing::info!(action = %action, automation = %label, "Linked action");

    let output = ctx.output();
    if output.json {
        return output.print_json(&json!({
            "ok": true,
            "action": action,
            "shortcut": label,
            "config": ctx.store.path(),
        }));
    }
    output.print_line(format!("linked {action} -> {label}"))
}

pub fn unlink(ctx: &Context, action: &str) -> CliResult<()> {
    let action = require_action(action)?;
    ActionCatalog::builtin().find(action)?;
    let removed = ctx.store.update(|config| Ok(config.remove_mapping(action)))?;

    let output = ctx.output();
    if output.json {
        return output.print_json(&json!({
            "ok": true,
            "action": action,
            "removed": removed.is_some(),
        }));
    }
    match removed {
        Some(previous) => {
            output.print_line(format!("unlinked {action} (was {})", previous.label()))
        }
        None => output.print_line(format!("{action} was not linked")),
    }
}

pub fn links(ctx: &Context) -> CliResult<()> {
    let output = ctx.output();
    if output.json {
        return output.print_json(&ctx.config.mappings);
    }
    if ctx.config.mappings.is_empty() {
        return output.print_line("no links");
    }
    for (action, reference) in ctx.config.mappings() {
        match (reference.name(), reference.id()) {
            (Some(name), Some(id)) => output.print_line(format!("{action} -> {name} ({id})"))?,
            _ => output.print_line(format!("{action} -> {}", reference.label()))?,
        }
    }
    Ok(())
}
