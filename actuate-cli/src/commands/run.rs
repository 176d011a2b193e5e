use crate::cli::{RunArgs, TryArgs};
use crate::context::{Context, dispatch_request, require_action};
use crate::error::CliResult;
use actuate_runtime::{CancellationToken, DispatchOutcome};

pub async fn run(ctx: &Context, args: RunArgs, cancel: &CancellationToken) -> CliResult<()> {
    let action = require_action(&args.action)?;
    let mut request = dispatch_request(action, &args.input)?;
    if let Some(name) = args.shortcut {
        request = request.with_override(name);
    }

    let dispatcher = ctx
        .dispatcher(args.trace)
        .require_structured(args.require_json);
    let output = ctx.output();

    if args.dry_run {
        let plan = dispatcher.dry_run(&request).await?;
        if output.json {
            return output.print_json(&plan);
        }
        return output.print_line(format!(
            "{} -> {} ({})",
            plan.action_id, plan.resolution.automation, plan.resolution.source
        ));
    }

    let outcome = dispatcher.run(&request, cancel).await?;
    if args.no_output {
        return Ok(());
    }
    emit(ctx, &outcome)
}

pub async fn try_candidates(
    ctx: &Context,
    args: TryArgs,
    cancel: &CancellationToken,
) -> CliResult<()> {
    let action = require_action(&args.action)?;
    let request = dispatch_request(action, &args.input)?;
    let outcome = ctx
        .dispatcher(args.trace)
        .run_candidates(&request, &args.candidates, cancel)
        .await?;
    emit(ctx, &outcome)
}

fn emit(ctx: &Context, outcome: &DispatchOutcome) -> CliResult<()> {
    let output = ctx.output();
    if output.json {
        output.print_json(&outcome.envelope())
    } else {
        output.print_raw(&outcome.execution.output)
    }
}
