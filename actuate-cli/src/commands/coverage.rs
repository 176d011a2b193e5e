use crate::context::Context;
use crate::error::CliResult;

pub async fn coverage(ctx: &Context) -> CliResult<()> {
    let report = ctx.dispatcher(None).coverage().await;
    let output = ctx.output();
    if output.json {
        return output.print_json(&report);
    }
    output.print_line(format!("available: {}", report.available.join(", ")))?;
    output.print_line(format!("missing:   {}", report.missing.join(", ")))
}
