use serde::Serialize;
use tracing::{debug, info};

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvalData {
    expression: String,
    value: serde_json::Value,
}

pub async fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let (session, target_id) = ctx.session().await?;
    info!(target = "uidriver", %target_id, "evaluating expression");
    debug!(target = "uidriver", %expression, "expression");

    // A script exception propagates as a SCRIPT_ERROR envelope carrying
    // the target-reported message and trace.
    let value = session.evaluate(expression).await?;
    let data = EvalData {
        expression: expression.to_string(),
        value: value.into_json(),
    };
    print_result(&ResultBuilder::new("eval").data(data).build(), ctx.format);
    Ok(())
}
