use serde::Serialize;
use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetsData {
    targets: Vec<TargetSummary>,
    count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetSummary {
    id: String,
    kind: String,
    title: String,
    url: String,
    debuggable: bool,
}

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    info!(
        target = "uidriver",
        host = %ctx.registry.host(),
        port = ctx.registry.port(),
        "listing targets"
    );

    let targets = ctx.registry.list().await?;
    let summaries: Vec<TargetSummary> = targets
        .into_iter()
        .map(|target| TargetSummary {
            id: target.id,
            kind: target.kind.to_string(),
            title: target.title,
            url: target.url,
            debuggable: target.channel_address.is_some(),
        })
        .collect();

    let data = TargetsData {
        count: summaries.len(),
        targets: summaries,
    };
    print_result(&ResultBuilder::new("targets").data(data).build(), ctx.format);
    Ok(())
}
