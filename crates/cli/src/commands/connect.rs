use serde::Serialize;
use tracing::info;

use crate::context::CommandContext;
use crate::error::{CliError, Result};
use crate::output::{ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectData {
    target_id: String,
    title: Option<String>,
    enabled_domains: Vec<String>,
}

pub async fn execute(ctx: &CommandContext, target_id: Option<&str>) -> Result<()> {
    let (session, target_id, title) = match target_id {
        Some(wanted) => {
            info!(target = "uidriver", target_id = %wanted, "connecting to target");
            let targets = ctx.registry.list().await?;
            let target = targets
                .into_iter()
                .find(|target| target.id == wanted)
                .ok_or_else(|| {
                    CliError::InvalidInput(format!(
                        "no target with id '{wanted}'; run `uidriver targets` to list them"
                    ))
                })?;
            let title = target.title.clone();
            let session = ctx.manager.connect(&target).await?;
            (session, wanted.to_string(), Some(title))
        }
        None => {
            info!(target = "uidriver", "auto-connecting to the first page target");
            let (session, target_id) = ctx.session().await?;
            (session, target_id, None)
        }
    };

    let data = ConnectData {
        target_id,
        title,
        enabled_domains: session.enabled_domains(),
    };
    print_result(&ResultBuilder::new("connect").data(data).build(), ctx.format);
    Ok(())
}
