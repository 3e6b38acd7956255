use serde::Serialize;
use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};
use uidriver_protocol::DocumentNode;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentData {
    target_id: String,
    root: DocumentNode,
}

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let (session, target_id) = ctx.session().await?;
    info!(target = "uidriver", %target_id, "fetching document");

    let root = session.get_document().await?;
    let data = DocumentData { target_id, root };
    print_result(
        &ResultBuilder::new("document").data(data).build(),
        ctx.format,
    );
    Ok(())
}
