use serde::Serialize;
use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HtmlData {
    node_id: i64,
    outer_html: String,
}

pub async fn execute(ctx: &CommandContext, node_id: i64) -> Result<()> {
    let (session, target_id) = ctx.session().await?;
    info!(target = "uidriver", %target_id, node_id, "fetching outer HTML");

    let outer_html = session.get_outer_html(node_id).await?;
    let data = HtmlData { node_id, outer_html };
    print_result(&ResultBuilder::new("html").data(data).build(), ctx.format);
    Ok(())
}
