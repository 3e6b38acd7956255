use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttributesData {
    node_id: i64,
    attributes: BTreeMap<String, String>,
    count: usize,
}

pub async fn execute(ctx: &CommandContext, node_id: i64) -> Result<()> {
    let (session, target_id) = ctx.session().await?;
    info!(target = "uidriver", %target_id, node_id, "fetching attributes");

    let attributes = session.get_node_attributes(node_id).await?;
    let data = AttributesData {
        node_id,
        count: attributes.len(),
        attributes,
    };
    print_result(
        &ResultBuilder::new("attributes").data(data).build(),
        ctx.format,
    );
    Ok(())
}
