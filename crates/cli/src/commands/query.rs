use serde::Serialize;
use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    selector: String,
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryAllData {
    selector: String,
    node_ids: Vec<i64>,
    count: usize,
}

pub async fn execute_single(ctx: &CommandContext, selector: &str) -> Result<()> {
    let (session, target_id) = ctx.session().await?;
    info!(target = "uidriver", %target_id, %selector, "querying selector");

    // Zero matches is a success with matched=false, not a failure.
    let node_id = session.query_selector(selector).await?;
    let data = QueryData {
        selector: selector.to_string(),
        matched: node_id.is_some(),
        node_id,
    };
    print_result(&ResultBuilder::new("query").data(data).build(), ctx.format);
    Ok(())
}

pub async fn execute_all(ctx: &CommandContext, selector: &str) -> Result<()> {
    let (session, target_id) = ctx.session().await?;
    info!(target = "uidriver", %target_id, %selector, "querying all matches");

    let node_ids = session.query_selector_all(selector).await?;
    let data = QueryAllData {
        selector: selector.to_string(),
        count: node_ids.len(),
        node_ids,
    };
    print_result(
        &ResultBuilder::new("query-all").data(data).build(),
        ctx.format,
    );
    Ok(())
}
