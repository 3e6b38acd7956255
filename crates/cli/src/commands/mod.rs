mod attributes;
mod connect;
mod document;
mod eval;
mod html;
mod query;
mod screenshot;
mod targets;

use std::time::Duration;

use crate::cli::{Cli, Commands};
use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, print_result};
use uidriver_protocol::options::DEFAULT_REQUEST_TIMEOUT_MS;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.into();
    let (host, port) = cli.endpoint();
    let request_timeout = Duration::from_millis(cli.timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS));
    let command_name = cli.command.name();

    let ctx = CommandContext::new(host, port, request_timeout, format);
    let result = run(cli.command, &ctx).await;

    // One-shot process: leave no sessions behind.
    ctx.manager.disconnect_all().await;

    if let Err(err) = result {
        let envelope = ResultBuilder::<()>::new(command_name)
            .fail(err.to_command_error())
            .build();
        print_result(&envelope, format);
        return Err(err);
    }
    Ok(())
}

async fn run(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Targets => targets::execute(ctx).await,
        Commands::Connect { target_id } => connect::execute(ctx, target_id.as_deref()).await,
        Commands::Document => document::execute(ctx).await,
        Commands::Query { selector } => query::execute_single(ctx, &selector).await,
        Commands::QueryAll { selector } => query::execute_all(ctx, &selector).await,
        Commands::Attributes { node_id } => attributes::execute(ctx, node_id).await,
        Commands::Html { node_id } => html::execute(ctx, node_id).await,
        Commands::Eval { expression } => eval::execute(ctx, &expression).await,
        Commands::Screenshot {
            format,
            quality,
            output,
        } => screenshot::execute(ctx, format.into(), quality, output.as_deref()).await,
    }
}
