//! `shopbot`: run the benchmark tasks.

use anyhow::Context as _;
use shopbot_agent::{LlmSolver, SearchSolver};
use shopbot_core::provider::Provider;
use shopbot_core::task::TaskSolver;
use shopbot_runner::{RunOptions, TaskRunner};
use std::sync::Arc;
use tracing::info;
use super::Context;

pub async fn run(ctx: &Context, task: Option<String>, stop_on_fail: bool) -> anyhow::Result<()> {
    let provider = shopbot_providers::build_provider(&ctx.config, &ctx.provider)
        .with_context(|| format!("Cannot use provider '{}'", ctx.provider))?;
    let solver = build_solver(ctx, provider);

    let runner = TaskRunner::new(ctx.benchmark.clone(), solver);
    let session = runner.open_session(&ctx.session_meta()).await?;

    println!("Provider: {}, Model: {}, Strategy: {}", ctx.provider, ctx.model, ctx.strategy);
    println!("Session has {} tasks", session.tasks.len());
    info!(session_id = %session.id, "Running session");

    let summary = runner
        .run(&session, &RunOptions { task, stop_on_fail })
        .await?;

    println!();
    println!("{summary}");
    Ok(())
}

fn build_solver(ctx: &Context, provider: Arc<dyn Provider>) -> Arc<dyn TaskSolver> {
    match ctx.strategy.as_str() {
        "search" => Arc::new(
            SearchSolver::new(provider, &ctx.model).with_config(ctx.config.search.clone()),
        ),
        _ => Arc::new(
            LlmSolver::new(provider, &ctx.model)
                .with_temperature(ctx.config.default_temperature)
                .with_max_tokens(ctx.config.default_max_tokens)
                .with_settings(ctx.config.agent.clone()),
        ),
    }
}
