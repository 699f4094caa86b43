//! `shopbot --list`: print the session's tasks and exit.

use shopbot_runner::Session;
use super::Context;

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    let session = Session::open(ctx.benchmark.as_ref(), &ctx.session_meta()).await?;

    println!("Session {} has {} tasks", session.id, session.tasks.len());
    println!();
    println!("Available tasks:");
    for line in session.listing() {
        println!("  {line}");
    }
    Ok(())
}
