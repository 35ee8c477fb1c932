use crate::AppContext;
use crate::core::state::{Action, ConverterSession};
use anyhow::Result;

/// Swaps the persisted source and target currencies.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let mut session = ConverterSession::load(ctx.store.clone(), ctx.config.default_state()).await;
    session.dispatch(Action::Swap).await;

    let state = session.state();
    println!("Now converting {} → {}", state.from, state.to);
    Ok(())
}
