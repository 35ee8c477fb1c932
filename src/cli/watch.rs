//! Interactive converter loop.
//!
//! Reads commands from stdin, keeps the result card current and re-acquires
//! rates in the background when the loaded table expires.

use super::{convert, ui};
use crate::AppContext;
use crate::core::acquire::AcquireOptions;
use crate::core::rates::{AcquisitionResult, Connectivity};
use crate::core::schedule::{RefreshTimer, Throttle};
use crate::core::state::{Action, ConverterSession, ConverterState};
use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::debug;

const HELP: &str = "\
Type an amount to convert, or one of:
  from CODE     set the source currency
  to CODE       set the target currency
  swap          swap source and target
  paste TEXT    append pasted text to the amount
  refresh       reload rates (throttled)
  offline       treat the network as unavailable
  online        treat the network as available
  help          show this message
  quit          exit";

const RETRY_HINT: &str = "refresh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Amount(String),
    From(String),
    To(String),
    Swap,
    Paste(String),
    Refresh,
    Online,
    Offline,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl WatchCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return WatchCommand::Empty;
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        match word.to_lowercase().as_str() {
            "q" | "quit" | "exit" => WatchCommand::Quit,
            "r" | "refresh" => WatchCommand::Refresh,
            "swap" => WatchCommand::Swap,
            "from" if !rest.is_empty() => WatchCommand::From(rest.to_string()),
            "to" if !rest.is_empty() => WatchCommand::To(rest.to_string()),
            "paste" => WatchCommand::Paste(rest.to_string()),
            "online" => WatchCommand::Online,
            "offline" => WatchCommand::Offline,
            "h" | "help" | "?" => WatchCommand::Help,
            _ if line
                .chars()
                .any(|c| c.is_ascii_digit() || c == '.' || c == ',') =>
            {
                WatchCommand::Amount(line.to_string())
            }
            _ => WatchCommand::Unknown(line.to_string()),
        }
    }
}

#[derive(Default)]
struct WatchView {
    rates: Option<AcquisitionResult>,
    error: Option<String>,
}

impl WatchView {
    /// Acquires rates and records the outcome. Background loads skip the
    /// spinner.
    async fn load(
        &mut self,
        ctx: &AppContext,
        timer: &mut RefreshTimer,
        options: AcquireOptions,
        background: bool,
    ) {
        let pb = (!background).then(|| ui::new_spinner("Loading rates..."));
        self.error = None;

        match ctx.acquirer.acquire(options).await {
            Ok(result) => {
                timer.observe(result.ts, Utc::now(), Instant::now());
                self.rates = Some(result);
            }
            Err(e) => self.error = Some(e.to_string()),
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
    }

    fn render(&self, state: &ConverterState, online: bool) {
        println!("{}", network_line(online));
        if let Some(error) = &self.error {
            println!("{}", ui::error_banner(error, RETRY_HINT));
        }
        match &self.rates {
            Some(result) => println!("{}", convert::render_result(state, result)),
            None => println!(
                "{}",
                ui::style_text("No rates loaded yet", ui::StyleType::Subtle)
            ),
        }
    }
}

fn network_line(online: bool) -> String {
    if online {
        ui::style_text("● Online", ui::StyleType::Value)
    } else {
        ui::style_text("○ Offline (cached rates only)", ui::StyleType::Error)
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    run_with_input(ctx, BufReader::new(tokio::io::stdin())).await
}

pub async fn run_with_input<R>(ctx: &AppContext, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut session = ConverterSession::load(ctx.store.clone(), ctx.config.default_state()).await;
    let mut throttle = Throttle::new(ctx.config.refresh_throttle());
    let mut timer = RefreshTimer::new(ctx.acquirer.ttl());
    let mut view = WatchView::default();
    let mut lines = input.lines();

    view.load(ctx, &mut timer, AcquireOptions::default(), false).await;
    println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));
    view.render(session.state(), ctx.network.is_online());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match WatchCommand::parse(&line) {
                    WatchCommand::Quit => break,
                    WatchCommand::Empty => {}
                    WatchCommand::Amount(raw) => session.dispatch(Action::SetAmount(raw)).await,
                    WatchCommand::From(code) => session.dispatch(Action::SetFrom(code)).await,
                    WatchCommand::To(code) => session.dispatch(Action::SetTo(code)).await,
                    WatchCommand::Swap => session.dispatch(Action::Swap).await,
                    WatchCommand::Paste(text) => {
                        let end = session.state().amount.len();
                        session
                            .dispatch(Action::Paste { text, start: end, end })
                            .await;
                    }
                    WatchCommand::Refresh => {
                        if throttle.try_acquire(Instant::now()) {
                            view.load(ctx, &mut timer, AcquireOptions::forced(), false)
                                .await;
                        } else {
                            debug!("Manual refresh throttled");
                            continue;
                        }
                    }
                    WatchCommand::Online => ctx.network.set_online(true),
                    WatchCommand::Offline => ctx.network.set_online(false),
                    WatchCommand::Help => {
                        println!("{HELP}");
                        continue;
                    }
                    WatchCommand::Unknown(text) => {
                        println!(
                            "{}",
                            ui::style_text(
                                &format!("Unknown command: {text} (type `help`)"),
                                ui::StyleType::Error
                            )
                        );
                        continue;
                    }
                }
            }
            _ = sleep_until(timer.deadline()) => {
                if timer.poll(Instant::now()) {
                    view.load(ctx, &mut timer, AcquireOptions::forced(), true)
                        .await;
                }
            }
        }
        view.render(session.state(), ctx.network.is_online());
    }

    Ok(())
}
