use super::ui;
use crate::AppContext;
use crate::core::acquire::AcquireOptions;
use crate::core::convert::summarize;
use crate::core::format::{format_amount, format_rate};
use crate::core::rates::AcquisitionResult;
use crate::core::state::{Action, ConverterSession, ConverterState};
use anyhow::Result;
use chrono::Local;
use comfy_table::{Cell, Table};

pub const RETRY_HINT: &str = "fxconv convert --refresh";

/// Builds the result card for the current selection.
pub fn render_result(state: &ConverterState, result: &AcquisitionResult) -> Table {
    let summary = summarize(&result.data.rates, &state.from, &state.to, &state.amount);
    let (from, to) = (state.from.as_str(), state.to.as_str());

    let amount_hint = if summary.amount.is_finite() {
        format!("{} =", format_amount(summary.amount, Some(from)))
    } else {
        "Enter amount".to_string()
    };
    let converted_cell = match summary.converted {
        Some(value) => ui::value_cell(&format_amount(value, Some(to))),
        None => ui::format_optional_cell(None::<f64>, |v| v.to_string()),
    };
    let source = if result.from_cache { "cached" } else { "live" };

    let mut table = ui::new_styled_table();
    table
        .set_header(vec![
            ui::header_cell("Conversion result"),
            ui::header_cell(&format!("{from} → {to}")),
        ])
        .add_row(vec![ui::label_cell("Amount"), Cell::new(amount_hint)])
        .add_row(vec![ui::label_cell("Converted"), converted_cell])
        .add_row(vec![
            ui::label_cell("Exchange Rate"),
            ui::format_optional_cell(summary.rate, |r| {
                format!("1 {from} = {} {to}", format_rate(r))
            }),
        ])
        .add_row(vec![
            ui::label_cell("Inverse Rate"),
            ui::format_optional_cell(summary.inverse_rate, |r| {
                format!("1 {to} = {} {from}", format_rate(r))
            }),
        ])
        .add_row(vec![
            ui::label_cell("Last updated"),
            Cell::new(format!(
                "{} ({source})",
                result.ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            )),
        ]);
    table
}

pub async fn run(
    ctx: &AppContext,
    amount: Option<String>,
    from: Option<String>,
    to: Option<String>,
    refresh: bool,
) -> Result<()> {
    let mut session = ConverterSession::load(ctx.store.clone(), ctx.config.default_state()).await;
    if let Some(from) = from {
        session.dispatch(Action::SetFrom(from)).await;
    }
    if let Some(to) = to {
        session.dispatch(Action::SetTo(to)).await;
    }
    if let Some(amount) = amount {
        session.dispatch(Action::SetAmount(amount)).await;
    }

    let pb = ui::new_spinner("Loading rates...");
    let result = ctx
        .acquirer
        .acquire(AcquireOptions {
            force_refresh: refresh,
        })
        .await;
    pb.finish_and_clear();

    match result {
        Ok(result) => {
            println!("{}", render_result(session.state(), &result));
            println!(
                "{}",
                ui::style_text(
                    "Rates are for informational purposes only and may not reflect real-time market rates",
                    ui::StyleType::Subtle
                )
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", ui::error_banner(&e.to_string(), RETRY_HINT));
            Err(e.into())
        }
    }
}
