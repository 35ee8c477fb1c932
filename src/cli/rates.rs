use super::ui;
use crate::AppContext;
use crate::core::acquire::AcquireOptions;
use crate::core::format::format_rate;
use crate::core::rates::AcquisitionResult;
use anyhow::Result;
use chrono::Local;
use comfy_table::{Cell, CellAlignment, Table};

pub const RETRY_HINT: &str = "fxconv rates --refresh";

/// One-line description of where a table came from.
pub fn describe(result: &AcquisitionResult) -> String {
    let mut line = format!("Rates relative to {}", result.data.base);
    if let Some(date) = &result.data.date {
        line.push_str(&format!(", as of {date}"));
    }
    line.push_str(&format!(
        ", updated {}",
        result.ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    ));
    if result.from_cache {
        line.push_str(" (cached)");
    }
    line
}

pub fn render_rates(result: &AcquisitionResult) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
    for (code, rate) in &result.data.rates {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(format_rate(*rate)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub async fn run(ctx: &AppContext, refresh: bool) -> Result<()> {
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
            println!("{}", ui::style_text(&describe(&result), ui::StyleType::Title));
            println!("{}", render_rates(&result));
            Ok(())
        }
        Err(e) => {
            println!("{}", ui::error_banner(&e.to_string(), RETRY_HINT));
            Err(e.into())
        }
    }
}
