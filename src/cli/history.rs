use super::{DisplayContext, ui};
use crate::core::history::{
    CurrencyPair, HistoricalPoint, HistoryProvider, fetch_historical_series, summarize,
};
use anyhow::Result;
use comfy_table::Cell;

/// Rows shown in the history table; the summary covers the whole series.
const RECENT_POINTS: usize = 10;

pub fn display_series(ctx: &DisplayContext, pair: &CurrencyPair, points: &[HistoricalPoint]) -> String {
    let s = ctx.strings();
    let Some(summary) = summarize(points) else {
        return ui::style_text(&format!("{} {}", s.no_history, pair), ui::StyleType::Warning);
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell(s.date), ui::header_cell(s.close)]);
    let skip = points.len().saturating_sub(RECENT_POINTS);
    for point in &points[skip..] {
        table.add_row(vec![
            Cell::new(point.timestamp.format("%Y-%m-%d")),
            ui::number_cell(point.close),
        ]);
    }

    let mut totals = ui::new_styled_table();
    totals.set_header(vec![
        ui::header_cell(s.low),
        ui::header_cell(s.high),
        ui::header_cell(s.change),
    ]);
    totals.add_row(vec![
        ui::number_cell(summary.min),
        ui::number_cell(summary.max),
        ui::change_cell(summary.change_pct),
    ]);

    format!(
        "{}: {}\n\n{}\n\n{}",
        s.historical,
        ui::style_text(&pair.to_string(), ui::StyleType::Title),
        table,
        totals
    )
}

pub async fn run(
    provider: &(dyn HistoryProvider + Send + Sync),
    pair: &CurrencyPair,
    ctx: &DisplayContext,
) -> Result<()> {
    let pb = ui::new_spinner(ctx.strings().fetching);
    let points = fetch_historical_series(provider, pair).await;
    pb.finish_and_clear();

    // An empty series is a warning, not a failure
    println!("{}", display_series(ctx, pair, &points));
    Ok(())
}
