use super::{DisplayContext, ui};
use crate::core::history::{CurrencyPair, HistoryProvider, fetch_historical_series, project_trend};
use anyhow::Result;

pub fn format_projection(ctx: &DisplayContext, pair: &CurrencyPair, days: u32, value: f64) -> String {
    let s = ctx.strings();
    format!(
        "{} {} (+{} {}): {}",
        s.projected,
        pair,
        days,
        s.days,
        ui::style_text(&format!("{value:.4}"), ui::StyleType::TotalValue)
    )
}

pub async fn run(
    provider: &(dyn HistoryProvider + Send + Sync),
    pair: &CurrencyPair,
    days: u32,
    ctx: &DisplayContext,
) -> Result<()> {
    let pb = ui::new_spinner(ctx.strings().fetching);
    let points = fetch_historical_series(provider, pair).await;
    pb.finish_and_clear();

    let value = project_trend(pair, &points, days)?;
    println!("{}", format_projection(ctx, pair, days, value));
    Ok(())
}
