use super::{DisplayContext, ui};
use crate::core::aggregator::{Aggregate, RateAggregator, SourceOutcome};
use crate::core::error::RatesError;
use anyhow::Result;
use comfy_table::Cell;

impl Aggregate {
    /// Renders one row per source with its outcome.
    pub fn display_sources(&self, ctx: &DisplayContext) -> String {
        let s = ctx.strings();
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell(s.source),
            ui::header_cell(s.provider),
            ui::header_cell(s.status),
        ]);

        for report in &self.reports {
            let status = match &report.outcome {
                SourceOutcome::Fetched(rates) => {
                    ui::status_cell(&format!("{} ({})", s.fetched, rates.len()), true)
                }
                SourceOutcome::Unavailable { reason } => {
                    ui::status_cell(&format!("{}: {}", s.unavailable, reason), false)
                }
                SourceOutcome::Disabled => ui::status_cell(s.disabled, false),
            };
            table.add_row(vec![
                Cell::new(report.kind.to_string()),
                Cell::new(&report.name),
                status,
            ]);
        }
        table.to_string()
    }

    /// Renders the merged table sorted by currency code.
    pub fn display_rates(&self, ctx: &DisplayContext) -> String {
        let s = ctx.strings();
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell(s.currency),
            ui::header_cell(&format!("{} (1 {})", s.rate, self.table.reference())),
        ]);
        for code in self.table.codes() {
            if let Some(rate) = self.table.get(code) {
                table.add_row(vec![Cell::new(code), ui::number_cell(rate)]);
            }
        }
        table.to_string()
    }
}

/// Refreshes the aggregate behind a spinner. Prints the "no data" state and
/// fails with `EmptyAggregate` when every source failed.
pub async fn fetch_aggregate(
    aggregator: &RateAggregator,
    ctx: &DisplayContext,
) -> Result<Aggregate> {
    let s = ctx.strings();
    let pb = ui::new_spinner(s.fetching);
    let aggregate = aggregator.refresh().await;
    pb.finish_and_clear();

    if !ctx.keyed_requested {
        println!("{}", ui::style_text(s.no_api_warning, ui::StyleType::Subtle));
    }

    if aggregate.table.is_empty() {
        println!("{}", aggregate.display_sources(ctx));
        println!("{}", ui::style_text(s.no_data, ui::StyleType::Error));
        return Err(RatesError::EmptyAggregate.into());
    }
    Ok(aggregate)
}

pub async fn run(aggregator: &RateAggregator, ctx: &DisplayContext) -> Result<()> {
    let aggregate = fetch_aggregate(aggregator, ctx).await?;

    println!(
        "{}\n",
        ui::style_text(ctx.strings().title, ui::StyleType::Title)
    );
    println!("{}", aggregate.display_rates(ctx));
    ui::print_separator();
    println!("{}", aggregate.display_sources(ctx));
    Ok(())
}
