//! Interactive conversion loop. Each line is converted against the latest
//! aggregate, which the aggregator serves from its cache while fresh. The loop
//! ends with `EmptyAggregate` once no source has any data.

use super::convert::convert_with;
use super::{DisplayContext, ui};
use crate::core::aggregator::RateAggregator;
use crate::core::rates::ConversionRequest;
use anyhow::{Context, Result, anyhow};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const TOGGLE_LANGUAGE: &str = ":lang";

/// Parses `AMOUNT FROM TO`, e.g. `100 usd eur`.
pub fn parse_line(line: &str) -> Result<ConversionRequest> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [amount, from, to] = parts.as_slice() else {
        return Err(anyhow!("Expected 3 fields, got {}", parts.len()));
    };
    let amount: f64 = amount
        .replace(',', ".")
        .parse()
        .with_context(|| format!("Invalid amount: {amount}"))?;
    Ok(ConversionRequest::new(amount, from, to))
}

pub async fn run_with<R, W>(
    aggregator: &RateAggregator,
    reader: R,
    out: &mut W,
    ctx: &DisplayContext,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut ctx = *ctx;
    let mut lines = reader.lines();
    writeln!(out, "{}", ctx.strings().shell_prompt)?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if line == TOGGLE_LANGUAGE {
            ctx.language = ctx.language.toggled();
            debug!(language = ?ctx.language, "Language toggled");
            writeln!(out, "{}", ctx.strings().shell_prompt)?;
            continue;
        }

        let s = ctx.strings();
        let request = match parse_line(line) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Unparseable shell input");
                writeln!(out, "{}", ui::style_text(s.shell_usage, ui::StyleType::Warning))?;
                continue;
            }
        };

        let aggregate = aggregator.refresh().await;
        let table = match aggregate.usable_table() {
            Ok(table) => table,
            Err(e) => {
                writeln!(out, "{}", ui::style_text(s.no_data, ui::StyleType::Error))?;
                return Err(e.into());
            }
        };
        let message = match convert_with(table, &request, &ctx) {
            Ok(line) => line,
            Err(e) => ui::style_text(&e.to_string(), ui::StyleType::Error),
        };
        writeln!(out, "{message}")?;
    }
    Ok(())
}

pub async fn run(aggregator: &RateAggregator, ctx: &DisplayContext) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_with(aggregator, stdin, &mut stdout, ctx).await
}
