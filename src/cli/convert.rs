use super::rates::fetch_aggregate;
use super::{DisplayContext, ui};
use crate::core::aggregator::RateAggregator;
use crate::core::rates::{ConversionRequest, RateTable};
use anyhow::Result;

/// Formats a successful conversion, e.g. `Result: 110.00 EUR`.
pub fn format_conversion(ctx: &DisplayContext, request: &ConversionRequest, value: f64) -> String {
    let s = ctx.strings();
    format!(
        "{} {} = {}: {} {}",
        ui::format_amount(request.amount),
        request.from,
        s.result,
        ui::style_text(&ui::format_amount(value), ui::StyleType::TotalValue),
        request.to
    )
}

/// Converts against an already fetched table. Unknown codes are reported and
/// leave the table as it was.
pub fn convert_with(
    table: &RateTable,
    request: &ConversionRequest,
    ctx: &DisplayContext,
) -> Result<String> {
    let value = request.apply(table)?;
    Ok(format_conversion(ctx, request, value))
}

pub async fn run(
    aggregator: &RateAggregator,
    request: &ConversionRequest,
    ctx: &DisplayContext,
) -> Result<()> {
    let aggregate = fetch_aggregate(aggregator, ctx).await?;
    match convert_with(&aggregate.table, request, ctx) {
        Ok(line) => {
            println!("{line}");
            Ok(())
        }
        Err(e) => {
            println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Language, RatesError};

    fn table() -> RateTable {
        let mut table = RateTable::anchored("EUR");
        table.insert("USD", 0.9091).unwrap();
        table.insert("BTC", 60000.0).unwrap();
        table
    }

    #[test]
    fn test_convert_with_known_codes() {
        let ctx = DisplayContext::new(Language::English, false);
        let request = ConversionRequest::new(100.0, "usd", "eur");
        let line = convert_with(&table(), &request, &ctx).unwrap();
        assert!(line.starts_with("100.00 USD = Result: "));
        assert!(line.contains("110.00"));
        assert!(line.ends_with("EUR"));
    }

    #[test]
    fn test_convert_with_small_result() {
        let ctx = DisplayContext::new(Language::Greek, false);
        let request = ConversionRequest::new(1.0, "BTC", "USD");
        let line = convert_with(&table(), &request, &ctx).unwrap();
        assert!(line.contains("Αποτέλεσμα"));
        assert!(line.contains("0.00001515"));
    }

    #[test]
    fn test_convert_with_unknown_code() {
        let ctx = DisplayContext::new(Language::English, false);
        let request = ConversionRequest::new(1.0, "XYZ", "EUR");
        let err = convert_with(&table(), &request, &ctx).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RatesError>(),
            Some(&RatesError::UnknownCurrencyCode("XYZ".to_string()))
        );
    }
}
