use super::{DisplayContext, ui};

/// Placeholder view; no alerting engine exists.
pub fn run(ctx: &DisplayContext) {
    let s = ctx.strings();
    println!("{}\n", ui::style_text(s.alerts, ui::StyleType::Title));
    println!("{}", ui::style_text(s.alerts_placeholder, ui::StyleType::Warning));
}
