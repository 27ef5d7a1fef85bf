//! Alert message formatting

use crate::feed::PriceTick;
use crate::monitor::AlertTarget;
use chrono::Local;
use rust_decimal::{Decimal, RoundingStrategy};

/// Dollar amount with thousands separators and six fractional digits,
/// e.g. `$50,000.000000`
pub fn format_usd(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.6}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "000000"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Telegram Markdown body for a crossed target
pub fn format_alert(target: &AlertTarget, tick: &PriceTick) -> String {
    let time = tick.received_at.with_timezone(&Local).format("%H:%M:%S");
    format!(
        "🚨 *Price alert - {}*\n*{}* crossed {} {} *{}*\nCurrent price: *{}*",
        time,
        target.instrument,
        target.direction,
        target.direction.arrow(),
        format_usd(target.target_price),
        format_usd(tick.last_price),
    )
}
