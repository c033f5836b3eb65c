use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Round a euro amount to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp at zero. Every subtraction boundary in the engine goes through this.
pub fn non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Ceiling for a single euro amount, a quadrillion euros.
const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

pub fn max_amount() -> Decimal {
    Decimal::from(MAX_AMOUNT)
}

/// Clamp into `[0, max_amount()]`. Engine entry points take amounts through this, so
/// rate products stay inside `Decimal`'s range.
pub fn bounded(amount: Decimal) -> Decimal {
    non_negative(amount).min(max_amount())
}

/// `part / whole` as a percentage, zero when `whole` is zero.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * dec!(100)
    }
}

pub fn format_eur(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-€{:.2}", round_cents(amount.abs()))
    } else {
        format!("€{:.2}", round_cents(amount))
    }
}

pub fn format_pct(rate: Decimal) -> String {
    format!("{:.2}%", rate.round_dp(2))
}
