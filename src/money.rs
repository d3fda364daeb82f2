//! Settlement arithmetic at 2-decimal scale
//!
//! All balances and settled amounts are carried to exactly two decimals.
//! The two conversion directions round differently and that difference is
//! contractual: the debit leg divides by the rate and rounds half-up, the
//! credit leg multiplies by the full-precision rate and rounds half-even.
//! Callers must not "harmonize" the modes; settled amounts would change.

use rust_decimal::{Decimal, RoundingStrategy};

/// Scale of every settled amount and balance.
pub const SETTLEMENT_SCALE: u32 = 2;

/// Round to cents, banker's rounding, padded to scale 2.
pub fn round_half_even(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(SETTLEMENT_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(SETTLEMENT_SCALE);
    rounded
}

/// Round to cents, half away from zero, padded to scale 2.
pub fn round_half_up(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(SETTLEMENT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SETTLEMENT_SCALE);
    rounded
}

/// Rate applied when source and destination currencies are equal: 1.00.
pub fn unit_rate() -> Decimal {
    Decimal::new(100, SETTLEMENT_SCALE)
}

/// Amount to subtract from the source account when the transfer is
/// denominated in the destination currency: transfer amount divided by the
/// rate, rounded half-up to cents.
///
/// `None` on a zero rate or decimal overflow.
pub fn convert_debit(transfer_amount: Decimal, rate: Decimal) -> Option<Decimal> {
    round_half_even(transfer_amount)
        .checked_div(rate)
        .map(round_half_up)
}

/// Amount to add to the destination account when the transfer is denominated
/// in the source currency: transfer amount multiplied by the full-precision
/// rate, rounded half-even to cents.
///
/// `None` on decimal overflow.
pub fn convert_credit(transfer_amount: Decimal, rate: Decimal) -> Option<Decimal> {
    round_half_even(transfer_amount)
        .checked_mul(rate)
        .map(round_half_even)
}

// ============================================================================
// Tests
// ============================================================================
