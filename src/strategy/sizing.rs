use rust_decimal::Decimal;

/// Stake for the next bet under the martingale scheme
///
/// Doubles the base stake for every consecutive loss while the streak is
/// within `max_protections`; falls back to the base stake when protections
/// are disabled, when there is no streak, or once the streak exceeds the
/// protection bound. Saturates at `Decimal::MAX` instead of overflowing.
pub fn martingale_amount(
    consecutive_losses: u32,
    base_amount: Decimal,
    max_protections: u32,
) -> Decimal {
    if max_protections == 0 || consecutive_losses == 0 || consecutive_losses > max_protections {
        return base_amount;
    }

    let mut amount = base_amount;
    for _ in 0..consecutive_losses {
        match amount.checked_mul(Decimal::from(2)) {
            Some(doubled) => amount = doubled,
            None => return Decimal::MAX,
        }
    }
    amount
}
