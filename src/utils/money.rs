use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

const SCALE: u32 = 2;

/// Money columns are REAL in SQLite; normalise to two decimal places on read.
pub fn from_storage(value: f64) -> Decimal {
    let mut amount = Decimal::from_f64(value).unwrap_or_default().round_dp(SCALE);
    amount.rescale(SCALE);
    amount
}

pub fn to_storage(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// True when the amount needs no more than two decimal places.
pub fn is_whole_cents(value: Decimal) -> bool {
    value.normalize().scale() <= SCALE
}

pub fn line_total(qty: i64, unit_price: Decimal) -> Decimal {
    let mut total = (Decimal::from(qty) * unit_price).round_dp(SCALE);
    total.rescale(SCALE);
    total
}
