//! Behavioral tests for the Money type

use core_kernel::{Currency, Money, MoneyError};
use rust_decimal_macros::dec;

#[test]
fn display_includes_symbol_and_currency_places() {
    let m = Money::new(dec!(1249.5), Currency::USD);
    assert_eq!(m.to_string(), "$ 1249.50");

    let y = Money::new(dec!(1500), Currency::JPY);
    assert_eq!(y.to_string(), "¥ 1500");
}

#[test]
fn round_to_currency_strips_sub_cent_precision() {
    let m = Money::new(dec!(10.1299), Currency::USD).round_to_currency();
    assert_eq!(m.amount(), dec!(10.13));
}

#[test]
fn checked_sub_rejects_mixed_currencies() {
    let usd = Money::new(dec!(10), Currency::USD);
    let gbp = Money::new(dec!(10), Currency::GBP);
    assert!(matches!(
        usd.checked_sub(&gbp),
        Err(MoneyError::CurrencyMismatch(_, _))
    ));
}

#[test]
fn divide_by_zero_is_an_error() {
    let m = Money::new(dec!(10), Currency::USD);
    assert_eq!(m.divide(dec!(0)), Err(MoneyError::DivisionByZero));
}

#[test]
fn multiply_scales_amount() {
    let m = Money::new(dec!(200), Currency::USD);
    assert_eq!(m.multiply(dec!(0.5)).amount(), dec!(100));
}

#[test]
fn zero_is_zero_in_any_currency() {
    for currency in [Currency::USD, Currency::EUR, Currency::JPY] {
        assert!(Money::zero(currency).is_zero());
    }
}
