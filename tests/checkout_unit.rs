use chrono::DateTime;

use petshop_pos::checkout::{generate_order_number, line_subtotal, CheckoutError};

#[test]
fn subtotal_is_price_times_quantity_minus_discount() {
    assert_eq!(line_subtotal(10000.0, 3, 0.0), 30000.0);
    assert_eq!(line_subtotal(5000.0, 2, 1500.0), 8500.0);
}

#[test]
fn subtotal_never_goes_negative() {
    // discount larger than the line amount clamps to zero
    assert_eq!(line_subtotal(5000.0, 1, 10000.0), 0.0);
    assert_eq!(line_subtotal(0.0, 10, 1.0), 0.0);
}

#[test]
fn order_total_is_sum_of_clamped_subtotals() {
    let lines = [(10000.0, 2, 5000.0), (5000.0, 1, 10000.0)];
    let total: f64 = lines
        .iter()
        .map(|&(price, qty, discount)| line_subtotal(price, qty, discount))
        .sum();
    assert_eq!(total, 15000.0);
}

#[test]
fn order_number_uses_year_and_trailing_millis() {
    // 2023-11-14T22:13:20.042Z
    let now = DateTime::from_timestamp_millis(1_700_000_000_042).expect("valid timestamp");
    assert_eq!(generate_order_number(now), "ORD-2023-000042");

    let now = DateTime::from_timestamp_millis(1_700_000_123_456).expect("valid timestamp");
    assert_eq!(generate_order_number(now), "ORD-2023-123456");
}

#[test]
fn checkout_error_messages() {
    assert_eq!(CheckoutError::EmptyCart.to_string(), "No items in order");
    assert_eq!(
        CheckoutError::InsufficientStock {
            product_name: "Food".to_string()
        }
        .to_string(),
        "Insufficient stock for product Food"
    );
}
