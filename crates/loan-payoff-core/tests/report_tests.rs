use loan_payoff_core::payoff::periods_to_payoff;
use loan_payoff_core::report::{analyze_loan, build_pay_table, LoanPayoffInput, PaymentRange};
use loan_payoff_core::rate_solver::{solve_monthly_rate, LoanScenario};
use loan_payoff_core::{LoanCalculator, LoanPayoffError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn reference_calculator() -> LoanCalculator {
    LoanCalculator::new(LoanScenario::new(dec!(70000), dec!(500), 276, dec!(60000))).unwrap()
}

fn reference_input() -> LoanPayoffInput {
    LoanPayoffInput {
        initial_loan: dec!(70000),
        payment: dec!(500),
        years_paid: 23,
        remaining_loan: dec!(60000),
        payment_range: None,
    }
}

// ===========================================================================
// Payoff periods
// ===========================================================================

#[test]
fn test_payoff_periods_known_answers() {
    let rate = solve_monthly_rate(dec!(70000), dec!(500), 276, dec!(60000)).unwrap();
    let expected = [
        (dec!(500), dec!(537)),
        (dec!(600), dec!(242)),
        (dec!(700), dec!(172)),
        (dec!(800), dec!(136)),
        (dec!(900), dec!(113)),
    ];
    for (payment, months) in expected {
        let n = periods_to_payoff(dec!(70000), rate, payment).unwrap();
        assert!(
            (n - months).abs() <= Decimal::ONE,
            "payment {}: expected ~{} months, got {}",
            payment,
            months,
            n
        );
    }
}

#[test]
fn test_payoff_periods_decrease_with_payment() {
    let rate = reference_calculator().monthly_rate();
    let mut previous = Decimal::MAX;
    let mut payment = dec!(490);
    while payment <= dec!(2000) {
        let n = periods_to_payoff(dec!(70000), rate, payment).unwrap();
        assert!(n < previous, "periods should fall as payment rises ({} at {})", n, payment);
        previous = n;
        payment += dec!(10);
    }
}

#[test]
fn test_payoff_invalid_inputs() {
    let cases = [
        (dec!(1000), dec!(0), dec!(100), "rate"),
        (dec!(1000), dec!(0.01), dec!(0), "payment"),
        (dec!(0), dec!(0.01), dec!(100), "principal"),
        (dec!(1000), dec!(0.01), dec!(10), "payment"),
    ];
    for (principal, rate, payment, expected_field) in cases {
        match periods_to_payoff(principal, rate, payment) {
            Err(LoanPayoffError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidInput for {expected_field}, got {other:?}"),
        }
    }
}

// ===========================================================================
// Pay table
// ===========================================================================

#[test]
fn test_pay_table_rows() {
    let rows = build_pay_table(&reference_calculator(), &PaymentRange::default()).unwrap();
    let summary: Vec<(Decimal, Decimal, u32, u32)> = rows
        .iter()
        .map(|r| (r.payment, r.total_periods, r.years, r.months))
        .collect();
    assert_eq!(
        summary,
        vec![
            (dec!(500), dec!(536.7), 44, 8),
            (dec!(600), dec!(241.6), 20, 1),
            (dec!(700), dec!(171.9), 14, 3),
            (dec!(800), dec!(135.5), 11, 3),
            (dec!(900), dec!(112.5), 9, 4),
        ]
    );
}

#[test]
fn test_pay_table_future_values() {
    let rows = build_pay_table(&reference_calculator(), &PaymentRange::default()).unwrap();
    // The configured payment reproduces today's balance
    assert!((rows[0].future_value - dec!(60000)).abs() < dec!(0.000001));
    // Each extra 100/month lowers the balance by the same annuity amount
    let step = rows[0].future_value - rows[1].future_value;
    for pair in rows.windows(2) {
        let diff = pair[0].future_value - pair[1].future_value;
        assert!((diff - step).abs() < dec!(0.000001));
    }
    assert!((step - dec!(83244.33)).abs() < dec!(0.01), "step = {}", step);
}

#[test]
fn test_pay_table_rows_ascend() {
    let range = PaymentRange::new(dec!(550), dec!(1550), dec!(250)).unwrap();
    let rows = build_pay_table(&reference_calculator(), &range).unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.windows(2).all(|w| w[0].payment < w[1].payment));
    assert!(rows.windows(2).all(|w| w[0].total_periods > w[1].total_periods));
}

#[test]
fn test_pay_table_fails_when_payment_too_small() {
    // 400/month never covers the ~488 of first-month interest
    let range = PaymentRange::new(dec!(400), dec!(900), dec!(100)).unwrap();
    let err = build_pay_table(&reference_calculator(), &range).unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn test_invalid_ranges_rejected() {
    assert!(PaymentRange::new(dec!(0), dec!(900), dec!(100)).is_err());
    assert!(PaymentRange::new(dec!(500), dec!(900), dec!(0)).is_err());
    assert!(PaymentRange::new(dec!(900), dec!(500), dec!(100)).is_err());
    assert!(PaymentRange::new(dec!(1), dec!(1000000), dec!(0.01)).is_err());
}

// ===========================================================================
// Full analysis
// ===========================================================================

#[test]
fn test_analyze_loan_envelope() {
    let out = analyze_loan(&reference_input()).unwrap();
    let result = &out.result;
    assert!((result.monthly_rate - dec!(0.006971245281)).abs() < dec!(0.000000001));
    assert!((result.annual_rate - dec!(0.0869381447)).abs() < dec!(0.0000000001));
    assert_eq!(result.total_paid, dec!(138000));
    assert!((result.future_value - dec!(60000)).abs() < dec!(0.000001));
    assert_eq!(result.rows.len(), 5);
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

#[test]
fn test_analyze_loan_accepts_original_field_names() {
    let json = r#"{"InitialLoan": 70000, "Payment": 500, "YearsPaid": 23, "RemainingLoan": 60000}"#;
    let input: LoanPayoffInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.years_paid, 23);
    assert!(analyze_loan(&input).is_ok());
}

#[test]
fn test_analyze_loan_accepts_original_range_names() {
    let json = r#"{
        "InitialLoan": 70000, "Payment": 500, "YearsPaid": 23, "RemainingLoan": 60000,
        "PaymentRange": {"Start": 600, "End": 800, "Step": 50}
    }"#;
    let input: LoanPayoffInput = serde_json::from_str(json).unwrap();
    assert_eq!(
        input.payment_range,
        Some(PaymentRange::new(dec!(600), dec!(800), dec!(50)).unwrap())
    );
    let out = analyze_loan(&input).unwrap();
    assert_eq!(out.result.rows.len(), 5);
    assert_eq!(out.result.rows[0].payment, dec!(600));
}

#[test]
fn test_analyze_loan_warns_when_balance_grew() {
    let mut input = reference_input();
    input.remaining_loan = dec!(75000);
    input.payment_range = Some(PaymentRange::new(dec!(600), dec!(900), dec!(100)).unwrap());
    let out = analyze_loan(&input).unwrap();
    assert!(out
        .warnings
        .iter()
        .any(|w| w.contains("exceeds the initial loan")));
}

#[test]
fn test_analyze_loan_rejects_negative_balance() {
    let mut input = reference_input();
    input.remaining_loan = dec!(-1);
    match analyze_loan(&input) {
        Err(LoanPayoffError::InvalidInput { field, .. }) => assert_eq!(field, "remaining_loan"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}
