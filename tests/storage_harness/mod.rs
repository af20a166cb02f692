//! Shared test harness for store backends
//!
//! Provides record builders and assertions used by the `store_contract_tests!`
//! and `rest_integration_tests!` macros.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]


#[macro_use]
pub mod rest_tests;

use biztime::core::model::{Company, Industry, NewInvoice};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// A company with a description
pub fn company(code: &str, name: &str) -> Company {
    Company {
        code: code.to_string(),
        name: name.to_string(),
        description: Some(format!("{} description", name)),
    }
}

pub fn industry(code: &str, label: &str) -> Industry {
    Industry {
        code: code.to_string(),
        industry: label.to_string(),
    }
}

/// A new invoice dated today for a whole-unit amount
pub fn new_invoice(comp_code: &str, amt: i64) -> NewInvoice {
    NewInvoice {
        comp_code: comp_code.to_string(),
        amt: Decimal::from(amt),
        add_date: today(),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

// ---------------------------------------------------------------------------
// Assertions helpers
// ---------------------------------------------------------------------------

/// Assert a JSON amount equals `expected` (amounts serialize as numbers)
pub fn assert_amount(value: &Value, expected: f64) {
    let actual = value
        .as_f64()
        .unwrap_or_else(|| panic!("Expected a numeric amount, got {}", value));
    assert!(
        (actual - expected).abs() < 1e-9,
        "Expected amount {}, got {}",
        expected,
        actual
    );
}

/// Assert an error envelope carries the given status and code
pub fn assert_error_envelope(body: &Value, status: u16, code: &str) {
    assert_eq!(body["error"]["status"], status, "body: {}", body);
    assert_eq!(body["error"]["code"], code, "body: {}", body);
    assert!(
        body["error"]["message"].as_str().is_some(),
        "error message missing: {}",
        body
    );
}

/// Assert that a list contains exactly `n` items.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}
