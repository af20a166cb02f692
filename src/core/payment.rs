//! Invoice payment state machine
//!
//! An invoice is either [`PaymentState::Unpaid`] or [`PaymentState::Paid`];
//! the `paid` / `paid_date` column pair is only ever derived from that state,
//! so `paid_date` is set exactly when `paid` is true.
//!
//! Updates are computed by [`InvoiceUpdate::apply`], a pure function of the
//! current invoice, the requested change and today's date. The persistence
//! gateway runs it inside the transaction that holds the row lock.

use crate::core::error::ValidationError;
use crate::core::model::Invoice;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Payment state of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PaymentColumns", try_from = "PaymentColumns")]
pub enum PaymentState {
    Unpaid,
    Paid { on: NaiveDate },
}

/// Column representation of [`PaymentState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentColumns {
    pub paid: bool,
    pub paid_date: Option<NaiveDate>,
}

impl From<PaymentState> for PaymentColumns {
    fn from(state: PaymentState) -> Self {
        match state {
            PaymentState::Unpaid => PaymentColumns {
                paid: false,
                paid_date: None,
            },
            PaymentState::Paid { on } => PaymentColumns {
                paid: true,
                paid_date: Some(on),
            },
        }
    }
}

impl TryFrom<PaymentColumns> for PaymentState {
    type Error = String;

    fn try_from(columns: PaymentColumns) -> Result<Self, Self::Error> {
        PaymentState::from_columns(columns.paid, columns.paid_date).ok_or_else(|| {
            format!(
                "inconsistent payment columns: paid={} paid_date={:?}",
                columns.paid, columns.paid_date
            )
        })
    }
}

impl PaymentState {
    /// Rebuild the state from stored columns.
    ///
    /// Returns `None` when the pair breaks the paid/paid_date invariant.
    pub fn from_columns(paid: bool, paid_date: Option<NaiveDate>) -> Option<Self> {
        match (paid, paid_date) {
            (false, None) => Some(PaymentState::Unpaid),
            (true, Some(on)) => Some(PaymentState::Paid { on }),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentState::Paid { .. })
    }

    pub fn paid_date(&self) -> Option<NaiveDate> {
        match self {
            PaymentState::Unpaid => None,
            PaymentState::Paid { on } => Some(*on),
        }
    }

    /// Next state for a requested `paid` value.
    ///
    /// `None` leaves the state untouched. Re-paying an already paid invoice
    /// consults `policy` for the resulting date.
    pub fn transition(self, paid: Option<bool>, today: NaiveDate, policy: PaidDatePolicy) -> Self {
        match (self, paid) {
            (state, None) => state,
            (_, Some(false)) => PaymentState::Unpaid,
            (PaymentState::Unpaid, Some(true)) => PaymentState::Paid { on: today },
            (PaymentState::Paid { on }, Some(true)) => match policy {
                PaidDatePolicy::Preserve => PaymentState::Paid { on },
                PaidDatePolicy::Refresh => PaymentState::Paid { on: today },
            },
        }
    }
}

/// What happens to `paid_date` when an already paid invoice is marked paid again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidDatePolicy {
    /// Keep the date the invoice was first paid
    #[default]
    Preserve,
    /// Reset the date to today
    Refresh,
}

impl FromStr for PaidDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(PaidDatePolicy::Preserve),
            "refresh" => Ok(PaidDatePolicy::Refresh),
            other => Err(format!("expected 'preserve' or 'refresh', got '{}'", other)),
        }
    }
}

/// A validated invoice update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceUpdate {
    pub amt: Option<Decimal>,
    pub paid: Option<bool>,
}

impl InvoiceUpdate {
    /// Validate raw `amt` / `paid` inputs. JSON `null` counts as omitted.
    pub fn parse(amt: Option<&Value>, paid: Option<&Value>) -> Result<Self, ValidationError> {
        let paid = paid
            .filter(|v| !v.is_null())
            .map(parse_paid)
            .transpose()?;
        let amt = amt
            .filter(|v| !v.is_null())
            .map(parse_amount)
            .transpose()?;

        if amt.is_none() && paid.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(Self { amt, paid })
    }

    /// Compute the updated invoice. Identity, company and `add_date` never change.
    pub fn apply(&self, current: &Invoice, today: NaiveDate, policy: PaidDatePolicy) -> Invoice {
        Invoice {
            amt: self.amt.unwrap_or(current.amt),
            payment: current.payment.transition(self.paid, today, policy),
            ..current.clone()
        }
    }
}

/// Validate and apply an update in one step.
pub fn transition(
    current: &Invoice,
    amt: Option<&Value>,
    paid: Option<&Value>,
    today: NaiveDate,
    policy: PaidDatePolicy,
) -> Result<Invoice, ValidationError> {
    Ok(InvoiceUpdate::parse(amt, paid)?.apply(current, today, policy))
}

/// Parse a `paid` input: `"true"` / `"false"` in any case, or a JSON boolean.
pub fn parse_paid(value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        Value::String(s) => Err(ValidationError::InvalidPaid { value: s.clone() }),
        other => Err(ValidationError::InvalidPaid {
            value: other.to_string(),
        }),
    }
}

/// Exclusive upper bound of a stored amount, the range of `NUMERIC(12,2)`
const AMOUNT_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Parse an `amt` input given as a JSON number or a numeric string.
///
/// The amount is rounded to cents first and must then be positive and
/// below [`AMOUNT_LIMIT`].
pub fn parse_amount(value: &Value) -> Result<Decimal, ValidationError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(ValidationError::field(
                "amt",
                format!("amt must be a number (got {})", other),
            ));
        }
    };

    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ValidationError::field("amt", format!("amt must be a number (got '{}')", text)))?;

    let amount = amount.round_dp(2);
    if amount <= Decimal::ZERO {
        return Err(ValidationError::field("amt", "amt must be greater than zero"));
    }
    if amount >= AMOUNT_LIMIT {
        return Err(ValidationError::field(
            "amt",
            format!("amt must be less than {}", AMOUNT_LIMIT),
        ));
    }
    Ok(amount)
}
