//! Finance formulas and their input form
//!
//! Error prevention: requests are validated before any formula runs, so a
//! zero compounding frequency or loan term never reaches a division.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::parse_float_prefix;

/// Result type for finance calculations
pub type FinanceResult<T> = Result<T, FinanceError>;

/// Finance validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinanceError {
    /// Compounding frequency must be positive
    #[error("Compounds per year must be positive, got {0}")]
    InvalidCompounding(f64),
    /// Loan term must be positive
    #[error("Loan term must be a positive number of months, got {0}")]
    InvalidTerm(f64),
    /// Inputs produced NaN or infinity
    #[error("Result is not a finite amount")]
    NonFinite,
}

/// Compound interest: `P * (1 + r/n)^(n*t)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestRequest {
    /// Principal amount
    pub principal: f64,
    /// Annual interest rate as a decimal (0.05 = 5%)
    pub rate: f64,
    /// Time in years
    pub years: f64,
    /// Compounding periods per year
    pub compounds_per_year: f64,
}

impl CompoundInterestRequest {
    /// Returns the final amount
    pub fn calculate(&self) -> FinanceResult<f64> {
        let n = self.compounds_per_year;
        if !(n > 0.0) {
            return Err(FinanceError::InvalidCompounding(n));
        }
        finite(self.principal * (1.0 + self.rate / n).powf(n * self.years))
    }
}

/// Amortized loan payment: `P * i * (1+i)^m / ((1+i)^m - 1)`, `i = rate/12`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanPaymentRequest {
    /// Loan amount
    pub principal: f64,
    /// Annual interest rate as a decimal
    pub annual_rate: f64,
    /// Loan term in months
    pub months: f64,
}

impl LoanPaymentRequest {
    /// Returns the monthly payment
    pub fn calculate(&self) -> FinanceResult<f64> {
        let m = self.months;
        if !(m > 0.0) {
            return Err(FinanceError::InvalidTerm(m));
        }
        let i = self.annual_rate / 12.0;
        if i == 0.0 {
            return finite(self.principal / m);
        }
        let growth = (1.0 + i).powf(m);
        finite(self.principal * i * growth / (growth - 1.0))
    }
}

fn finite(amount: f64) -> FinanceResult<f64> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(FinanceError::NonFinite)
    }
}

/// A finance calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinanceRequest {
    /// Compound interest
    CompoundInterest(CompoundInterestRequest),
    /// Loan payment
    LoanPayment(LoanPaymentRequest),
}

impl FinanceRequest {
    /// Runs the formula
    pub fn calculate(&self) -> FinanceResult<f64> {
        match self {
            Self::CompoundInterest(request) => request.calculate(),
            Self::LoanPayment(request) => request.calculate(),
        }
    }
}

/// Formats an amount with two decimals
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Which finance form is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinanceKind {
    /// Compound interest form
    CompoundInterest,
    /// Loan payment form
    LoanPayment,
}

impl FinanceKind {
    /// Form title
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::CompoundInterest => "Compound Interest",
            Self::LoanPayment => "Loan Payment",
        }
    }

    /// Field prompts in input order
    #[must_use]
    pub const fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::CompoundInterest => &[
                "Principal amount",
                "Annual interest rate (decimal)",
                "Time in years",
                "Compounds per year",
            ],
            Self::LoanPayment => &[
                "Loan amount",
                "Annual interest rate (decimal)",
                "Loan term (months)",
            ],
        }
    }
}

/// Raw text typed into a finance form
///
/// Fields parse with "leading number, else 0" rules; an empty compounding
/// field means once per year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceForm {
    kind: FinanceKind,
    fields: Vec<String>,
    focus: usize,
}

impl FinanceForm {
    /// Creates an empty form
    #[must_use]
    pub fn new(kind: FinanceKind) -> Self {
        Self {
            kind,
            fields: vec![String::new(); kind.labels().len()],
            focus: 0,
        }
    }

    /// Creates a form with its fields filled in order
    #[must_use]
    pub fn with_fields(kind: FinanceKind, values: &[&str]) -> Self {
        let mut form = Self::new(kind);
        for (field, value) in form.fields.iter_mut().zip(values) {
            field.push_str(value);
        }
        form
    }

    /// Returns the form kind
    #[must_use]
    pub const fn kind(&self) -> FinanceKind {
        self.kind
    }

    /// Returns the raw field texts
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Index of the field being edited
    #[must_use]
    pub const fn focus(&self) -> usize {
        self.focus
    }

    /// Moves focus to the next field, wrapping
    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    /// Moves focus to the previous field, wrapping
    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Types a character into the focused field
    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.push(c);
        }
    }

    /// Deletes the last character of the focused field
    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.pop();
        }
    }

    fn number(&self, index: usize, empty_default: f64) -> f64 {
        match self.fields.get(index).map(|f| f.trim()) {
            None | Some("") => empty_default,
            Some(text) => parse_float_prefix(text).unwrap_or(0.0),
        }
    }

    /// Converts the raw fields into a request
    #[must_use]
    pub fn to_request(&self) -> FinanceRequest {
        match self.kind {
            FinanceKind::CompoundInterest => {
                FinanceRequest::CompoundInterest(CompoundInterestRequest {
                    principal: self.number(0, 0.0),
                    rate: self.number(1, 0.0),
                    years: self.number(2, 0.0),
                    compounds_per_year: self.number(3, 1.0),
                })
            }
            FinanceKind::LoanPayment => FinanceRequest::LoanPayment(LoanPaymentRequest {
                principal: self.number(0, 0.0),
                annual_rate: self.number(1, 0.0),
                months: self.number(2, 0.0),
            }),
        }
    }
}
