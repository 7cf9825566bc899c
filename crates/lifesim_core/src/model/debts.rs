//! Debt definitions
//!
//! Debts are balance-owed instruments owned by exactly one person.
//! Revolving debt doubles as a funding source: its principal may grow, but
//! only through the payment resolution service.

use serde::{Deserialize, Serialize};

use super::ids::DebtId;

/// Smallest minimum payment a revolving line will demand
pub const MINIMUM_PAYMENT_FLOOR: f64 = 25.0;

/// Amortization / repayment model of a debt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DebtKind {
    /// Credit-card style line: drawable up to a limit, percentage minimum
    Revolving {
        credit_limit: f64,
        minimum_payment_percent: f64,
    },
    /// Fixed-payment loan (car, student, mortgage-style)
    Amortized { annual_payment: f64 },
}

/// A balance-owed instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub debt_id: DebtId,
    pub name: String,
    pub kind: DebtKind,
    pub principal: f64,
    pub interest_rate: f64,
}

impl Debt {
    /// Capitalize one year of interest; returns the interest amount
    pub fn accrue_interest(&mut self) -> f64 {
        let interest = self.principal * self.interest_rate;
        self.principal += interest;
        interest
    }

    /// Minimum payment due this year, never more than the principal
    pub fn minimum_payment(&self) -> f64 {
        let due = match self.kind {
            DebtKind::Revolving {
                minimum_payment_percent,
                ..
            } => (self.principal * minimum_payment_percent).max(MINIMUM_PAYMENT_FLOOR),
            DebtKind::Amortized { annual_payment } => annual_payment,
        };
        due.min(self.principal)
    }

    /// Remaining drawable capacity (zero for amortized loans)
    pub fn available_credit(&self) -> f64 {
        match self.kind {
            DebtKind::Revolving { credit_limit, .. } => {
                (credit_limit - self.principal).max(0.0)
            }
            DebtKind::Amortized { .. } => 0.0,
        }
    }

    /// Draw against the line, capped at available credit; returns the amount drawn
    pub fn draw(&mut self, amount: f64) -> f64 {
        let drawn = amount.min(self.available_credit()).max(0.0);
        self.principal += drawn;
        drawn
    }

    /// Reduce principal, capped at the outstanding balance; returns amount applied
    pub fn pay_down(&mut self, amount: f64) -> f64 {
        let applied = amount.min(self.principal).max(0.0);
        self.principal -= applied;
        applied
    }

    /// Yearly payment for a fixed-term loan (12x the standard monthly formula)
    pub fn annual_payment_for(loan_amount: f64, yearly_rate: f64, length_years: u32) -> f64 {
        let n = f64::from(length_years * 12);
        if n == 0.0 {
            return loan_amount;
        }
        let i = yearly_rate / 12.0;
        let monthly = if i == 0.0 {
            loan_amount / n
        } else {
            loan_amount * (i * (1.0 + i).powf(n)) / ((1.0 + i).powf(n) - 1.0)
        };
        monthly * 12.0
    }
}
