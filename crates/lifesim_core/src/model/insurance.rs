//! Whole-life insurance policies
//!
//! A policy charges an annual premium bill and accumulates cash value.
//! The cash value is a last-resort funding source: a policy loan reduces
//! the cash value without any tax event. A policy whose premium goes
//! unpaid lapses and stops charging.

use serde::{Deserialize, Serialize};

use super::ids::PolicyId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub policy_id: PolicyId,
    pub name: String,
    pub coverage: f64,
    pub annual_premium: f64,
    pub cash_value: f64,
    pub cash_value_growth_rate: f64,
    pub active: bool,
}

impl InsurancePolicy {
    /// Grow cash value by one year; runs in the growth phase
    pub fn apply_growth(&mut self) {
        if self.active {
            self.cash_value *= 1.0 + self.cash_value_growth_rate;
        }
    }

    pub fn loan_capacity(&self) -> f64 {
        if self.active { self.cash_value } else { 0.0 }
    }

    /// Borrow against cash value; returns the amount actually supplied
    pub fn take_loan(&mut self, amount: f64) -> f64 {
        let taken = amount.min(self.loan_capacity()).max(0.0);
        self.cash_value -= taken;
        taken
    }

    pub fn lapse(&mut self) {
        self.active = false;
    }
}
