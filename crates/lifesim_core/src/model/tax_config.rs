//! Tax regime configuration
//!
//! Bracket tables, rates, deductions and wage bases are pure data. The tax
//! engine in `crate::taxes` reads this configuration and never mutates it,
//! so the engine itself stays tax-regime-agnostic.

use serde::{Deserialize, Serialize};

/// Filing status for income tax purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
}

/// A single progressive bracket: `rate` applies to income above `threshold`
/// up to the next bracket's threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: f64,
    pub rate: f64,
}

/// Payroll (FICA-style) tax parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PayrollTaxConfig {
    /// Flat rate up to the wage base
    pub social_security_rate: f64,
    /// Wage base cap for the capped component
    pub social_security_wage_base: f64,
    /// Flat uncapped rate
    pub medicare_rate: f64,
    /// Surtax rate applied above the filing-status threshold, uncapped
    pub additional_medicare_rate: f64,
    pub additional_threshold_single: f64,
    pub additional_threshold_married: f64,
}

impl PayrollTaxConfig {
    pub fn additional_threshold(&self, status: FilingStatus) -> f64 {
        match status {
            FilingStatus::Single => self.additional_threshold_single,
            FilingStatus::MarriedFilingJointly => self.additional_threshold_married,
        }
    }
}

/// Complete tax configuration for one simulated regime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxConfig {
    pub brackets_single: Vec<TaxBracket>,
    pub brackets_married: Vec<TaxBracket>,
    pub standard_deduction_single: f64,
    pub standard_deduction_married: f64,
    /// Flat state income tax rate
    pub state_rate: f64,
    /// Preferential flat rate on realized gains
    pub capital_gains_rate: f64,
    /// Flat surcharge on early distributions, kept outside the brackets
    pub early_withdrawal_penalty_rate: f64,
    /// Age below which a retirement distribution counts as early
    pub early_withdrawal_age: f64,
    pub payroll: PayrollTaxConfig,
}

impl TaxConfig {
    pub fn brackets(&self, status: FilingStatus) -> &[TaxBracket] {
        match status {
            FilingStatus::Single => &self.brackets_single,
            FilingStatus::MarriedFilingJointly => &self.brackets_married,
        }
    }

    pub fn standard_deduction(&self, status: FilingStatus) -> f64 {
        match status {
            FilingStatus::Single => self.standard_deduction_single,
            FilingStatus::MarriedFilingJointly => self.standard_deduction_married,
        }
    }

    /// The top marginal bracket rate for a filing status
    pub fn max_bracket_rate(&self, status: FilingStatus) -> f64 {
        self.brackets(status).last().map(|b| b.rate).unwrap_or(0.0)
    }

    /// US federal parameters as of the 2022 tables
    ///
    /// Current-law values applied to all simulated years; predicting future
    /// tax law is out of scope, so the same table carries forward.
    #[must_use]
    pub fn us_2022() -> Self {
        TaxConfig {
            brackets_single: brackets(&[
                (0.0, 0.10),
                (10_275.0, 0.12),
                (41_775.0, 0.22),
                (89_075.0, 0.24),
                (170_050.0, 0.32),
                (215_950.0, 0.35),
                (539_900.0, 0.37),
            ]),
            brackets_married: brackets(&[
                (0.0, 0.10),
                (20_550.0, 0.12),
                (83_550.0, 0.22),
                (178_150.0, 0.24),
                (340_100.0, 0.32),
                (431_900.0, 0.35),
                (647_850.0, 0.37),
            ]),
            standard_deduction_single: 12_950.0,
            standard_deduction_married: 25_900.0,
            state_rate: 0.06,
            capital_gains_rate: 0.15,
            early_withdrawal_penalty_rate: 0.10,
            early_withdrawal_age: 59.5,
            payroll: PayrollTaxConfig {
                social_security_rate: 0.062,
                social_security_wage_base: 160_200.0,
                medicare_rate: 0.0145,
                additional_medicare_rate: 0.009,
                additional_threshold_single: 200_000.0,
                additional_threshold_married: 250_000.0,
            },
        }
    }
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self::us_2022()
    }
}

fn brackets(rows: &[(f64, f64)]) -> Vec<TaxBracket> {
    rows.iter()
        .map(|&(threshold, rate)| TaxBracket { threshold, rate })
        .collect()
}

/// Obligations computed by the tax engine for one person-year
/// (or one jointly-filing couple-year)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxObligation {
    pub federal_income_tax: f64,
    pub state_tax: f64,
    pub payroll_tax: f64,
    pub penalty_tax: f64,
}

impl TaxObligation {
    pub fn total(&self) -> f64 {
        self.federal_income_tax + self.state_tax + self.payroll_tax + self.penalty_tax
    }

    pub fn add(&mut self, other: &TaxObligation) {
        self.federal_income_tax += other.federal_income_tax;
        self.state_tax += other.state_tax;
        self.payroll_tax += other.payroll_tax;
        self.penalty_tax += other.penalty_tax;
    }
}
