//! Per-year statistics snapshots and simulation results
//!
//! One immutable snapshot is appended per simulated year. Consumers (chart
//! frontends, RL observation builders) get read-only access to the current
//! and historical snapshots; mutable instrument handles are never exposed.

use serde::{Deserialize, Serialize};

use super::ids::PersonId;
use super::state_event::LedgerEntry;
use super::tax_config::TaxObligation;

/// One person's financial summary for one simulated year
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonYearStats {
    pub person_id: PersonId,
    pub age: u8,
    /// Wages, bonuses and benefits received during the year
    pub gross_income: f64,
    pub retirement_contributions: f64,
    pub employer_match: f64,
    pub rmd_withdrawn: f64,
    /// Living expenses and premiums actually paid
    pub spending: f64,
    pub debt_service: f64,
    pub taxes: TaxObligation,
    // Ending balances by category
    pub bank_balance: f64,
    pub pretax_balance: f64,
    pub roth_balance: f64,
    pub hsa_balance: f64,
    pub brokerage_balance: f64,
    pub policy_cash_value: f64,
    pub debt_balance: f64,
    pub carried_debt: f64,
    /// At least one bill went unfunded this year
    pub insolvent: bool,
}

impl PersonYearStats {
    pub fn net_worth(&self) -> f64 {
        self.bank_balance
            + self.pretax_balance
            + self.roth_balance
            + self.hsa_balance
            + self.brokerage_balance
            + self.policy_cash_value
            - self.debt_balance
            - self.carried_debt
    }

    pub fn liquid_balance(&self) -> f64 {
        self.bank_balance
    }
}

/// Family-level snapshot: the persons' snapshots in processing order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyYearStats {
    pub year: i16,
    pub persons: Vec<PersonYearStats>,
}

impl FamilyYearStats {
    pub fn person(&self, id: PersonId) -> Option<&PersonYearStats> {
        self.persons.iter().find(|p| p.person_id == id)
    }

    pub fn net_worth(&self) -> f64 {
        self.persons.iter().map(|p| p.net_worth()).sum()
    }

    pub fn total_income(&self) -> f64 {
        self.persons.iter().map(|p| p.gross_income).sum()
    }

    pub fn total_taxes(&self) -> f64 {
        self.persons.iter().map(|p| p.taxes.total()).sum()
    }

    pub fn total_spending(&self) -> f64 {
        self.persons.iter().map(|p| p.spending).sum()
    }

    pub fn total_debt(&self) -> f64 {
        self.persons
            .iter()
            .map(|p| p.debt_balance + p.carried_debt)
            .sum()
    }

    pub fn any_insolvent(&self) -> bool {
        self.persons.iter().any(|p| p.insolvent)
    }
}

/// Complete output of a single simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Snapshots in year order, one per simulated year
    pub yearly: Vec<FamilyYearStats>,
    /// Immutable ledger of state changes, in the order they happened
    pub ledger: Vec<LedgerEntry>,
}

impl SimulationResult {
    pub fn final_year(&self) -> Option<&FamilyYearStats> {
        self.yearly.last()
    }

    pub fn final_net_worth(&self) -> f64 {
        self.final_year().map(FamilyYearStats::net_worth).unwrap_or(0.0)
    }

    /// Year-by-year series for one person
    pub fn person_series(&self, id: PersonId) -> impl Iterator<Item = &PersonYearStats> {
        self.yearly.iter().filter_map(move |y| y.person(id))
    }

    /// Years in which at least one bill went unfunded
    pub fn insolvent_years(&self) -> Vec<i16> {
        self.yearly
            .iter()
            .filter(|y| y.any_insolvent())
            .map(|y| y.year)
            .collect()
    }
}
