//! Per-year mutable context
//!
//! All cross-cutting year state (accumulated taxable events, year-to-date
//! contribution counters, per-person statistics accumulators) lives in an
//! explicit context threaded through the orchestration, never in ambient or
//! global state. Independent simulation runs therefore cannot interfere.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::model::{AccountId, PersonId, TaxObligation};

/// One taxable event recorded during a simulated year
///
/// The tax engine consumes the year's full event sequence once, in order,
/// at the taxation phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TaxableEvent {
    /// Gross wages, subject to income and payroll tax
    Wages { gross: f64 },
    /// Deductible contribution (pre-tax retirement, HSA); reduces ordinary income
    PreTaxContribution { amount: f64 },
    /// Distribution from a pre-tax account, taxed as ordinary income;
    /// `early` adds the penalty surcharge
    PreTaxDistribution { amount: f64, early: bool },
    /// Roth distribution: no income tax, penalty surcharge if early
    RothDistribution { amount: f64, early: bool },
    /// Realized gain from a brokerage withdrawal
    RealizedGain { gain: f64 },
    /// Taxable portion of a social security benefit
    SocialSecurityBenefit { taxable: f64 },
}

/// Per-person statistics accumulator, folded into the year's snapshot
#[derive(Debug, Clone, Default)]
pub struct PersonAccumulator {
    pub gross_income: f64,
    pub retirement_contributions: f64,
    pub employer_match: f64,
    pub rmd_withdrawn: f64,
    pub spending: f64,
    pub debt_service: f64,
    pub taxes: TaxObligation,
    pub insolvent: bool,
}

/// Mutable state for one simulated year
#[derive(Debug)]
pub struct YearContext {
    pub year: i16,
    /// Taxable events in the order they occurred, tagged by person
    pub taxable: Vec<(PersonId, TaxableEvent)>,
    /// Year-to-date contributions per limited account; lookup only, never iterated
    contributions_ytd: FxHashMap<AccountId, f64>,
    /// Statistics accumulators, index-aligned with family insertion order
    pub accums: Vec<PersonAccumulator>,
}

impl YearContext {
    pub fn new(year: i16, person_count: usize, carryover: Vec<(PersonId, TaxableEvent)>) -> Self {
        YearContext {
            year,
            taxable: carryover,
            contributions_ytd: FxHashMap::default(),
            accums: vec![PersonAccumulator::default(); person_count],
        }
    }

    pub fn record(&mut self, person: PersonId, event: TaxableEvent) {
        self.taxable.push((person, event));
    }

    /// Events recorded for one person, in order
    pub fn events_for(&self, person: PersonId) -> impl Iterator<Item = &TaxableEvent> {
        self.taxable
            .iter()
            .filter(move |(p, _)| *p == person)
            .map(|(_, e)| e)
    }

    pub fn contributed_ytd(&self, account: AccountId) -> f64 {
        self.contributions_ytd.get(&account).copied().unwrap_or(0.0)
    }

    /// Remaining room under a yearly limit, infinite when unlimited
    pub fn contribution_room(&self, account: AccountId, limit: Option<f64>) -> f64 {
        match limit {
            Some(limit) => (limit - self.contributed_ytd(account)).max(0.0),
            None => f64::INFINITY,
        }
    }

    pub fn record_contribution(&mut self, account: AccountId, amount: f64) {
        *self.contributions_ytd.entry(account).or_insert(0.0) += amount;
    }

    pub fn accum_mut(&mut self, index: usize) -> &mut PersonAccumulator {
        &mut self.accums[index]
    }
}
