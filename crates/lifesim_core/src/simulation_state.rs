//! Runtime simulation state
//!
//! Built once per run from the validated configuration; every run owns an
//! isolated instance graph, so concurrent runs never share state.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::ScenarioConfig;
use crate::context::TaxableEvent;
use crate::model::{
    Family, FamilyYearStats, LedgerEntry, PersonId, SimulationResult, StateEvent,
};

/// Year counters for one run
#[derive(Debug, Clone, Copy)]
pub struct SimTimeline {
    pub start_year: i16,
    pub end_year: i16,
    pub current_year: i16,
}

impl SimTimeline {
    pub fn is_complete(&self) -> bool {
        self.current_year > self.end_year
    }
}

/// Append-only run history: snapshots and the state-change ledger
#[derive(Debug, Clone, Default)]
pub struct SimHistory {
    pub yearly: Vec<FamilyYearStats>,
    pub ledger: Vec<LedgerEntry>,
}

impl SimHistory {
    pub fn record(&mut self, year: i16, event: StateEvent) {
        self.ledger.push(LedgerEntry::new(year, event));
    }
}

/// Mutable state for one simulation run
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub timeline: SimTimeline,
    pub family: Family,
    pub rng: SmallRng,
    /// Taxable events deferred from the previous year's tax settlement
    pub carryover: Vec<(PersonId, TaxableEvent)>,
    pub history: SimHistory,
}

impl SimulationState {
    pub fn from_config(config: &ScenarioConfig, seed: u64) -> Self {
        let start_year = config.resolved_start_year();
        let end_year = start_year + config.duration_years.max(1) as i16 - 1;

        SimulationState {
            timeline: SimTimeline {
                start_year,
                end_year,
                current_year: start_year,
            },
            family: config.build_family(),
            rng: SmallRng::seed_from_u64(seed),
            carryover: Vec::new(),
            history: SimHistory::default(),
        }
    }

    /// Index of a person in family processing order
    pub fn person_index(&self, id: PersonId) -> Option<usize> {
        self.family.persons.iter().position(|p| p.person_id == id)
    }

    pub fn into_result(self) -> SimulationResult {
        SimulationResult {
            yearly: self.history.yearly,
            ledger: self.history.ledger,
        }
    }
}
