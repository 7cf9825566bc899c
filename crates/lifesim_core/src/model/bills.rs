//! Bills and funding sources
//!
//! A `Bill` is an ephemeral obligation created by whatever rule determined
//! it exists and consumed immediately by the payment resolution service.
//! A `FundingSource` is a reference to an instrument that can supply money
//! toward a bill; capacity and cost are always read from live instrument
//! state at resolution time, never cached.

use serde::{Deserialize, Serialize};

use super::ids::{AccountId, DebtId, PolicyId};

/// Category of a one-time payment obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillCategory {
    Tax,
    LivingExpense,
    DebtService,
    InsurancePremium,
}

/// A one-time obligation to pay a specific amount in a specific year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub amount: f64,
    pub category: BillCategory,
    pub year: i16,
}

impl Bill {
    pub fn new(amount: f64, category: BillCategory, year: i16) -> Self {
        Bill {
            amount,
            category,
            year,
        }
    }
}

/// An instrument capable of supplying money toward a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingSource {
    Account(AccountId),
    /// Draw against a revolving line, raising its principal
    DebtDraw(DebtId),
    /// Borrow against a policy's cash value
    PolicyLoan(PolicyId),
}

/// One draw executed against a funding source
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FundingDraw {
    pub source: FundingSource,
    pub amount: f64,
    /// Estimated tax cost of the draw at flat statutory rates (penalty,
    /// capital gains). The authoritative amount is computed once per year
    /// by the tax engine from the recorded taxable events.
    pub incurred_cost: f64,
}

/// The result of resolving one bill against a priority-ordered source list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingPlan {
    pub category: BillCategory,
    pub requested: f64,
    pub draws: Vec<FundingDraw>,
    /// Amount left unresolved after exhausting all sources
    pub shortfall: f64,
}

impl FundingPlan {
    /// Total amount supplied across all draws
    pub fn funded(&self) -> f64 {
        self.draws.iter().map(|d| d.amount).sum()
    }

    /// Total estimated cost across all draws
    pub fn incurred_cost(&self) -> f64 {
        self.draws.iter().map(|d| d.incurred_cost).sum()
    }
}
