//! State events, the immutable ledger of simulation state changes
//!
//! Every mutation during a simulated year is recorded as a StateEvent.
//! The ledger can be used to:
//! - Audit what happened and when
//! - Verify conservation properties in tests
//! - Export to external systems

use serde::{Deserialize, Serialize};

use super::bills::{BillCategory, FundingPlan};
use super::ids::{AccountId, DebtId, PersonId, PolicyId};
use super::tax_config::TaxObligation;

/// A ledger entry recording a state change with the year it happened in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub year: i16,
    pub event: StateEvent,
}

impl LedgerEntry {
    pub fn new(year: i16, event: StateEvent) -> Self {
        Self { year, event }
    }
}

/// All recorded state mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateEvent {
    // === Income ===
    /// Gross wages deposited into the person's bank account
    WagePosted {
        person: PersonId,
        to: AccountId,
        gross: f64,
    },

    /// Social security benefit deposited once claimed
    BenefitPosted {
        person: PersonId,
        to: AccountId,
        amount: f64,
    },

    // === Growth ===
    /// One year of growth applied to an account balance
    GrowthApplied {
        account: AccountId,
        previous: f64,
        new: f64,
        rate: f64,
    },

    /// One year of interest capitalized onto a debt
    InterestAccrued {
        debt: DebtId,
        previous: f64,
        new: f64,
    },

    /// Policy cash value grew by its own rate
    CashValueGrowth {
        policy: PolicyId,
        previous: f64,
        new: f64,
    },

    // === Mandatory distributions ===
    /// Required minimum distribution taken and deposited to the bank
    RmdWithdrawal {
        person: PersonId,
        account: AccountId,
        age: u8,
        balance: f64,
        divisor: f64,
        required: f64,
        actual: f64,
    },

    // === Contributions ===
    /// Employee or planned contribution moved into a limited account
    Contribution {
        person: PersonId,
        to: AccountId,
        requested: f64,
        applied: f64,
    },

    /// Employer match credited directly to the retirement account
    EmployerMatch {
        person: PersonId,
        to: AccountId,
        amount: f64,
    },

    // === Payment resolution ===
    /// A bill resolved against the person's funding sources
    BillResolved {
        person: PersonId,
        plan: FundingPlan,
    },

    /// A bill's shortfall flagged the person insolvent for the year
    InsolvencyDeclared {
        person: PersonId,
        category: BillCategory,
        shortfall: f64,
    },

    /// A bill's shortfall carried forward as unsecured debt
    DebtCarried {
        person: PersonId,
        category: BillCategory,
        amount: f64,
    },

    /// A policy lapsed because its premium went unpaid
    PolicyLapsed {
        person: PersonId,
        policy: PolicyId,
    },

    // === Taxes ===
    /// Obligations assessed for the year (per person or joint couple)
    TaxAssessed {
        payer: PersonId,
        obligation: TaxObligation,
    },

    // === External actions ===
    /// An externally queued action was applied
    ActionApplied {
        person: PersonId,
        amount: f64,
    },

    /// An externally queued action failed validation
    ActionRejected {
        person: PersonId,
        reason: ActionRejection,
    },

    // === Year boundaries ===
    YearRollover {
        from_year: i16,
        to_year: i16,
    },
}

/// Why an external action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionRejection {
    /// The contribution would exceed the account's remaining yearly limit
    ContributionLimit,
    /// A referenced instrument does not belong to the person
    UnknownInstrument,
    /// Transfers must originate from a bank account
    NonBankTransferSource,
    /// Zero or negative amount
    InvalidAmount,
}

impl StateEvent {
    pub fn is_tax_event(&self) -> bool {
        matches!(self, StateEvent::TaxAssessed { .. })
    }

    pub fn is_payment_event(&self) -> bool {
        matches!(
            self,
            StateEvent::BillResolved { .. }
                | StateEvent::InsolvencyDeclared { .. }
                | StateEvent::DebtCarried { .. }
        )
    }

    /// The person this event belongs to, if any
    pub fn person_id(&self) -> Option<PersonId> {
        match self {
            StateEvent::WagePosted { person, .. }
            | StateEvent::BenefitPosted { person, .. }
            | StateEvent::RmdWithdrawal { person, .. }
            | StateEvent::Contribution { person, .. }
            | StateEvent::EmployerMatch { person, .. }
            | StateEvent::BillResolved { person, .. }
            | StateEvent::InsolvencyDeclared { person, .. }
            | StateEvent::DebtCarried { person, .. }
            | StateEvent::PolicyLapsed { person, .. }
            | StateEvent::ActionApplied { person, .. }
            | StateEvent::ActionRejected { person, .. } => Some(*person),
            StateEvent::TaxAssessed { payer, .. } => Some(*payer),
            _ => None,
        }
    }
}
