mod accounts;
mod bills;
mod debts;
mod ids;
mod insurance;
mod people;
mod rmd;
mod state_event;
mod statistics;
mod tax_config;

pub use accounts::{Account, AccountKind, GrowthProfile, Withdrawal};
pub use bills::{Bill, BillCategory, FundingDraw, FundingPlan, FundingSource};
pub use debts::{Debt, DebtKind, MINIMUM_PAYMENT_FLOOR};
pub use ids::{AccountId, DebtId, PersonId, PolicyId};
pub use insurance::InsurancePolicy;
pub use people::{
    Family, Job, Person, PlannedContribution, RetirementPlan, Salary, SocialSecurity, Spending,
};
pub use rmd::{RmdTable, RmdTableEntry};
pub use state_event::{ActionRejection, LedgerEntry, StateEvent};
pub use statistics::{FamilyYearStats, PersonYearStats, SimulationResult};
pub use tax_config::{FilingStatus, PayrollTaxConfig, TaxBracket, TaxConfig, TaxObligation};
