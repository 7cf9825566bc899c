//! Persons, families, jobs and spending habits
//!
//! The ownership graph is a strict tree: a family owns its persons, and a
//! person owns its accounts, debts and policies by composition. Persons are
//! processed in family insertion order everywhere, which is what makes runs
//! with identical inputs reproduce identically.

use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};

use super::accounts::{Account, AccountKind};
use super::bills::FundingSource;
use super::debts::Debt;
use super::ids::{AccountId, DebtId, PersonId, PolicyId};
use super::insurance::InsurancePolicy;
use super::tax_config::FilingStatus;

/// Yearly salary with automatic raises and a percentage bonus
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Salary {
    pub base: f64,
    /// Fractional raise applied at each year end (0.03 = 3%)
    pub yearly_increase: f64,
    /// Bonus as a fraction of base, paid every year
    pub bonus_percent: f64,
}

impl Salary {
    pub fn bonus(&self) -> f64 {
        self.base * self.bonus_percent
    }

    pub fn gross(&self) -> f64 {
        self.base + self.bonus()
    }

    pub fn advance_year(&mut self) {
        self.base += self.base * self.yearly_increase;
    }
}

/// Employer retirement plan attached to a job
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetirementPlan {
    pub pretax_account: Option<AccountId>,
    pub roth_account: Option<AccountId>,
    /// Employee deferral as a fraction of base salary
    pub pretax_percent: f64,
    pub roth_percent: f64,
    /// Employer match as a fraction of the employee's total deferral
    pub employer_match_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub salary: Salary,
    pub retirement_plan: Option<RetirementPlan>,
    pub active: bool,
}

impl Job {
    pub fn retire(&mut self) {
        self.active = false;
    }
}

/// Discretionary yearly spending with inflation-style drift
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Spending {
    pub base: f64,
    pub yearly_increase: f64,
    /// One-time expenses added during the year, cleared at year end
    pub one_time_expenses: f64,
}

impl Spending {
    pub fn new(base: f64, yearly_increase: f64) -> Self {
        Spending {
            base,
            yearly_increase,
            one_time_expenses: 0.0,
        }
    }

    pub fn add_expense(&mut self, amount: f64) {
        self.one_time_expenses += amount;
    }

    pub fn yearly_spending(&self) -> f64 {
        self.base + self.one_time_expenses
    }

    pub fn advance_year(&mut self) {
        self.base += self.base * self.yearly_increase;
        self.one_time_expenses = 0.0;
    }
}

/// Simplified social security benefit: a fixed annual amount once claimed,
/// with a configurable taxable portion
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SocialSecurity {
    pub claiming_age: u8,
    pub annual_benefit: f64,
    pub taxable_portion: f64,
}

/// A standing yearly contribution from the bank account into a target
/// account, capped by the target's remaining limit
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlannedContribution {
    pub to: AccountId,
    pub amount: f64,
}

/// An agent holding jobs, accounts, debts and insurance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub person_id: PersonId,
    pub name: String,
    pub age: u8,
    pub retirement_age: f64,
    pub filing_status: FilingStatus,
    pub married_to: Option<PersonId>,
    pub jobs: Vec<Job>,
    pub accounts: Vec<Account>,
    pub debts: Vec<Debt>,
    pub policies: Vec<InsurancePolicy>,
    pub spending: Spending,
    pub social_security: Option<SocialSecurity>,
    pub planned_contributions: Vec<PlannedContribution>,
    /// Ordered funding sources used when this person's bills resolve
    pub withdrawal_priority: Vec<FundingSource>,
    /// Unsecured shortfall carried forward under the carry-debt policy
    pub carried_debt: f64,
    pub retired: bool,
}

impl Person {
    pub fn is_retired(&self) -> bool {
        f64::from(self.age) >= self.retirement_age
    }

    pub fn account(&self, id: AccountId) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.account_id == id)
            .ok_or(LookupError::AccountNotFound(id))
    }

    pub fn account_mut(&mut self, id: AccountId) -> Result<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.account_id == id)
            .ok_or(LookupError::AccountNotFound(id))
    }

    pub fn debt_mut(&mut self, id: DebtId) -> Result<&mut Debt> {
        self.debts
            .iter_mut()
            .find(|d| d.debt_id == id)
            .ok_or(LookupError::DebtNotFound(id))
    }

    pub fn policy_mut(&mut self, id: PolicyId) -> Result<&mut InsurancePolicy> {
        self.policies
            .iter_mut()
            .find(|p| p.policy_id == id)
            .ok_or(LookupError::PolicyNotFound(id))
    }

    /// The deposit target for wages, benefits and distribution proceeds
    pub fn first_bank_account_id(&self) -> Result<AccountId> {
        self.accounts
            .iter()
            .find(|a| a.is_liquid())
            .map(|a| a.account_id)
            .ok_or(LookupError::NoBankAccount(self.person_id))
    }

    pub fn deposit_to_bank(&mut self, amount: f64) -> Result<()> {
        let bank = self.first_bank_account_id()?;
        self.account_mut(bank)?.deposit(amount);
        Ok(())
    }

    pub fn bank_balance(&self) -> f64 {
        self.balance_where(|k| matches!(k, AccountKind::Bank))
    }

    pub fn pretax_balance(&self) -> f64 {
        self.balance_where(|k| matches!(k, AccountKind::PreTaxRetirement { .. }))
    }

    pub fn roth_balance(&self) -> f64 {
        self.balance_where(|k| matches!(k, AccountKind::RothRetirement { .. }))
    }

    pub fn hsa_balance(&self) -> f64 {
        self.balance_where(|k| matches!(k, AccountKind::HealthSavings { .. }))
    }

    pub fn brokerage_balance(&self) -> f64 {
        self.balance_where(|k| matches!(k, AccountKind::Brokerage { .. }))
    }

    pub fn total_debt(&self) -> f64 {
        self.debts.iter().map(|d| d.principal).sum::<f64>() + self.carried_debt
    }

    pub fn policy_cash_value(&self) -> f64 {
        self.policies.iter().map(|p| p.cash_value).sum()
    }

    fn balance_where(&self, pred: impl Fn(&AccountKind) -> bool) -> f64 {
        self.accounts
            .iter()
            .filter(|a| pred(&a.kind))
            .map(|a| a.balance)
            .sum()
    }
}

/// The top-level agent container
///
/// Persons are processed strictly in insertion order; shared expenses are
/// split equally and written only by the family orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub persons: Vec<Person>,
    pub shared_expenses: Spending,
}

impl Family {
    pub fn person(&self, id: PersonId) -> Result<&Person> {
        self.persons
            .iter()
            .find(|p| p.person_id == id)
            .ok_or(LookupError::PersonNotFound(id))
    }

    pub fn person_mut(&mut self, id: PersonId) -> Result<&mut Person> {
        self.persons
            .iter_mut()
            .find(|p| p.person_id == id)
            .ok_or(LookupError::PersonNotFound(id))
    }

    /// Equal split of this year's shared expenses
    pub fn shared_expense_share(&self) -> f64 {
        if self.persons.is_empty() {
            0.0
        } else {
            self.shared_expenses.yearly_spending() / self.persons.len() as f64
        }
    }
}
