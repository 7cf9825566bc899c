//! Scenario configuration
//!
//! The main configuration type is `ScenarioConfig`: everything needed to run
//! a simulation, as pure data. Malformed configuration fails fast in
//! `validate()` before any year executes.
//!
//! # Builder DSL
//!
//! For ergonomic setup, use the fluent builder:
//!
//! ```ignore
//! use lifesim_core::config::{AccountBuilder, JobBuilder, PersonBuilder, ScenarioBuilder};
//!
//! let config = ScenarioBuilder::new()
//!     .start_year(2025)
//!     .years(40)
//!     .person(
//!         PersonBuilder::new("Avery", 40)
//!             .retirement_age(65.0)
//!             .account(AccountBuilder::bank("Checking").balance(25_000.0))
//!             .account(AccountBuilder::pretax_401k("Work 401k").balance(150_000.0))
//!             .job(JobBuilder::new("Engineer").salary(120_000.0).raises(0.03)
//!                 .retirement("Work 401k", 0.10, 0.0, 0.5))
//!             .spending(45_000.0, 0.02),
//!     )
//!     .build()
//!     .unwrap();
//! ```

mod builder;

pub use builder::{
    AccountBuilder, DebtBuilder, JobBuilder, PersonBuilder, PolicyBuilder, ScenarioBuilder,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{
    AccountKind, Family, FundingSource, Person, RmdTable, Spending, TaxConfig,
};

fn default_duration_years() -> usize {
    50
}

/// What an unfunded bill remainder means for the payer's year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShortfallPolicy {
    /// Flag the person insolvent for the year; the simulation continues
    #[default]
    MarkInsolvent,
    /// Carry the remainder forward as unsecured debt
    CarryDebt,
}

/// Complete simulation configuration
///
/// World assumptions (tax regime, RMD table), the household's situation
/// (persons with their instruments), and run parameters (start year,
/// horizon, shortfall policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// First simulated year; defaults to the current calendar year
    pub start_year: Option<i16>,

    /// How many years to simulate
    #[serde(default = "default_duration_years")]
    pub duration_years: usize,

    /// Tax regime (brackets, rates, deductions, wage bases)
    #[serde(default)]
    pub tax_config: TaxConfig,

    /// Required-distribution divisor table
    #[serde(default)]
    pub rmd_table: RmdTable,

    /// Policy for bill shortfalls
    #[serde(default)]
    pub shortfall_policy: ShortfallPolicy,

    /// Household members in processing order
    pub persons: Vec<Person>,

    /// Family-level expenses, split equally across persons
    #[serde(default)]
    pub shared_expenses: Spending,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            start_year: None,
            duration_years: default_duration_years(),
            tax_config: TaxConfig::default(),
            rmd_table: RmdTable::default(),
            shortfall_policy: ShortfallPolicy::default(),
            persons: Vec::new(),
            shared_expenses: Spending::default(),
        }
    }
}

impl ScenarioConfig {
    /// Validate before any year executes; all defects are fatal
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.persons.is_empty() {
            return Err(ConfigError::NoPersons);
        }

        validate_brackets(&self.tax_config.brackets_single)?;
        validate_brackets(&self.tax_config.brackets_married)?;

        for pair in self.rmd_table.entries.windows(2) {
            if pair[1].divisor >= pair[0].divisor {
                return Err(ConfigError::NonDecreasingRmdDivisors { age: pair[1].age });
            }
        }

        for person in &self.persons {
            self.validate_person(person)?;
        }

        Ok(())
    }

    fn validate_person(&self, person: &Person) -> Result<(), ConfigError> {
        if !person.accounts.iter().any(|a| a.is_liquid()) {
            return Err(ConfigError::NoBankAccount {
                person: person.name.clone(),
            });
        }

        for account in &person.accounts {
            if account.balance < 0.0 {
                return Err(ConfigError::NegativeAmount {
                    what: "account balance",
                    value: account.balance,
                });
            }
            if let AccountKind::Brokerage { cost_basis } = account.kind {
                if cost_basis < 0.0 {
                    return Err(ConfigError::NegativeAmount {
                        what: "cost basis",
                        value: cost_basis,
                    });
                }
                if cost_basis > account.balance + 1e-9 {
                    return Err(ConfigError::CostBasisExceedsBalance {
                        account: account.name.clone(),
                    });
                }
            }
            if let Some(limit) = account.contribution_limit()
                && limit < 0.0
            {
                return Err(ConfigError::NegativeAmount {
                    what: "contribution limit",
                    value: limit,
                });
            }
        }

        for debt in &person.debts {
            if debt.principal < 0.0 {
                return Err(ConfigError::NegativeAmount {
                    what: "debt principal",
                    value: debt.principal,
                });
            }
            if !debt.interest_rate.is_finite() || debt.interest_rate < 0.0 {
                return Err(ConfigError::InvalidRate {
                    what: "debt interest rate",
                    value: debt.interest_rate,
                });
            }
        }

        for source in &person.withdrawal_priority {
            let known = match *source {
                FundingSource::Account(id) => {
                    person.accounts.iter().any(|a| a.account_id == id)
                }
                FundingSource::DebtDraw(id) => person.debts.iter().any(|d| d.debt_id == id),
                FundingSource::PolicyLoan(id) => {
                    person.policies.iter().any(|p| p.policy_id == id)
                }
            };
            if !known {
                return Err(ConfigError::UnknownPrioritySource {
                    person: person.name.clone(),
                    name: format!("{source:?}"),
                });
            }
        }

        if let Some(spouse) = person.married_to
            && !self.persons.iter().any(|p| p.person_id == spouse)
        {
            return Err(ConfigError::UnknownSpouse {
                person: person.name.clone(),
                spouse: format!("{spouse:?}"),
            });
        }

        for job in &person.jobs {
            if job.salary.base < 0.0 {
                return Err(ConfigError::NegativeAmount {
                    what: "salary",
                    value: job.salary.base,
                });
            }
            if let Some(plan) = &job.retirement_plan {
                for target in [plan.pretax_account, plan.roth_account].into_iter().flatten() {
                    if person.accounts.iter().all(|a| a.account_id != target) {
                        return Err(ConfigError::UnknownAccountName {
                            person: person.name.clone(),
                            name: format!("{target:?}"),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Create a variant with a different horizon
    #[must_use]
    pub fn with_duration_years(&self, years: usize) -> Self {
        let mut config = self.clone();
        config.duration_years = years;
        config
    }

    /// First simulated year, defaulted from the calendar when unset
    pub fn resolved_start_year(&self) -> i16 {
        self.start_year
            .unwrap_or_else(|| jiff::Zoned::now().date().year())
    }
}

fn validate_brackets(brackets: &[crate::model::TaxBracket]) -> Result<(), ConfigError> {
    if brackets.is_empty() {
        return Err(ConfigError::EmptyBracketTable);
    }
    for (i, pair) in brackets.windows(2).enumerate() {
        if pair[1].threshold <= pair[0].threshold {
            return Err(ConfigError::UnsortedBracketTable { index: i + 1 });
        }
    }
    Ok(())
}

impl ScenarioConfig {
    /// Split persons out into the runtime family structure
    pub(crate) fn build_family(&self) -> Family {
        Family {
            persons: self.persons.clone(),
            shared_expenses: self.shared_expenses,
        }
    }
}
