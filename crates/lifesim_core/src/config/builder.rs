//! Scenario builder
//!
//! Fluent API for assembling a `ScenarioConfig` with automatic id
//! assignment and name-based references. Instrument names only exist at
//! build time; the runtime engine works purely with typed ids.

use super::{ScenarioConfig, ShortfallPolicy};
use crate::error::ConfigError;
use crate::model::{
    Account, AccountId, AccountKind, Debt, DebtId, DebtKind, FilingStatus, FundingSource,
    GrowthProfile, InsurancePolicy, Job, Person, PersonId, PlannedContribution, PolicyId,
    RetirementPlan, RmdTable, Salary, SocialSecurity, Spending, TaxConfig,
};

// Default yearly contribution limits used by the account presets
const DEFAULT_401K_LIMIT: f64 = 20_500.0;
const DEFAULT_IRA_LIMIT: f64 = 6_000.0;
const DEFAULT_HSA_LIMIT: f64 = 4_150.0;

// ============================================================================
// Account builder
// ============================================================================

/// Builder for a single account, created through kind-specific presets
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    name: String,
    kind: AccountKind,
    balance: f64,
    growth: GrowthProfile,
}

impl AccountBuilder {
    fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        AccountBuilder {
            name: name.into(),
            kind,
            balance: 0.0,
            growth: GrowthProfile::Fixed(0.0),
        }
    }

    /// Checking / savings account
    #[must_use]
    pub fn bank(name: impl Into<String>) -> Self {
        Self::new(name, AccountKind::Bank)
    }

    /// Employer pre-tax retirement account
    #[must_use]
    pub fn pretax_401k(name: impl Into<String>) -> Self {
        Self::new(
            name,
            AccountKind::PreTaxRetirement {
                contribution_limit: Some(DEFAULT_401K_LIMIT),
            },
        )
    }

    /// Traditional IRA
    #[must_use]
    pub fn traditional_ira(name: impl Into<String>) -> Self {
        Self::new(
            name,
            AccountKind::PreTaxRetirement {
                contribution_limit: Some(DEFAULT_IRA_LIMIT),
            },
        )
    }

    /// Employer Roth account
    #[must_use]
    pub fn roth_401k(name: impl Into<String>) -> Self {
        Self::new(
            name,
            AccountKind::RothRetirement {
                contribution_limit: Some(DEFAULT_401K_LIMIT),
            },
        )
    }

    /// Roth IRA
    #[must_use]
    pub fn roth_ira(name: impl Into<String>) -> Self {
        Self::new(
            name,
            AccountKind::RothRetirement {
                contribution_limit: Some(DEFAULT_IRA_LIMIT),
            },
        )
    }

    /// Health savings account
    #[must_use]
    pub fn hsa(name: impl Into<String>) -> Self {
        Self::new(
            name,
            AccountKind::HealthSavings {
                contribution_limit: Some(DEFAULT_HSA_LIMIT),
            },
        )
    }

    /// Taxable brokerage; cost basis defaults to the starting balance
    #[must_use]
    pub fn brokerage(name: impl Into<String>) -> Self {
        Self::new(name, AccountKind::Brokerage { cost_basis: -1.0 })
    }

    #[must_use]
    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    /// Fixed annual growth rate (0.07 = 7%)
    #[must_use]
    pub fn growth(mut self, rate: f64) -> Self {
        self.growth = GrowthProfile::Fixed(rate);
        self
    }

    /// Stochastic annual growth, sampled from the run's seeded generator
    #[must_use]
    pub fn growth_normal(mut self, mean: f64, std_dev: f64) -> Self {
        self.growth = GrowthProfile::Normal { mean, std_dev };
        self
    }

    /// Override the yearly contribution limit (None removes it)
    #[must_use]
    pub fn limit(mut self, limit: Option<f64>) -> Self {
        match &mut self.kind {
            AccountKind::PreTaxRetirement { contribution_limit }
            | AccountKind::RothRetirement { contribution_limit }
            | AccountKind::HealthSavings { contribution_limit } => *contribution_limit = limit,
            AccountKind::Bank | AccountKind::Brokerage { .. } => {}
        }
        self
    }

    /// Explicit cost basis for a brokerage account
    #[must_use]
    pub fn cost_basis(mut self, basis: f64) -> Self {
        if let AccountKind::Brokerage { cost_basis } = &mut self.kind {
            *cost_basis = basis;
        }
        self
    }

    fn build(self, account_id: AccountId) -> Account {
        let mut kind = self.kind;
        if let AccountKind::Brokerage { cost_basis } = &mut kind
            && *cost_basis < 0.0
        {
            *cost_basis = self.balance;
        }
        Account {
            account_id,
            name: self.name,
            kind,
            balance: self.balance,
            growth: self.growth,
        }
    }
}

// ============================================================================
// Debt builder
// ============================================================================

#[derive(Debug, Clone)]
pub struct DebtBuilder {
    name: String,
    kind: DebtKind,
    principal: f64,
    interest_rate: f64,
}

impl DebtBuilder {
    /// Revolving credit line
    #[must_use]
    pub fn credit_card(name: impl Into<String>, credit_limit: f64) -> Self {
        DebtBuilder {
            name: name.into(),
            kind: DebtKind::Revolving {
                credit_limit,
                minimum_payment_percent: 0.02,
            },
            principal: 0.0,
            interest_rate: 0.18,
        }
    }

    /// Fixed-term loan; the yearly payment comes from the standard formula
    #[must_use]
    pub fn loan(name: impl Into<String>, amount: f64, rate: f64, years: u32) -> Self {
        DebtBuilder {
            name: name.into(),
            kind: DebtKind::Amortized {
                annual_payment: Debt::annual_payment_for(amount, rate, years),
            },
            principal: amount,
            interest_rate: rate,
        }
    }

    #[must_use]
    pub fn balance(mut self, principal: f64) -> Self {
        self.principal = principal;
        self
    }

    #[must_use]
    pub fn rate(mut self, rate: f64) -> Self {
        self.interest_rate = rate;
        self
    }

    #[must_use]
    pub fn minimum_payment_percent(mut self, percent: f64) -> Self {
        if let DebtKind::Revolving {
            minimum_payment_percent,
            ..
        } = &mut self.kind
        {
            *minimum_payment_percent = percent;
        }
        self
    }

    fn build(self, debt_id: DebtId) -> Debt {
        Debt {
            debt_id,
            name: self.name,
            kind: self.kind,
            principal: self.principal,
            interest_rate: self.interest_rate,
        }
    }
}

// ============================================================================
// Job builder
// ============================================================================

#[derive(Debug, Clone)]
pub struct JobBuilder {
    name: String,
    salary: Salary,
    pretax_target: Option<(String, f64, f64)>,
    roth_target: Option<(String, f64)>,
}

impl JobBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        JobBuilder {
            name: name.into(),
            salary: Salary {
                base: 0.0,
                yearly_increase: 0.0,
                bonus_percent: 0.0,
            },
            pretax_target: None,
            roth_target: None,
        }
    }

    #[must_use]
    pub fn salary(mut self, base: f64) -> Self {
        self.salary.base = base;
        self
    }

    #[must_use]
    pub fn raises(mut self, yearly_increase: f64) -> Self {
        self.salary.yearly_increase = yearly_increase;
        self
    }

    #[must_use]
    pub fn bonus(mut self, bonus_percent: f64) -> Self {
        self.salary.bonus_percent = bonus_percent;
        self
    }

    /// Pre-tax deferral into the named account, with an employer match
    /// expressed as a fraction of the employee's deferral
    #[must_use]
    pub fn retirement(
        mut self,
        account: impl Into<String>,
        pretax_percent: f64,
        roth_percent: f64,
        employer_match_percent: f64,
    ) -> Self {
        let account = account.into();
        self.pretax_target = Some((account.clone(), pretax_percent, employer_match_percent));
        if roth_percent > 0.0 {
            self.roth_target = Some((account, roth_percent));
        }
        self
    }

    /// Roth deferral into a separately named account
    #[must_use]
    pub fn roth_deferral(mut self, account: impl Into<String>, roth_percent: f64) -> Self {
        self.roth_target = Some((account.into(), roth_percent));
        self
    }
}

// ============================================================================
// Policy builder
// ============================================================================

#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    name: String,
    coverage: f64,
    annual_premium: f64,
    cash_value: f64,
    cash_value_growth_rate: f64,
}

impl PolicyBuilder {
    #[must_use]
    pub fn whole_life(name: impl Into<String>) -> Self {
        PolicyBuilder {
            name: name.into(),
            coverage: 0.0,
            annual_premium: 0.0,
            cash_value: 0.0,
            cash_value_growth_rate: 0.02,
        }
    }

    #[must_use]
    pub fn coverage(mut self, coverage: f64) -> Self {
        self.coverage = coverage;
        self
    }

    #[must_use]
    pub fn premium(mut self, annual_premium: f64) -> Self {
        self.annual_premium = annual_premium;
        self
    }

    #[must_use]
    pub fn cash_value(mut self, cash_value: f64) -> Self {
        self.cash_value = cash_value;
        self
    }

    #[must_use]
    pub fn cash_value_growth(mut self, rate: f64) -> Self {
        self.cash_value_growth_rate = rate;
        self
    }

    fn build(self, policy_id: PolicyId) -> InsurancePolicy {
        InsurancePolicy {
            policy_id,
            name: self.name,
            coverage: self.coverage,
            annual_premium: self.annual_premium,
            cash_value: self.cash_value,
            cash_value_growth_rate: self.cash_value_growth_rate,
            active: true,
        }
    }
}

// ============================================================================
// Person builder
// ============================================================================

#[derive(Debug, Clone)]
pub struct PersonBuilder {
    name: String,
    age: u8,
    retirement_age: f64,
    accounts: Vec<AccountBuilder>,
    debts: Vec<DebtBuilder>,
    jobs: Vec<JobBuilder>,
    policies: Vec<PolicyBuilder>,
    spending: Spending,
    social_security: Option<SocialSecurity>,
    contributions: Vec<(String, f64)>,
    priority: Vec<String>,
}

impl PersonBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, age: u8) -> Self {
        PersonBuilder {
            name: name.into(),
            age,
            retirement_age: 65.0,
            accounts: Vec::new(),
            debts: Vec::new(),
            jobs: Vec::new(),
            policies: Vec::new(),
            spending: Spending::default(),
            social_security: None,
            contributions: Vec::new(),
            priority: Vec::new(),
        }
    }

    #[must_use]
    pub fn retirement_age(mut self, age: f64) -> Self {
        self.retirement_age = age;
        self
    }

    #[must_use]
    pub fn account(mut self, account: AccountBuilder) -> Self {
        self.accounts.push(account);
        self
    }

    #[must_use]
    pub fn debt(mut self, debt: DebtBuilder) -> Self {
        self.debts.push(debt);
        self
    }

    #[must_use]
    pub fn job(mut self, job: JobBuilder) -> Self {
        self.jobs.push(job);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: PolicyBuilder) -> Self {
        self.policies.push(policy);
        self
    }

    #[must_use]
    pub fn spending(mut self, base: f64, yearly_increase: f64) -> Self {
        self.spending = Spending::new(base, yearly_increase);
        self
    }

    #[must_use]
    pub fn social_security(mut self, claiming_age: u8, annual_benefit: f64) -> Self {
        self.social_security = Some(SocialSecurity {
            claiming_age,
            annual_benefit,
            taxable_portion: 0.85,
        });
        self
    }

    /// Standing yearly contribution from the bank into the named account
    #[must_use]
    pub fn contribute(mut self, account: impl Into<String>, amount: f64) -> Self {
        self.contributions.push((account.into(), amount));
        self
    }

    /// Withdrawal priority as an ordered list of instrument names
    ///
    /// When unset, the default is every bank account followed by every Roth
    /// account, in declaration order.
    #[must_use]
    pub fn priority<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority = names.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// Scenario builder
// ============================================================================

/// Top-level builder assembling the full scenario
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    start_year: Option<i16>,
    duration_years: Option<usize>,
    tax_config: Option<TaxConfig>,
    rmd_table: Option<RmdTable>,
    shortfall_policy: ShortfallPolicy,
    shared_expenses: Spending,
    persons: Vec<PersonBuilder>,
    marriages: Vec<(String, String)>,
}

impl ScenarioBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn start_year(mut self, year: i16) -> Self {
        self.start_year = Some(year);
        self
    }

    #[must_use]
    pub fn years(mut self, years: usize) -> Self {
        self.duration_years = Some(years);
        self
    }

    #[must_use]
    pub fn tax_config(mut self, config: TaxConfig) -> Self {
        self.tax_config = Some(config);
        self
    }

    #[must_use]
    pub fn rmd_table(mut self, table: RmdTable) -> Self {
        self.rmd_table = Some(table);
        self
    }

    #[must_use]
    pub fn shortfall_policy(mut self, policy: ShortfallPolicy) -> Self {
        self.shortfall_policy = policy;
        self
    }

    #[must_use]
    pub fn shared_expenses(mut self, base: f64, yearly_increase: f64) -> Self {
        self.shared_expenses = Spending::new(base, yearly_increase);
        self
    }

    #[must_use]
    pub fn person(mut self, person: PersonBuilder) -> Self {
        self.persons.push(person);
        self
    }

    /// Marry two persons by name: links them and switches both to joint filing
    #[must_use]
    pub fn married(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.marriages.push((a.into(), b.into()));
        self
    }

    /// Resolve names, assign ids and validate the assembled scenario
    pub fn build(self) -> Result<ScenarioConfig, ConfigError> {
        let mut next_account: u16 = 0;
        let mut next_debt: u16 = 0;
        let mut next_policy: u16 = 0;

        let mut persons = Vec::with_capacity(self.persons.len());
        for (index, pb) in self.persons.into_iter().enumerate() {
            let person_id = PersonId(index as u16);
            let person_name = pb.name.clone();

            let mut accounts = Vec::with_capacity(pb.accounts.len());
            for ab in pb.accounts {
                accounts.push(ab.build(AccountId(next_account)));
                next_account += 1;
            }
            let mut debts = Vec::with_capacity(pb.debts.len());
            for db in pb.debts {
                debts.push(db.build(DebtId(next_debt)));
                next_debt += 1;
            }
            let mut policies = Vec::with_capacity(pb.policies.len());
            for plb in pb.policies {
                policies.push(plb.build(PolicyId(next_policy)));
                next_policy += 1;
            }

            check_unique_names(&person_name, &accounts, &debts, &policies)?;

            let find_account = |name: &str| -> Result<AccountId, ConfigError> {
                accounts
                    .iter()
                    .find(|a| a.name == name)
                    .map(|a| a.account_id)
                    .ok_or_else(|| ConfigError::UnknownAccountName {
                        person: person_name.clone(),
                        name: name.to_string(),
                    })
            };

            let mut jobs = Vec::with_capacity(pb.jobs.len());
            for jb in pb.jobs {
                let mut plan = RetirementPlan {
                    pretax_account: None,
                    roth_account: None,
                    pretax_percent: 0.0,
                    roth_percent: 0.0,
                    employer_match_percent: 0.0,
                };
                let mut has_plan = false;
                if let Some((target, pct, match_pct)) = &jb.pretax_target {
                    plan.pretax_account = Some(find_account(target)?);
                    plan.pretax_percent = *pct;
                    plan.employer_match_percent = *match_pct;
                    has_plan = true;
                }
                if let Some((target, pct)) = &jb.roth_target {
                    plan.roth_account = Some(find_account(target)?);
                    plan.roth_percent = *pct;
                    has_plan = true;
                }
                jobs.push(Job {
                    name: jb.name,
                    salary: jb.salary,
                    retirement_plan: has_plan.then_some(plan),
                    active: true,
                });
            }

            let mut planned_contributions = Vec::with_capacity(pb.contributions.len());
            for (target, amount) in &pb.contributions {
                planned_contributions.push(PlannedContribution {
                    to: find_account(target)?,
                    amount: *amount,
                });
            }

            let withdrawal_priority = if pb.priority.is_empty() {
                default_priority(&accounts)
            } else {
                resolve_priority(&person_name, &pb.priority, &accounts, &debts, &policies)?
            };

            persons.push(Person {
                person_id,
                name: person_name,
                age: pb.age,
                retirement_age: pb.retirement_age,
                filing_status: FilingStatus::Single,
                married_to: None,
                jobs,
                accounts,
                debts,
                policies,
                spending: pb.spending,
                social_security: pb.social_security,
                planned_contributions,
                withdrawal_priority,
                carried_debt: 0.0,
                retired: false,
            });
        }

        for (a, b) in &self.marriages {
            let id_a = find_person(&persons, a)?;
            let id_b = find_person(&persons, b)?;
            link_spouses(&mut persons, id_a, id_b);
        }

        let config = ScenarioConfig {
            start_year: self.start_year,
            duration_years: self.duration_years.unwrap_or(50),
            tax_config: self.tax_config.unwrap_or_default(),
            rmd_table: self.rmd_table.unwrap_or_default(),
            shortfall_policy: self.shortfall_policy,
            persons,
            shared_expenses: self.shared_expenses,
        };
        config.validate()?;
        Ok(config)
    }
}

fn check_unique_names(
    person: &str,
    accounts: &[Account],
    debts: &[Debt],
    policies: &[InsurancePolicy],
) -> Result<(), ConfigError> {
    let mut seen = Vec::new();
    let names = accounts
        .iter()
        .map(|a| a.name.as_str())
        .chain(debts.iter().map(|d| d.name.as_str()))
        .chain(policies.iter().map(|p| p.name.as_str()));
    for name in names {
        if seen.contains(&name) {
            return Err(ConfigError::DuplicateName {
                name: format!("{person}/{name}"),
            });
        }
        seen.push(name);
    }
    Ok(())
}

fn default_priority(accounts: &[Account]) -> Vec<FundingSource> {
    let banks = accounts
        .iter()
        .filter(|a| matches!(a.kind, AccountKind::Bank))
        .map(|a| FundingSource::Account(a.account_id));
    let roths = accounts
        .iter()
        .filter(|a| matches!(a.kind, AccountKind::RothRetirement { .. }))
        .map(|a| FundingSource::Account(a.account_id));
    banks.chain(roths).collect()
}

fn resolve_priority(
    person: &str,
    names: &[String],
    accounts: &[Account],
    debts: &[Debt],
    policies: &[InsurancePolicy],
) -> Result<Vec<FundingSource>, ConfigError> {
    names
        .iter()
        .map(|name| {
            if let Some(a) = accounts.iter().find(|a| &a.name == name) {
                Ok(FundingSource::Account(a.account_id))
            } else if let Some(d) = debts.iter().find(|d| &d.name == name) {
                Ok(FundingSource::DebtDraw(d.debt_id))
            } else if let Some(p) = policies.iter().find(|p| &p.name == name) {
                Ok(FundingSource::PolicyLoan(p.policy_id))
            } else {
                Err(ConfigError::UnknownPrioritySource {
                    person: person.to_string(),
                    name: name.clone(),
                })
            }
        })
        .collect()
}

fn find_person(persons: &[Person], name: &str) -> Result<PersonId, ConfigError> {
    persons
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.person_id)
        .ok_or_else(|| ConfigError::UnknownSpouse {
            person: name.to_string(),
            spouse: name.to_string(),
        })
}

fn link_spouses(persons: &mut [Person], a: PersonId, b: PersonId) {
    for person in persons.iter_mut() {
        if person.person_id == a {
            person.married_to = Some(b);
            person.filing_status = FilingStatus::MarriedFilingJointly;
        } else if person.person_id == b {
            person.married_to = Some(a);
            person.filing_status = FilingStatus::MarriedFilingJointly;
        }
    }
}
