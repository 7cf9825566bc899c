//! Annual simulation step engine
//!
//! Drives one discrete year at a time across the whole family, in a fixed
//! forward-only phase order:
//!
//! 1. Income - jobs post wage events, claimed benefits post
//! 2. Growth - every account, debt and policy advances one period
//! 3. Mandatory distributions - required withdrawals from pre-tax accounts
//! 4. Contributions - plan and standing contributions, bounded by limits
//! 5. Spending & debt service - bills generated and resolved (queued
//!    external actions drain first, as ordinary bills)
//! 6. Taxation - one obligation per filing unit, itself settled as a bill
//! 7. Snapshot - statistics appended, counters rolled into the next year
//!
//! Persons are processed in family insertion order in every phase, so runs
//! with identical inputs reproduce identically.

use rand::rngs::SmallRng;

use crate::actions::{Action, QueuedAction, apply_action, outcome_event};
use crate::config::{ScenarioConfig, ShortfallPolicy};
use crate::context::{TaxableEvent, YearContext};
use crate::error::{ConfigError, SimulationError, StatutoryViolation};
use crate::model::{
    AccountId, Bill, BillCategory, Family, FamilyYearStats, FilingStatus, FundingPlan,
    LedgerEntry, Person, PersonId, PersonYearStats, SimulationResult, StateEvent, TaxConfig,
};
use crate::payment::{requires_distribution, resolve_bill, resolve_required_distribution};
use crate::simulation_state::{SimHistory, SimulationState};
use crate::taxes::compute_obligations;

/// Shortfalls below this are float dust, not missed payments
const SHORTFALL_EPSILON: f64 = 0.005;

/// Step-wise simulation driver
///
/// External consumers (dashboards, RL environments) get read-only access to
/// snapshots and the ledger between steps, and may queue actions for the
/// next year; mutable instrument handles are never exposed.
#[derive(Debug)]
pub struct Engine {
    config: ScenarioConfig,
    state: SimulationState,
    pending_actions: Vec<QueuedAction>,
}

impl Engine {
    pub fn new(config: &ScenarioConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Engine {
            state: SimulationState::from_config(config, seed),
            config: config.clone(),
            pending_actions: Vec::new(),
        })
    }

    pub fn current_year(&self) -> i16 {
        self.state.timeline.current_year
    }

    pub fn is_complete(&self) -> bool {
        self.state.timeline.is_complete()
    }

    /// Snapshots of all completed years, oldest first
    pub fn statistics(&self) -> &[FamilyYearStats] {
        &self.state.history.yearly
    }

    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.state.history.ledger
    }

    /// Queue a discretionary action for the next simulated year
    pub fn queue_action(&mut self, person: PersonId, action: Action) {
        self.pending_actions.push(QueuedAction { person, action });
    }

    /// Run one full year through all seven phases
    pub fn step_year(&mut self) -> Result<&FamilyYearStats, SimulationError> {
        let year = self.state.timeline.current_year;
        let carryover = std::mem::take(&mut self.state.carryover);
        let family = &mut self.state.family;
        let history = &mut self.state.history;
        let mut ctx = YearContext::new(year, family.persons.len(), carryover);

        advance_ages(family);
        phase_income(family, &mut ctx, history, year)?;
        phase_growth(family, history, &mut self.state.rng, year);
        phase_required_distributions(family, &mut ctx, history, &self.config, year)?;
        phase_contributions(family, &mut ctx, history, year)?;
        let actions = std::mem::take(&mut self.pending_actions);
        phase_spending(family, &mut ctx, history, &self.config, actions, year)?;
        let second_order = phase_taxes(family, &mut ctx, history, &self.config, year)?;
        self.state.carryover = second_order;
        let stats = phase_snapshot(family, ctx, year);

        history.yearly.push(stats);
        history.record(year, StateEvent::YearRollover {
            from_year: year,
            to_year: year + 1,
        });
        self.state.timeline.current_year += 1;

        let last = self.state.history.yearly.len() - 1;
        Ok(&self.state.history.yearly[last])
    }

    /// Run every remaining year
    pub fn run_to_end(&mut self) -> Result<(), SimulationError> {
        while !self.is_complete() {
            self.step_year()?;
        }
        Ok(())
    }

    pub fn into_result(self) -> SimulationResult {
        self.state.into_result()
    }
}

/// Run a full scenario to completion
pub fn simulate(config: &ScenarioConfig, seed: u64) -> Result<SimulationResult, SimulationError> {
    let mut engine = Engine::new(config, seed)?;
    engine.run_to_end()?;
    Ok(engine.into_result())
}

/// Run many independent seeded scenarios in parallel
///
/// Each run owns an isolated state graph; nothing is shared between runs.
#[cfg(feature = "parallel")]
pub fn batch_simulate(
    config: &ScenarioConfig,
    runs: usize,
) -> Result<Vec<SimulationResult>, SimulationError> {
    use rayon::iter::{IntoParallelIterator, ParallelIterator};

    config.validate().map_err(SimulationError::Config)?;
    (0..runs as u64)
        .into_par_iter()
        .map(|seed| simulate(config, seed))
        .collect()
}

#[cfg(not(feature = "parallel"))]
pub fn batch_simulate(
    config: &ScenarioConfig,
    runs: usize,
) -> Result<Vec<SimulationResult>, SimulationError> {
    config.validate().map_err(SimulationError::Config)?;
    (0..runs as u64).map(|seed| simulate(config, seed)).collect()
}

// ============================================================================
// Phases
// ============================================================================

fn advance_ages(family: &mut Family) {
    for person in &mut family.persons {
        person.age = person.age.saturating_add(1);
        if !person.retired && person.is_retired() {
            person.retired = true;
            for job in &mut person.jobs {
                job.retire();
            }
        }
    }
}

fn phase_income(
    family: &mut Family,
    ctx: &mut YearContext,
    history: &mut SimHistory,
    year: i16,
) -> Result<(), SimulationError> {
    for (idx, person) in family.persons.iter_mut().enumerate() {
        let person_id = person.person_id;
        let bank = person.first_bank_account_id()?;

        for job_idx in 0..person.jobs.len() {
            if !person.jobs[job_idx].active {
                continue;
            }
            let gross = person.jobs[job_idx].salary.gross();
            if gross <= 0.0 {
                continue;
            }
            person.account_mut(bank)?.deposit(gross);
            ctx.record(person_id, TaxableEvent::Wages { gross });
            ctx.accum_mut(idx).gross_income += gross;
            history.record(year, StateEvent::WagePosted {
                person: person_id,
                to: bank,
                gross,
            });
        }

        if let Some(ss) = person.social_security
            && person.age >= ss.claiming_age
            && ss.annual_benefit > 0.0
        {
            person.account_mut(bank)?.deposit(ss.annual_benefit);
            ctx.record(person_id, TaxableEvent::SocialSecurityBenefit {
                taxable: ss.annual_benefit * ss.taxable_portion,
            });
            ctx.accum_mut(idx).gross_income += ss.annual_benefit;
            history.record(year, StateEvent::BenefitPosted {
                person: person_id,
                to: bank,
                amount: ss.annual_benefit,
            });
        }
    }
    Ok(())
}

fn phase_growth(family: &mut Family, history: &mut SimHistory, rng: &mut SmallRng, year: i16) {
    for person in &mut family.persons {
        for account in &mut person.accounts {
            let rate = account.growth.sample(rng);
            let previous = account.balance;
            account.apply_growth(rate);
            if (account.balance - previous).abs() > 0.001 {
                history.record(year, StateEvent::GrowthApplied {
                    account: account.account_id,
                    previous,
                    new: account.balance,
                    rate,
                });
            }
        }

        for debt in &mut person.debts {
            if debt.principal <= 0.0 {
                continue;
            }
            let previous = debt.principal;
            let interest = debt.accrue_interest();
            if interest > 0.001 {
                history.record(year, StateEvent::InterestAccrued {
                    debt: debt.debt_id,
                    previous,
                    new: debt.principal,
                });
            }
        }

        for policy in &mut person.policies {
            let previous = policy.cash_value;
            policy.apply_growth();
            if (policy.cash_value - previous).abs() > 0.001 {
                history.record(year, StateEvent::CashValueGrowth {
                    policy: policy.policy_id,
                    previous,
                    new: policy.cash_value,
                });
            }
        }
    }
}

fn phase_required_distributions(
    family: &mut Family,
    ctx: &mut YearContext,
    history: &mut SimHistory,
    config: &ScenarioConfig,
    year: i16,
) -> Result<(), SimulationError> {
    let Some(threshold) = config.rmd_table.threshold_age() else {
        return Ok(());
    };

    for idx in 0..family.persons.len() {
        let person = &mut family.persons[idx];
        let person_id = person.person_id;
        let age = person.age;
        if age < threshold {
            continue;
        }

        let targets: Vec<(AccountId, f64)> = person
            .accounts
            .iter()
            .filter(|a| requires_distribution(a))
            .map(|a| (a.account_id, a.balance))
            .collect();

        for (account_id, balance) in targets {
            let required = config.rmd_table.required_distribution(age, balance);
            if required <= 0.0 {
                continue;
            }
            let actual = resolve_required_distribution(person, ctx, account_id, required)?;
            if (actual - required).abs() > 0.01 {
                return Err(StatutoryViolation::RequiredDistributionNotTaken {
                    account: account_id,
                    required,
                    withdrawn: actual,
                }
                .into());
            }
            ctx.accum_mut(idx).rmd_withdrawn += actual;
            history.record(year, StateEvent::RmdWithdrawal {
                person: person_id,
                account: account_id,
                age,
                balance,
                divisor: balance / required,
                required,
                actual,
            });
        }
    }
    Ok(())
}

fn phase_contributions(
    family: &mut Family,
    ctx: &mut YearContext,
    history: &mut SimHistory,
    year: i16,
) -> Result<(), SimulationError> {
    for idx in 0..family.persons.len() {
        let person = &mut family.persons[idx];
        let bank = person.first_bank_account_id()?;

        for job_idx in 0..person.jobs.len() {
            if !person.jobs[job_idx].active {
                continue;
            }
            let Some(plan) = person.jobs[job_idx].retirement_plan else {
                continue;
            };
            let base = person.jobs[job_idx].salary.base;
            let mut employee_total = 0.0;

            if let Some(target) = plan.pretax_account
                && plan.pretax_percent > 0.0
            {
                employee_total +=
                    contribute(person, ctx, idx, bank, target, base * plan.pretax_percent, history, year)?;
            }
            if let Some(target) = plan.roth_account
                && plan.roth_percent > 0.0
            {
                employee_total +=
                    contribute(person, ctx, idx, bank, target, base * plan.roth_percent, history, year)?;
            }

            // Employer match goes straight into the pre-tax account: it is
            // neither wage income nor counted against the employee limit
            if employee_total > 0.0
                && plan.employer_match_percent > 0.0
                && let Some(target) = plan.pretax_account
            {
                let amount = employee_total * plan.employer_match_percent;
                person.account_mut(target)?.deposit(amount);
                ctx.accum_mut(idx).employer_match += amount;
                history.record(year, StateEvent::EmployerMatch {
                    person: person.person_id,
                    to: target,
                    amount,
                });
            }
        }

        for planned in person.planned_contributions.clone() {
            contribute(person, ctx, idx, bank, planned.to, planned.amount, history, year)?;
        }
    }
    Ok(())
}

/// Move money from the bank into a limited account, capped by the remaining
/// yearly room and the available bank balance
#[allow(clippy::too_many_arguments)]
fn contribute(
    person: &mut Person,
    ctx: &mut YearContext,
    idx: usize,
    bank: AccountId,
    target: AccountId,
    requested: f64,
    history: &mut SimHistory,
    year: i16,
) -> Result<f64, SimulationError> {
    if requested <= 0.0 {
        return Ok(0.0);
    }
    let limit = person.account(target)?.contribution_limit();
    let room = ctx.contribution_room(target, limit);
    let available = person.account(bank)?.balance;
    let applied = requested.min(room).min(available).max(0.0);

    if applied > 0.0 {
        person.account_mut(bank)?.withdraw(applied);
        let account = person.account_mut(target)?;
        let pretax = account.is_pretax();
        account.deposit(applied);
        if limit.is_some() {
            ctx.record_contribution(target, applied);
        }
        if pretax {
            ctx.record(person.person_id, TaxableEvent::PreTaxContribution {
                amount: applied,
            });
        }
        ctx.accum_mut(idx).retirement_contributions += applied;
    }
    history.record(year, StateEvent::Contribution {
        person: person.person_id,
        to: target,
        requested,
        applied,
    });
    Ok(applied)
}

/// Resolve one bill for a person and apply the shortfall policy
#[allow(clippy::too_many_arguments)]
fn pay_bill(
    person: &mut Person,
    ctx: &mut YearContext,
    idx: usize,
    bill: Bill,
    history: &mut SimHistory,
    tax: &TaxConfig,
    policy: ShortfallPolicy,
    year: i16,
) -> Result<FundingPlan, SimulationError> {
    let priority = person.withdrawal_priority.clone();
    let plan = resolve_bill(person, ctx, &bill, &priority, tax)?;
    history.record(year, StateEvent::BillResolved {
        person: person.person_id,
        plan: plan.clone(),
    });

    if plan.shortfall > SHORTFALL_EPSILON {
        match policy {
            ShortfallPolicy::MarkInsolvent => {
                ctx.accum_mut(idx).insolvent = true;
                history.record(year, StateEvent::InsolvencyDeclared {
                    person: person.person_id,
                    category: bill.category,
                    shortfall: plan.shortfall,
                });
            }
            ShortfallPolicy::CarryDebt => {
                person.carried_debt += plan.shortfall;
                history.record(year, StateEvent::DebtCarried {
                    person: person.person_id,
                    category: bill.category,
                    amount: plan.shortfall,
                });
            }
        }
    }
    Ok(plan)
}

fn phase_spending(
    family: &mut Family,
    ctx: &mut YearContext,
    history: &mut SimHistory,
    config: &ScenarioConfig,
    actions: Vec<QueuedAction>,
    year: i16,
) -> Result<(), SimulationError> {
    let tax = &config.tax_config;
    let policy = config.shortfall_policy;

    // Externally queued decisions first, as ordinary bills and transfers
    for queued in actions {
        let Some(idx) = family
            .persons
            .iter()
            .position(|p| p.person_id == queued.person)
        else {
            history.record(year, StateEvent::ActionRejected {
                person: queued.person,
                reason: crate::model::ActionRejection::UnknownInstrument,
            });
            continue;
        };
        let outcome = apply_action(&mut family.persons[idx], ctx, queued.action, tax)?;
        history.record(year, outcome_event(queued.person, &outcome));
    }

    let share = family.shared_expense_share();

    for idx in 0..family.persons.len() {
        let person = &mut family.persons[idx];

        // Living expenses: personal spending plus the shared split
        let living = person.spending.yearly_spending() + share;
        if living > 0.0 {
            let bill = Bill::new(living, BillCategory::LivingExpense, year);
            let plan = pay_bill(person, ctx, idx, bill, history, tax, policy, year)?;
            ctx.accum_mut(idx).spending += plan.funded();
        }

        // Insurance premiums; an unpaid premium lapses the policy instead of
        // tripping the shortfall policy
        let premiums: Vec<_> = person
            .policies
            .iter()
            .filter(|p| p.active && p.annual_premium > 0.0)
            .map(|p| (p.policy_id, p.annual_premium))
            .collect();
        for (policy_id, premium) in premiums {
            let bill = Bill::new(premium, BillCategory::InsurancePremium, year);
            let priority = person.withdrawal_priority.clone();
            let plan = resolve_bill(person, ctx, &bill, &priority, tax)?;
            history.record(year, StateEvent::BillResolved {
                person: person.person_id,
                plan: plan.clone(),
            });
            if plan.shortfall > SHORTFALL_EPSILON {
                person.policy_mut(policy_id)?.lapse();
                history.record(year, StateEvent::PolicyLapsed {
                    person: person.person_id,
                    policy: policy_id,
                });
            }
            ctx.accum_mut(idx).spending += plan.funded();
        }

        // Minimum debt service
        let minimums: Vec<_> = person
            .debts
            .iter()
            .filter(|d| d.principal > 0.0)
            .map(|d| (d.debt_id, d.minimum_payment()))
            .collect();
        for (debt_id, minimum) in minimums {
            if minimum <= 0.0 {
                continue;
            }
            let bill = Bill::new(minimum, BillCategory::DebtService, year);
            let plan = pay_bill(person, ctx, idx, bill, history, tax, policy, year)?;
            let paid = person.debt_mut(debt_id)?.pay_down(plan.funded());
            ctx.accum_mut(idx).debt_service += paid;
        }

        // Try to clear unsecured carried debt; whatever stays unpaid simply
        // stays carried
        if person.carried_debt > SHORTFALL_EPSILON {
            let bill = Bill::new(person.carried_debt, BillCategory::DebtService, year);
            let priority = person.withdrawal_priority.clone();
            let plan = resolve_bill(person, ctx, &bill, &priority, tax)?;
            history.record(year, StateEvent::BillResolved {
                person: person.person_id,
                plan: plan.clone(),
            });
            person.carried_debt = (person.carried_debt - plan.funded()).max(0.0);
            ctx.accum_mut(idx).debt_service += plan.funded();
        }
    }
    Ok(())
}

/// One filing unit: a single person or a jointly-filing couple
struct FilingUnit {
    payer_idx: usize,
    spouse_idx: Option<usize>,
    status: FilingStatus,
    members: Vec<PersonId>,
}

fn filing_units(family: &Family) -> Vec<FilingUnit> {
    let mut processed = vec![false; family.persons.len()];
    let mut units = Vec::new();

    for idx in 0..family.persons.len() {
        if processed[idx] {
            continue;
        }
        processed[idx] = true;
        let person = &family.persons[idx];

        let spouse_idx = person.married_to.and_then(|spouse| {
            family
                .persons
                .iter()
                .position(|p| p.person_id == spouse)
                .filter(|&sidx| !processed[sidx])
        });

        if let Some(sidx) = spouse_idx {
            processed[sidx] = true;
            units.push(FilingUnit {
                payer_idx: idx,
                spouse_idx: Some(sidx),
                status: FilingStatus::MarriedFilingJointly,
                members: vec![person.person_id, family.persons[sidx].person_id],
            });
        } else {
            units.push(FilingUnit {
                payer_idx: idx,
                spouse_idx: None,
                status: person.filing_status,
                members: vec![person.person_id],
            });
        }
    }
    units
}

/// Compute and settle the year's taxes; returns the second-order taxable
/// events incurred while paying the tax bills, deferred to next year
fn phase_taxes(
    family: &mut Family,
    ctx: &mut YearContext,
    history: &mut SimHistory,
    config: &ScenarioConfig,
    year: i16,
) -> Result<Vec<(PersonId, TaxableEvent)>, SimulationError> {
    let tax = &config.tax_config;
    let policy = config.shortfall_policy;
    // Events recorded past this point are consequences of paying the tax
    // bills themselves; they settle next year
    let first_order = ctx.taxable.len();

    for unit in filing_units(family) {
        let obligation = compute_obligations(
            ctx.taxable[..first_order]
                .iter()
                .filter(|(p, _)| unit.members.contains(p))
                .map(|(_, e)| e),
            unit.status,
            tax,
        );
        if obligation.total() <= SHORTFALL_EPSILON {
            continue;
        }

        let payer_id = family.persons[unit.payer_idx].person_id;
        history.record(year, StateEvent::TaxAssessed {
            payer: payer_id,
            obligation,
        });
        ctx.accum_mut(unit.payer_idx).taxes.add(&obligation);

        let bill = Bill::new(obligation.total(), BillCategory::Tax, year);
        let plan = {
            let person = &mut family.persons[unit.payer_idx];
            let priority = person.withdrawal_priority.clone();
            let plan = resolve_bill(person, ctx, &bill, &priority, tax)?;
            history.record(year, StateEvent::BillResolved {
                person: payer_id,
                plan: plan.clone(),
            });
            plan
        };

        let mut shortfall = plan.shortfall;
        // A joint obligation falls back on the spouse's sources
        if shortfall > SHORTFALL_EPSILON
            && let Some(sidx) = unit.spouse_idx
        {
            let spouse = &mut family.persons[sidx];
            let remainder = Bill::new(shortfall, BillCategory::Tax, year);
            let priority = spouse.withdrawal_priority.clone();
            let spouse_plan = resolve_bill(spouse, ctx, &remainder, &priority, tax)?;
            history.record(year, StateEvent::BillResolved {
                person: spouse.person_id,
                plan: spouse_plan.clone(),
            });
            shortfall = spouse_plan.shortfall;
        }

        if shortfall > SHORTFALL_EPSILON {
            let person = &mut family.persons[unit.payer_idx];
            match policy {
                ShortfallPolicy::MarkInsolvent => {
                    ctx.accum_mut(unit.payer_idx).insolvent = true;
                    history.record(year, StateEvent::InsolvencyDeclared {
                        person: payer_id,
                        category: BillCategory::Tax,
                        shortfall,
                    });
                }
                ShortfallPolicy::CarryDebt => {
                    person.carried_debt += shortfall;
                    history.record(year, StateEvent::DebtCarried {
                        person: payer_id,
                        category: BillCategory::Tax,
                        amount: shortfall,
                    });
                }
            }
        }
    }

    Ok(ctx.taxable.split_off(first_order))
}

fn phase_snapshot(family: &mut Family, ctx: YearContext, year: i16) -> FamilyYearStats {
    let mut persons = Vec::with_capacity(family.persons.len());

    for (idx, person) in family.persons.iter_mut().enumerate() {
        let accum = &ctx.accums[idx];
        persons.push(PersonYearStats {
            person_id: person.person_id,
            age: person.age,
            gross_income: accum.gross_income,
            retirement_contributions: accum.retirement_contributions,
            employer_match: accum.employer_match,
            rmd_withdrawn: accum.rmd_withdrawn,
            spending: accum.spending,
            debt_service: accum.debt_service,
            taxes: accum.taxes,
            bank_balance: person.bank_balance(),
            pretax_balance: person.pretax_balance(),
            roth_balance: person.roth_balance(),
            hsa_balance: person.hsa_balance(),
            brokerage_balance: person.brokerage_balance(),
            policy_cash_value: person.policy_cash_value(),
            debt_balance: person.total_debt() - person.carried_debt,
            carried_debt: person.carried_debt,
            insolvent: accum.insolvent,
        });

        // Roll salaries and spending into next year
        for job in &mut person.jobs {
            job.salary.advance_year();
        }
        person.spending.advance_year();
    }
    family.shared_expenses.advance_year();

    FamilyYearStats { year, persons }
}
