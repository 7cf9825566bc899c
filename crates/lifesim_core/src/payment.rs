//! Payment resolution service
//!
//! Satisfies a bill from possibly-insufficient funds spread across the
//! payer's configured funding sources, in priority order. Tax consequences
//! of a draw (early-distribution penalties, realized gains) are recorded as
//! taxable events in the year context and folded into the year's single tax
//! computation; they are never paid at draw time.
//!
//! Capacities are always read from live instrument state, so a bill
//! resolved later in the year sees the balances left by earlier bills.

use crate::context::{TaxableEvent, YearContext};
use crate::error::{LookupError, Result};
use crate::model::{
    Account, AccountId, AccountKind, Bill, FundingDraw, FundingPlan, FundingSource, Person,
    TaxConfig,
};

/// Remaining resolvable dust below which a bill counts as settled
const SETTLE_EPSILON: f64 = 0.001;

/// Capacity a source can supply right now, from live instrument state
pub fn source_capacity(person: &Person, source: FundingSource) -> Result<f64> {
    match source {
        FundingSource::Account(id) => Ok(person.account(id)?.balance),
        FundingSource::DebtDraw(id) => {
            let debt = person
                .debts
                .iter()
                .find(|d| d.debt_id == id)
                .ok_or(LookupError::DebtNotFound(id))?;
            Ok(debt.available_credit())
        }
        FundingSource::PolicyLoan(id) => {
            let policy = person
                .policies
                .iter()
                .find(|p| p.policy_id == id)
                .ok_or(LookupError::PolicyNotFound(id))?;
            Ok(policy.loan_capacity())
        }
    }
}

fn is_early(person: &Person, tax: &TaxConfig) -> bool {
    f64::from(person.age) < tax.early_withdrawal_age
}

/// Execute one draw against a source, recording its taxable side effects
///
/// `incurred_cost` on the returned draw is the estimate at flat statutory
/// rates; the authoritative tax lands in the year-end computation from the
/// recorded events.
fn draw_from_source(
    person: &mut Person,
    ctx: &mut YearContext,
    source: FundingSource,
    amount: f64,
    tax: &TaxConfig,
) -> Result<FundingDraw> {
    let person_id = person.person_id;
    let early = is_early(person, tax);

    let (taken, incurred_cost) = match source {
        FundingSource::Account(id) => {
            let account = person.account_mut(id)?;
            let kind = account.kind.clone();
            let withdrawal = account.withdraw(amount);
            let taken = withdrawal.amount;
            let cost = match kind {
                AccountKind::Bank => 0.0,
                AccountKind::PreTaxRetirement { .. } | AccountKind::HealthSavings { .. } => {
                    ctx.record(
                        person_id,
                        TaxableEvent::PreTaxDistribution {
                            amount: taken,
                            early,
                        },
                    );
                    if early {
                        taken * tax.early_withdrawal_penalty_rate
                    } else {
                        0.0
                    }
                }
                AccountKind::RothRetirement { .. } => {
                    ctx.record(
                        person_id,
                        TaxableEvent::RothDistribution {
                            amount: taken,
                            early,
                        },
                    );
                    if early {
                        taken * tax.early_withdrawal_penalty_rate
                    } else {
                        0.0
                    }
                }
                AccountKind::Brokerage { .. } => {
                    ctx.record(
                        person_id,
                        TaxableEvent::RealizedGain {
                            gain: withdrawal.realized_gain,
                        },
                    );
                    withdrawal.realized_gain * tax.capital_gains_rate
                }
            };
            (taken, cost)
        }
        FundingSource::DebtDraw(id) => {
            let taken = person.debt_mut(id)?.draw(amount);
            (taken, 0.0)
        }
        FundingSource::PolicyLoan(id) => {
            let taken = person.policy_mut(id)?.take_loan(amount);
            (taken, 0.0)
        }
    };

    Ok(FundingDraw {
        source,
        amount: taken,
        incurred_cost,
    })
}

/// Resolve a bill against a priority-ordered source list
///
/// Walks the sources in order, drawing `min(remaining, capacity)` from
/// each. Zero-capacity sources are skipped without error; a source is never
/// drawn past its capacity. The returned plan carries a `shortfall` for
/// whatever could not be funded; deciding what a shortfall means (insolvency
/// vs carried debt) is the caller's policy.
pub fn resolve_bill(
    person: &mut Person,
    ctx: &mut YearContext,
    bill: &Bill,
    priority: &[FundingSource],
    tax: &TaxConfig,
) -> Result<FundingPlan> {
    let mut remaining = bill.amount.max(0.0);
    let mut draws = Vec::new();

    for &source in priority {
        if remaining <= SETTLE_EPSILON {
            remaining = 0.0;
            break;
        }
        let capacity = source_capacity(person, source)?;
        if capacity <= 0.0 {
            continue;
        }
        let draw = draw_from_source(person, ctx, source, remaining.min(capacity), tax)?;
        remaining -= draw.amount;
        if draw.amount > 0.0 {
            draws.push(draw);
        }
    }

    Ok(FundingPlan {
        category: bill.category,
        requested: bill.amount,
        draws,
        shortfall: remaining.max(0.0),
    })
}

/// Satisfy a required distribution from exactly one pre-tax account
///
/// Unlike a bill, the proceeds are not spent: they move to the person's
/// first bank account. The distribution is never flagged early (the
/// requirement only exists well past the early-withdrawal age).
pub fn resolve_required_distribution(
    person: &mut Person,
    ctx: &mut YearContext,
    account_id: AccountId,
    required: f64,
) -> Result<f64> {
    let withdrawal = person.account_mut(account_id)?.withdraw(required);
    ctx.record(
        person.person_id,
        TaxableEvent::PreTaxDistribution {
            amount: withdrawal.amount,
            early: false,
        },
    );
    person.deposit_to_bank(withdrawal.amount)?;
    Ok(withdrawal.amount)
}

/// Whether this account kind is subject to required distributions
pub fn requires_distribution(account: &Account) -> bool {
    matches!(account.kind, AccountKind::PreTaxRetirement { .. })
}
