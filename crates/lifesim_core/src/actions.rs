//! External action interface
//!
//! An outside caller (typically an RL environment) may queue discretionary
//! actions for a person before a year runs. Queued actions drain at the top
//! of the spending phase and route through the payment resolution service
//! as ordinary bills and transfers; there is no privileged code path.

use serde::{Deserialize, Serialize};

use crate::context::{TaxableEvent, YearContext};
use crate::error::Result;
use crate::model::{
    AccountId, ActionRejection, Bill, BillCategory, DebtId, FundingSource, Person, PersonId,
    StateEvent, TaxConfig,
};
use crate::payment::{resolve_bill, source_capacity};

/// A discretionary decision applied to one person for one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Move money from the person's bank account into another account,
    /// subject to the target's remaining contribution limit
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: f64,
    },
    /// Draw from a funding source and deposit the proceeds into the bank
    Withdraw {
        source: FundingSource,
        amount: f64,
    },
    /// Pay extra principal on a debt, funded through the normal priority
    ExtraDebtPayment { debt: DebtId, amount: f64 },
    /// Permanently adjust base yearly spending by a delta
    AdjustSpending { delta: f64 },
    /// Add a one-time expense to this year's spending
    OneTimeExpense { amount: f64 },
}

/// An action waiting for the next simulated year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub person: PersonId,
    pub action: Action,
}

/// What happened when a queued action was applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionOutcome {
    Applied { amount: f64 },
    Rejected(ActionRejection),
}

/// Apply one queued action against its person
///
/// Contribution-type transfers that exceed the target's remaining yearly
/// limit are rejected rather than capped: silently reducing them would hide
/// a statutory violation from the caller.
pub fn apply_action(
    person: &mut Person,
    ctx: &mut YearContext,
    action: Action,
    tax: &TaxConfig,
) -> Result<ActionOutcome> {
    match action {
        Action::Transfer { from, to, amount } => {
            if amount <= 0.0 {
                return Ok(ActionOutcome::Rejected(ActionRejection::InvalidAmount));
            }
            if person.accounts.iter().all(|a| a.account_id != from)
                || person.accounts.iter().all(|a| a.account_id != to)
            {
                return Ok(ActionOutcome::Rejected(ActionRejection::UnknownInstrument));
            }
            if !person.account(from)?.is_liquid() {
                return Ok(ActionOutcome::Rejected(ActionRejection::NonBankTransferSource));
            }
            let target = person.account(to)?;
            let room = ctx.contribution_room(to, target.contribution_limit());
            if amount > room {
                return Ok(ActionOutcome::Rejected(ActionRejection::ContributionLimit));
            }

            let moved = person.account_mut(from)?.withdraw(amount).amount;
            let target = person.account_mut(to)?;
            let pretax = target.is_pretax();
            let limited = target.contribution_limit().is_some();
            target.deposit(moved);
            if limited {
                ctx.record_contribution(to, moved);
            }
            if pretax {
                ctx.record(
                    person.person_id,
                    TaxableEvent::PreTaxContribution { amount: moved },
                );
            }
            Ok(ActionOutcome::Applied { amount: moved })
        }
        Action::Withdraw { source, amount } => {
            if amount <= 0.0 {
                return Ok(ActionOutcome::Rejected(ActionRejection::InvalidAmount));
            }
            if source_capacity(person, source).is_err() {
                return Ok(ActionOutcome::Rejected(ActionRejection::UnknownInstrument));
            }
            // Route as an ordinary bill whose proceeds land in the bank
            let bill = Bill::new(amount, BillCategory::LivingExpense, ctx.year);
            let plan = resolve_bill(person, ctx, &bill, &[source], tax)?;
            let funded = plan.funded();
            person.deposit_to_bank(funded)?;
            Ok(ActionOutcome::Applied { amount: funded })
        }
        Action::ExtraDebtPayment { debt, amount } => {
            if amount <= 0.0 {
                return Ok(ActionOutcome::Rejected(ActionRejection::InvalidAmount));
            }
            if person.debts.iter().all(|d| d.debt_id != debt) {
                return Ok(ActionOutcome::Rejected(ActionRejection::UnknownInstrument));
            }
            let owed = person.debt_mut(debt)?.principal;
            let bill = Bill::new(amount.min(owed), BillCategory::DebtService, ctx.year);
            let priority = person.withdrawal_priority.clone();
            let plan = resolve_bill(person, ctx, &bill, &priority, tax)?;
            let paid = person.debt_mut(debt)?.pay_down(plan.funded());
            Ok(ActionOutcome::Applied { amount: paid })
        }
        Action::AdjustSpending { delta } => {
            person.spending.base = (person.spending.base + delta).max(0.0);
            Ok(ActionOutcome::Applied { amount: delta })
        }
        Action::OneTimeExpense { amount } => {
            if amount <= 0.0 {
                return Ok(ActionOutcome::Rejected(ActionRejection::InvalidAmount));
            }
            person.spending.add_expense(amount);
            Ok(ActionOutcome::Applied { amount })
        }
    }
}

/// Turn an outcome into its ledger event
pub fn outcome_event(person: PersonId, outcome: &ActionOutcome) -> StateEvent {
    match outcome {
        ActionOutcome::Applied { amount } => StateEvent::ActionApplied {
            person,
            amount: *amount,
        },
        ActionOutcome::Rejected(reason) => StateEvent::ActionRejected {
            person,
            reason: *reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, AccountKind, FilingStatus, GrowthProfile, Spending};

    fn person_with(accounts: Vec<Account>) -> Person {
        Person {
            person_id: PersonId(0),
            name: "Test".to_string(),
            age: 40,
            retirement_age: 65.0,
            filing_status: FilingStatus::Single,
            married_to: None,
            jobs: vec![],
            accounts,
            debts: vec![],
            policies: vec![],
            spending: Spending::new(0.0, 0.0),
            social_security: None,
            planned_contributions: vec![],
            withdrawal_priority: vec![FundingSource::Account(AccountId(1))],
            carried_debt: 0.0,
            retired: false,
        }
    }

    fn bank(id: u16, balance: f64) -> Account {
        Account {
            account_id: AccountId(id),
            name: "Checking".to_string(),
            kind: AccountKind::Bank,
            balance,
            growth: GrowthProfile::Fixed(0.0),
        }
    }

    fn limited_pretax(id: u16, balance: f64, limit: f64) -> Account {
        Account {
            account_id: AccountId(id),
            name: "401k".to_string(),
            kind: AccountKind::PreTaxRetirement {
                contribution_limit: Some(limit),
            },
            balance,
            growth: GrowthProfile::Fixed(0.0),
        }
    }

    #[test]
    fn test_transfer_over_limit_rejected() {
        let mut person = person_with(vec![bank(1, 50_000.0), limited_pretax(2, 0.0, 20_500.0)]);
        let mut ctx = YearContext::new(2025, 1, vec![]);
        let tax = TaxConfig::default();

        let outcome = apply_action(
            &mut person,
            &mut ctx,
            Action::Transfer {
                from: AccountId(1),
                to: AccountId(2),
                amount: 25_000.0,
            },
            &tax,
        )
        .unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Rejected(ActionRejection::ContributionLimit)
        );
        // Nothing moved
        assert!((person.account(AccountId(1)).unwrap().balance - 50_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_transfer_records_deduction_and_ytd() {
        let mut person = person_with(vec![bank(1, 50_000.0), limited_pretax(2, 0.0, 20_500.0)]);
        let mut ctx = YearContext::new(2025, 1, vec![]);
        let tax = TaxConfig::default();

        let outcome = apply_action(
            &mut person,
            &mut ctx,
            Action::Transfer {
                from: AccountId(1),
                to: AccountId(2),
                amount: 10_000.0,
            },
            &tax,
        )
        .unwrap();
        assert_eq!(outcome, ActionOutcome::Applied { amount: 10_000.0 });
        assert!((ctx.contributed_ytd(AccountId(2)) - 10_000.0).abs() < 1e-9);
        assert!(ctx.taxable.iter().any(|(_, e)| matches!(
            e,
            TaxableEvent::PreTaxContribution { .. }
        )));
    }

    #[test]
    fn test_withdraw_deposits_to_bank() {
        let mut person = person_with(vec![bank(1, 0.0), limited_pretax(2, 30_000.0, 20_500.0)]);
        let mut ctx = YearContext::new(2025, 1, vec![]);
        let tax = TaxConfig::default();

        let outcome = apply_action(
            &mut person,
            &mut ctx,
            Action::Withdraw {
                source: FundingSource::Account(AccountId(2)),
                amount: 5_000.0,
            },
            &tax,
        )
        .unwrap();
        assert_eq!(outcome, ActionOutcome::Applied { amount: 5_000.0 });
        assert!((person.bank_balance() - 5_000.0).abs() < 1e-9);
        // The draw recorded its early-distribution event like any other bill
        assert!(ctx.taxable.iter().any(|(_, e)| matches!(
            e,
            TaxableEvent::PreTaxDistribution { early: true, .. }
        )));
    }
}
