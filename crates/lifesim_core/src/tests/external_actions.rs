//! The external action seam: queued decisions route through the ordinary
//! payment machinery

use crate::actions::Action;
use crate::config::{AccountBuilder, DebtBuilder, PersonBuilder, ScenarioBuilder};
use crate::model::{ActionRejection, FundingSource, PersonId, StateEvent};
use crate::simulation::Engine;
use crate::tests::zero_tax;

fn engine_with(person: PersonBuilder) -> Engine {
    let config = ScenarioBuilder::new()
        .start_year(2025)
        .years(5)
        .tax_config(zero_tax())
        .person(person)
        .build()
        .unwrap();
    Engine::new(&config, 0).unwrap()
}

#[test]
fn test_withdraw_action_lands_in_bank() {
    let mut engine = engine_with(
        PersonBuilder::new("Avery", 40)
            .account(AccountBuilder::bank("Checking").balance(0.0))
            .account(AccountBuilder::pretax_401k("401k").balance(30_000.0)),
    );

    assert!(engine.statistics().is_empty());

    // Account ids are assigned in declaration order
    engine.queue_action(
        PersonId(0),
        Action::Withdraw {
            source: FundingSource::Account(crate::model::AccountId(1)),
            amount: 5_000.0,
        },
    );
    let year = engine.step_year().unwrap();

    assert!((year.persons[0].bank_balance - 5_000.0).abs() < 0.01);
    assert!((year.persons[0].pretax_balance - 25_000.0).abs() < 0.01);
}

#[test]
fn test_transfer_over_limit_rejected_on_ledger() {
    let mut engine = engine_with(
        PersonBuilder::new("Avery", 40)
            .account(AccountBuilder::bank("Checking").balance(50_000.0))
            .account(AccountBuilder::pretax_401k("401k")),
    );

    engine.queue_action(
        PersonId(0),
        Action::Transfer {
            from: crate::model::AccountId(0),
            to: crate::model::AccountId(1),
            amount: 25_000.0,
        },
    );
    let year = engine.step_year().unwrap();

    // Nothing moved, and the refusal is visible to the caller
    assert!((year.persons[0].bank_balance - 50_000.0).abs() < 0.01);
    assert_eq!(year.persons[0].pretax_balance, 0.0);
    let rejected = engine.ledger().iter().any(|e| {
        matches!(
            &e.event,
            StateEvent::ActionRejected {
                reason: ActionRejection::ContributionLimit,
                ..
            }
        )
    });
    assert!(rejected);
}

#[test]
fn test_extra_debt_payment_action() {
    let mut engine = engine_with(
        PersonBuilder::new("Avery", 40)
            .account(AccountBuilder::bank("Checking").balance(10_000.0))
            .debt(DebtBuilder::credit_card("Visa", 5_000.0).balance(2_000.0).rate(0.0)),
    );

    engine.queue_action(
        PersonId(0),
        Action::ExtraDebtPayment {
            debt: crate::model::DebtId(0),
            amount: 1_500.0,
        },
    );
    let year = engine.step_year().unwrap();

    // 1500 extra plus the minimum payment on the remaining 500
    let remaining: f64 = 2_000.0 - 1_500.0;
    let minimum = (remaining * 0.02).max(25.0);
    assert!((year.persons[0].debt_balance - (remaining - minimum)).abs() < 0.01);
}

#[test]
fn test_action_for_unknown_person_rejected() {
    let mut engine = engine_with(
        PersonBuilder::new("Avery", 40)
            .account(AccountBuilder::bank("Checking").balance(1_000.0)),
    );

    engine.queue_action(PersonId(42), Action::OneTimeExpense { amount: 100.0 });
    let year = engine.step_year().unwrap();

    // No effect on the real person
    assert!((year.persons[0].bank_balance - 1_000.0).abs() < 0.01);
    let rejected = engine
        .ledger()
        .iter()
        .any(|e| matches!(&e.event, StateEvent::ActionRejected { person, .. } if *person == PersonId(42)));
    assert!(rejected);
}

#[test]
fn test_spending_adjustment_persists() {
    let mut engine = engine_with(
        PersonBuilder::new("Avery", 40)
            .account(AccountBuilder::bank("Checking").balance(100_000.0))
            .spending(10_000.0, 0.0),
    );

    engine.queue_action(PersonId(0), Action::AdjustSpending { delta: -4_000.0 });
    let year1 = engine.step_year().unwrap();
    assert!((year1.persons[0].spending - 6_000.0).abs() < 0.01);

    // The adjustment sticks in later years without being re-queued
    let year2 = engine.step_year().unwrap();
    assert!((year2.persons[0].spending - 6_000.0).abs() < 0.01);
}
