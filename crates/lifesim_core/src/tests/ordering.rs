//! Phase ordering and conservation properties

use crate::config::{AccountBuilder, JobBuilder, PersonBuilder, ScenarioBuilder};
use crate::simulation::simulate;
use crate::tests::{flat_tax, zero_tax};

#[test]
fn test_growth_applies_before_withdrawal() {
    // 1000 at 10% with a same-year 500 withdrawal ends at 1000*1.10 - 500,
    // not (1000-500)*1.10
    let config = ScenarioBuilder::new()
        .start_year(2025)
        .years(1)
        .tax_config(zero_tax())
        .person(
            PersonBuilder::new("Avery", 40)
                .account(AccountBuilder::bank("Checking").balance(1_000.0).growth(0.10))
                .spending(500.0, 0.0),
        )
        .build()
        .unwrap();

    let result = simulate(&config, 0).unwrap();
    let stats = &result.yearly[0].persons[0];
    assert!(
        (stats.bank_balance - 600.0).abs() < 0.01,
        "expected 600, got {}",
        stats.bank_balance
    );
}

#[test]
fn test_income_posts_before_growth() {
    // Wages land in the bank before growth, so they compound in the same year
    let config = ScenarioBuilder::new()
        .start_year(2025)
        .years(1)
        .tax_config(zero_tax())
        .person(
            PersonBuilder::new("Avery", 40)
                .account(AccountBuilder::bank("Checking").balance(10_000.0).growth(0.05))
                .job(JobBuilder::new("Engineer").salary(50_000.0)),
        )
        .build()
        .unwrap();

    let result = simulate(&config, 0).unwrap();
    let stats = &result.yearly[0].persons[0];
    assert!(
        (stats.bank_balance - 63_000.0).abs() < 0.01,
        "expected (10000+50000)*1.05 = 63000, got {}",
        stats.bank_balance
    );
}

#[test]
fn test_conservation_of_liquid_balance() {
    // ending = (start + income) * (1 + growth) - spending - taxes
    let config = ScenarioBuilder::new()
        .start_year(2025)
        .years(1)
        .tax_config(flat_tax(0.10))
        .person(
            PersonBuilder::new("Avery", 40)
                .account(AccountBuilder::bank("Checking").balance(10_000.0).growth(0.05))
                .job(JobBuilder::new("Engineer").salary(50_000.0))
                .spending(30_000.0, 0.0),
        )
        .build()
        .unwrap();

    let result = simulate(&config, 0).unwrap();
    let stats = &result.yearly[0].persons[0];

    assert!((stats.gross_income - 50_000.0).abs() < 0.01);
    assert!((stats.spending - 30_000.0).abs() < 0.01);
    assert!((stats.taxes.total() - 5_000.0).abs() < 0.01);

    let expected = (10_000.0 + 50_000.0) * 1.05 - stats.spending - stats.taxes.total();
    assert!(
        (stats.bank_balance - expected).abs() < 0.01,
        "expected {expected}, got {}",
        stats.bank_balance
    );
}

#[test]
fn test_shared_expenses_split_equally() {
    let config = ScenarioBuilder::new()
        .start_year(2025)
        .years(1)
        .tax_config(zero_tax())
        .shared_expenses(4_000.0, 0.0)
        .person(
            PersonBuilder::new("Avery", 40)
                .account(AccountBuilder::bank("Checking A").balance(10_000.0)),
        )
        .person(
            PersonBuilder::new("Blair", 38)
                .account(AccountBuilder::bank("Checking B").balance(10_000.0)),
        )
        .build()
        .unwrap();

    let result = simulate(&config, 0).unwrap();
    let year = &result.yearly[0];
    for stats in &year.persons {
        assert!((stats.spending - 2_000.0).abs() < 0.01);
        assert!((stats.bank_balance - 8_000.0).abs() < 0.01);
    }
    assert!((year.total_spending() - 4_000.0).abs() < 0.01);
}

#[test]
fn test_spending_drifts_each_year() {
    // 2% yearly increase applies from the second year on
    let config = ScenarioBuilder::new()
        .start_year(2025)
        .years(2)
        .tax_config(zero_tax())
        .person(
            PersonBuilder::new("Avery", 40)
                .account(AccountBuilder::bank("Checking").balance(100_000.0))
                .spending(10_000.0, 0.02),
        )
        .build()
        .unwrap();

    let result = simulate(&config, 0).unwrap();
    assert!((result.yearly[0].persons[0].spending - 10_000.0).abs() < 0.01);
    assert!((result.yearly[1].persons[0].spending - 10_200.0).abs() < 0.01);
}

#[test]
fn test_jobs_stop_paying_at_retirement() {
    let config = ScenarioBuilder::new()
        .start_year(2025)
        .years(3)
        .tax_config(zero_tax())
        .person(
            PersonBuilder::new("Avery", 63)
                .retirement_age(65.0)
                .account(AccountBuilder::bank("Checking"))
                .job(JobBuilder::new("Engineer").salary(80_000.0)),
        )
        .build()
        .unwrap();

    let result = simulate(&config, 0).unwrap();
    // Ages 64 at the end of year one, retires entering the year they turn 65
    assert!((result.yearly[0].persons[0].gross_income - 80_000.0).abs() < 0.01);
    assert_eq!(result.yearly[1].persons[0].gross_income, 0.0);
    assert_eq!(result.yearly[2].persons[0].gross_income, 0.0);
}
