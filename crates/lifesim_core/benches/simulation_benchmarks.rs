//! Criterion benchmarks for lifesim_core simulation
//!
//! Run with: cargo bench -p lifesim_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lifesim_core::config::{
    AccountBuilder, JobBuilder, PersonBuilder, ScenarioBuilder, ScenarioConfig,
};
use lifesim_core::simulation::{batch_simulate, simulate};

fn household_scenario(years: usize) -> ScenarioConfig {
    ScenarioBuilder::new()
        .start_year(2025)
        .years(years)
        .shared_expenses(12_000.0, 0.02)
        .person(
            PersonBuilder::new("Avery", 40)
                .retirement_age(65.0)
                .account(AccountBuilder::bank("Checking").balance(25_000.0).growth(0.01))
                .account(
                    AccountBuilder::brokerage("Brokerage")
                        .balance(100_000.0)
                        .cost_basis(70_000.0)
                        .growth_normal(0.07, 0.15),
                )
                .account(AccountBuilder::pretax_401k("401k").balance(200_000.0).growth(0.06))
                .job(
                    JobBuilder::new("Engineer")
                        .salary(130_000.0)
                        .raises(0.03)
                        .retirement("401k", 0.10, 0.0, 0.5),
                )
                .priority(["Checking", "Brokerage", "401k"])
                .spending(50_000.0, 0.02)
                .social_security(67, 28_000.0),
        )
        .person(
            PersonBuilder::new("Blair", 38)
                .account(AccountBuilder::bank("Savings").balance(20_000.0).growth(0.02))
                .account(AccountBuilder::roth_ira("Roth").balance(40_000.0).growth(0.06))
                .job(JobBuilder::new("Designer").salary(95_000.0).raises(0.02))
                .spending(35_000.0, 0.02),
        )
        .married("Avery", "Blair")
        .build()
        .expect("bench scenario is valid")
}

fn bench_single_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    for years in [10, 30, 60] {
        let config = household_scenario(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &config, |b, config| {
            b.iter(|| simulate(black_box(config), 42));
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let config = household_scenario(30);
    c.bench_function("batch_simulate_100", |b| {
        b.iter(|| batch_simulate(black_box(&config), 100));
    });
}

criterion_group!(benches, bench_single_run, bench_batch);
criterion_main!(benches);
