//! Tax engine
//!
//! Pure functions over the year's taxable event sequence and a bracket-table
//! configuration. The engine never mutates the configuration it is given and
//! carries no state of its own, so it stays tax-regime-agnostic.

use crate::context::TaxableEvent;
use crate::model::{FilingStatus, PayrollTaxConfig, TaxBracket, TaxConfig, TaxObligation};

/// Progressive tax over ascending brackets, processed low to high
pub fn progressive_tax(income: f64, brackets: &[TaxBracket]) -> f64 {
    if income <= 0.0 || brackets.is_empty() {
        return 0.0;
    }

    let mut tax = 0.0;
    for (i, bracket) in brackets.iter().enumerate() {
        if income <= bracket.threshold {
            break;
        }
        let ceiling = brackets
            .get(i + 1)
            .map(|b| b.threshold)
            .unwrap_or(f64::INFINITY);
        let taxable_in_bracket = income.min(ceiling) - bracket.threshold;
        tax += taxable_in_bracket * bracket.rate;
    }

    tax
}

/// Payroll tax on gross wages: capped flat component plus an uncapped
/// component with a surtax above the filing-status threshold
pub fn payroll_tax(wages: f64, status: FilingStatus, config: &PayrollTaxConfig) -> f64 {
    if wages <= 0.0 {
        return 0.0;
    }

    let capped_base = wages.min(config.social_security_wage_base);
    let mut tax = capped_base * config.social_security_rate;

    tax += wages * config.medicare_rate;
    let threshold = config.additional_threshold(status);
    if wages > threshold {
        tax += (wages - threshold) * config.additional_medicare_rate;
    }

    tax
}

/// Income aggregated from one year's event sequence
#[derive(Debug, Clone, Copy, Default)]
struct IncomeGroups {
    wages: f64,
    ordinary: f64,
    gains: f64,
    penalty_base: f64,
}

fn group_events<'a>(events: impl Iterator<Item = &'a TaxableEvent>) -> IncomeGroups {
    let mut groups = IncomeGroups::default();
    for event in events {
        match *event {
            TaxableEvent::Wages { gross } => {
                groups.wages += gross;
                groups.ordinary += gross;
            }
            TaxableEvent::PreTaxContribution { amount } => {
                groups.ordinary -= amount;
            }
            TaxableEvent::PreTaxDistribution { amount, early } => {
                groups.ordinary += amount;
                if early {
                    groups.penalty_base += amount;
                }
            }
            TaxableEvent::RothDistribution { amount, early } => {
                if early {
                    groups.penalty_base += amount;
                }
            }
            TaxableEvent::RealizedGain { gain } => {
                groups.gains += gain.max(0.0);
            }
            TaxableEvent::SocialSecurityBenefit { taxable } => {
                groups.ordinary += taxable;
            }
        }
    }
    groups
}

/// Compute the year's obligations from the full event sequence
///
/// Ordinary income passes through the progressive brackets after the
/// standard deduction; realized gains take the flat preferential rate;
/// payroll tax is assessed on gross wages only; the penalty surcharge is a
/// separate obligation, never compounded into the income brackets.
pub fn compute_obligations<'a>(
    events: impl Iterator<Item = &'a TaxableEvent>,
    status: FilingStatus,
    config: &TaxConfig,
) -> TaxObligation {
    let groups = group_events(events);

    let adjusted = (groups.ordinary.max(0.0) - config.standard_deduction(status)).max(0.0);
    let federal_income_tax =
        progressive_tax(adjusted, config.brackets(status)) + groups.gains * config.capital_gains_rate;
    let state_tax = (adjusted + groups.gains) * config.state_rate;
    let payroll = payroll_tax(groups.wages, status, &config.payroll);
    let penalty_tax = groups.penalty_base * config.early_withdrawal_penalty_rate;

    TaxObligation {
        federal_income_tax,
        state_tax,
        payroll_tax: payroll,
        penalty_tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TaxConfig {
        TaxConfig {
            brackets_single: vec![
                TaxBracket {
                    threshold: 0.0,
                    rate: 0.10,
                },
                TaxBracket {
                    threshold: 10_000.0,
                    rate: 0.12,
                },
                TaxBracket {
                    threshold: 40_000.0,
                    rate: 0.22,
                },
                TaxBracket {
                    threshold: 90_000.0,
                    rate: 0.24,
                },
            ],
            brackets_married: vec![
                TaxBracket {
                    threshold: 0.0,
                    rate: 0.10,
                },
                TaxBracket {
                    threshold: 20_000.0,
                    rate: 0.12,
                },
            ],
            standard_deduction_single: 0.0,
            standard_deduction_married: 0.0,
            state_rate: 0.05,
            capital_gains_rate: 0.15,
            early_withdrawal_penalty_rate: 0.10,
            early_withdrawal_age: 59.5,
            payroll: PayrollTaxConfig {
                social_security_rate: 0.062,
                social_security_wage_base: 100_000.0,
                medicare_rate: 0.0145,
                additional_medicare_rate: 0.009,
                additional_threshold_single: 200_000.0,
                additional_threshold_married: 250_000.0,
            },
        }
    }

    #[test]
    fn test_progressive_first_bracket() {
        let config = test_config();
        let tax = progressive_tax(5_000.0, &config.brackets_single);
        assert!((tax - 500.0).abs() < 0.01, "expected 500, got {tax}");
    }

    #[test]
    fn test_progressive_multiple_brackets() {
        let config = test_config();
        // $50,000: 10k at 10% + 30k at 12% + 10k at 22% = 6,800
        let tax = progressive_tax(50_000.0, &config.brackets_single);
        assert!((tax - 6_800.0).abs() < 0.01, "expected 6800, got {tax}");
    }

    #[test]
    fn test_progressive_never_reordered() {
        let config = test_config();
        // Effective rate is non-decreasing in income
        let mut last_effective = 0.0;
        for income in (10_000..200_000).step_by(10_000) {
            let income = income as f64;
            let effective = progressive_tax(income, &config.brackets_single) / income;
            assert!(effective + 1e-12 >= last_effective);
            last_effective = effective;
        }
    }

    #[test]
    fn test_payroll_wage_base_cap() {
        let config = test_config();
        // Above the wage base the capped component stops growing
        let at_cap = payroll_tax(100_000.0, FilingStatus::Single, &config.payroll);
        let above_cap = payroll_tax(150_000.0, FilingStatus::Single, &config.payroll);
        let capped_delta = above_cap - at_cap;
        // Only the uncapped 1.45% applies to the extra 50k
        assert!((capped_delta - 50_000.0 * 0.0145).abs() < 0.01);
    }

    #[test]
    fn test_payroll_surtax_above_threshold() {
        let config = test_config();
        let tax = payroll_tax(250_000.0, FilingStatus::Single, &config.payroll);
        let expected =
            100_000.0 * 0.062 + 250_000.0 * 0.0145 + 50_000.0 * 0.009;
        assert!((tax - expected).abs() < 0.01, "expected {expected}, got {tax}");
    }

    #[test]
    fn test_obligations_groups_events() {
        let config = test_config();
        let events = vec![
            TaxableEvent::Wages { gross: 50_000.0 },
            TaxableEvent::PreTaxContribution { amount: 10_000.0 },
            TaxableEvent::RealizedGain { gain: 4_000.0 },
        ];
        let ob = compute_obligations(events.iter(), FilingStatus::Single, &config);
        // Ordinary: 50k - 10k = 40k through brackets = 10k*10% + 30k*12% = 4,600
        assert!((ob.federal_income_tax - (4_600.0 + 4_000.0 * 0.15)).abs() < 0.01);
        // State on 44k at 5%
        assert!((ob.state_tax - 44_000.0 * 0.05).abs() < 0.01);
        // Payroll on gross wages, not on the reduced base
        assert!((ob.payroll_tax - (50_000.0 * 0.062 + 50_000.0 * 0.0145)).abs() < 0.01);
        assert_eq!(ob.penalty_tax, 0.0);
    }

    #[test]
    fn test_penalty_kept_outside_brackets() {
        let config = test_config();
        let events = vec![TaxableEvent::PreTaxDistribution {
            amount: 10_000.0,
            early: true,
        }];
        let ob = compute_obligations(events.iter(), FilingStatus::Single, &config);
        // Income tax on the distribution itself
        assert!((ob.federal_income_tax - 1_000.0).abs() < 0.01);
        // Penalty is a separate flat obligation, not folded into the brackets
        assert!((ob.penalty_tax - 1_000.0).abs() < 0.01);
    }

    #[test]
    fn test_roth_distribution_taxed_only_when_early() {
        let config = test_config();
        let early = vec![TaxableEvent::RothDistribution {
            amount: 5_000.0,
            early: true,
        }];
        let ob = compute_obligations(early.iter(), FilingStatus::Single, &config);
        assert_eq!(ob.federal_income_tax, 0.0);
        assert!((ob.penalty_tax - 500.0).abs() < 0.01);

        let qualified = vec![TaxableEvent::RothDistribution {
            amount: 5_000.0,
            early: false,
        }];
        let ob = compute_obligations(qualified.iter(), FilingStatus::Single, &config);
        assert_eq!(ob.total(), 0.0);
    }

    #[test]
    fn test_filing_status_selects_table() {
        let config = test_config();
        let events = vec![TaxableEvent::PreTaxDistribution {
            amount: 30_000.0,
            early: false,
        }];
        let single = compute_obligations(events.iter(), FilingStatus::Single, &config);
        let married =
            compute_obligations(events.iter(), FilingStatus::MarriedFilingJointly, &config);
        // Married table keeps more of the 30k in the 10% bracket
        assert!(married.federal_income_tax < single.federal_income_tax);
    }
}
