//! Account definitions
//!
//! Accounts are balance-holding instruments owned by exactly one person.
//! The kinds form a small closed set behind one capability surface
//! (capacity, withdraw, growth); new instrument kinds are added as new
//! variants, not new types.

use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use super::ids::AccountId;

/// Annual growth model for an account balance
///
/// `Normal` draws one rate per account-year from a seeded generator, so a
/// run is fully determined by `(config, seed)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GrowthProfile {
    Fixed(f64),
    Normal { mean: f64, std_dev: f64 },
}

impl GrowthProfile {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            GrowthProfile::Fixed(rate) => rate,
            GrowthProfile::Normal { mean, std_dev } => {
                match rand_distr::Normal::new(mean, std_dev) {
                    Ok(dist) => dist.sample(rng),
                    Err(_) => mean,
                }
            }
        }
    }
}

impl Default for GrowthProfile {
    fn default() -> Self {
        GrowthProfile::Fixed(0.0)
    }
}

/// Tax treatment and kind-specific state of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccountKind {
    /// Checking / savings; the only fully liquid kind
    Bank,
    /// 401k / traditional IRA; contributions deductible, withdrawals taxed
    /// as ordinary income, subject to required distributions
    PreTaxRetirement { contribution_limit: Option<f64> },
    /// Roth; contributions post-tax, withdrawals untaxed (penalty if early)
    RothRetirement { contribution_limit: Option<f64> },
    /// HSA; deductible contributions, non-medical withdrawals taxed + penalty
    HealthSavings { contribution_limit: Option<f64> },
    /// Taxable brokerage; withdrawals realize proportional gains
    Brokerage { cost_basis: f64 },
}

/// Result of withdrawing from an account
#[derive(Debug, Clone, Copy, Default)]
pub struct Withdrawal {
    /// Amount actually withdrawn, never more than the balance
    pub amount: f64,
    /// Realized gain, non-zero only for brokerage accounts
    pub realized_gain: f64,
}

/// A balance-holding instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub growth: GrowthProfile,
}

impl Account {
    pub fn is_liquid(&self) -> bool {
        matches!(self.kind, AccountKind::Bank)
    }

    pub fn contribution_limit(&self) -> Option<f64> {
        match self.kind {
            AccountKind::PreTaxRetirement { contribution_limit }
            | AccountKind::RothRetirement { contribution_limit }
            | AccountKind::HealthSavings { contribution_limit } => contribution_limit,
            AccountKind::Bank | AccountKind::Brokerage { .. } => None,
        }
    }

    /// Whether contributions to this account reduce ordinary income
    pub fn is_pretax(&self) -> bool {
        matches!(
            self.kind,
            AccountKind::PreTaxRetirement { .. } | AccountKind::HealthSavings { .. }
        )
    }

    /// Grow the balance by one year at the given rate
    ///
    /// Must run exactly once per year, strictly before any same-year
    /// withdrawal reads the balance. Cost basis is unchanged by growth.
    pub fn apply_growth(&mut self, rate: f64) {
        self.balance *= 1.0 + rate;
    }

    pub fn deposit(&mut self, amount: f64) {
        self.balance += amount;
        if let AccountKind::Brokerage { cost_basis } = &mut self.kind {
            *cost_basis += amount;
        }
    }

    /// Withdraw up to `amount`, capped at the balance
    ///
    /// Brokerage withdrawals realize a proportional share of the unrealized
    /// gain and reduce the cost basis pro-rata.
    pub fn withdraw(&mut self, amount: f64) -> Withdrawal {
        let taken = amount.min(self.balance).max(0.0);
        if taken <= 0.0 {
            return Withdrawal::default();
        }

        let realized_gain = if let AccountKind::Brokerage { cost_basis } = &mut self.kind {
            let fraction = taken / self.balance;
            let basis_consumed = *cost_basis * fraction;
            *cost_basis -= basis_consumed;
            (taken - basis_consumed).max(0.0)
        } else {
            0.0
        };

        self.balance -= taken;
        Withdrawal {
            amount: taken,
            realized_gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brokerage(balance: f64, cost_basis: f64) -> Account {
        Account {
            account_id: AccountId(1),
            name: "Brokerage".to_string(),
            kind: AccountKind::Brokerage { cost_basis },
            balance,
            growth: GrowthProfile::Fixed(0.0),
        }
    }

    #[test]
    fn test_withdraw_caps_at_balance() {
        let mut account = Account {
            account_id: AccountId(1),
            name: "Checking".to_string(),
            kind: AccountKind::Bank,
            balance: 50.0,
            growth: GrowthProfile::Fixed(0.0),
        };
        let taken = account.withdraw(80.0);
        assert!((taken.amount - 50.0).abs() < 1e-9);
        assert_eq!(account.balance, 0.0);
    }

    #[test]
    fn test_brokerage_withdrawal_realizes_proportional_gain() {
        // 10k balance, 6k basis: withdrawing half realizes half the gain
        let mut account = brokerage(10_000.0, 6_000.0);
        let taken = account.withdraw(5_000.0);
        assert!((taken.realized_gain - 2_000.0).abs() < 0.01);
        match account.kind {
            AccountKind::Brokerage { cost_basis } => {
                assert!((cost_basis - 3_000.0).abs() < 0.01)
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_brokerage_deposit_raises_basis() {
        let mut account = brokerage(10_000.0, 6_000.0);
        account.deposit(1_000.0);
        assert!((account.balance - 11_000.0).abs() < 0.01);
        match account.kind {
            AccountKind::Brokerage { cost_basis } => {
                assert!((cost_basis - 7_000.0).abs() < 0.01)
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_growth_leaves_basis_unchanged() {
        let mut account = brokerage(10_000.0, 6_000.0);
        account.apply_growth(0.10);
        assert!((account.balance - 11_000.0).abs() < 0.01);
        match account.kind {
            AccountKind::Brokerage { cost_basis } => {
                assert!((cost_basis - 6_000.0).abs() < 0.01)
            }
            _ => unreachable!(),
        }
    }
}
