use std::fmt;

use crate::model::{AccountId, DebtId, PersonId, PolicyId};

/// Errors related to instrument lookups
///
/// These indicate an internal inconsistency (an id referencing an instrument
/// the owning person does not hold) and are surfaced as `Err`, never panics.
#[derive(Debug, Clone)]
pub enum LookupError {
    PersonNotFound(PersonId),
    AccountNotFound(AccountId),
    DebtNotFound(DebtId),
    PolicyNotFound(PolicyId),
    NoBankAccount(PersonId),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::PersonNotFound(id) => write!(f, "person {id:?} not found"),
            LookupError::AccountNotFound(id) => write!(f, "account {id:?} not found"),
            LookupError::DebtNotFound(id) => write!(f, "debt {id:?} not found"),
            LookupError::PolicyNotFound(id) => write!(f, "policy {id:?} not found"),
            LookupError::NoBankAccount(id) => {
                write!(f, "person {id:?} has no bank account to receive deposits")
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Fatal scenario-configuration defects, reported before any year executes
#[derive(Debug, Clone)]
pub enum ConfigError {
    NoPersons,
    NoBankAccount { person: String },
    NegativeAmount { what: &'static str, value: f64 },
    EmptyBracketTable,
    UnsortedBracketTable { index: usize },
    NonDecreasingRmdDivisors { age: u8 },
    UnknownPrioritySource { person: String, name: String },
    UnknownAccountName { person: String, name: String },
    CostBasisExceedsBalance { account: String },
    DuplicateName { name: String },
    UnknownSpouse { person: String, spouse: String },
    InvalidRate { what: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoPersons => write!(f, "scenario has no persons"),
            ConfigError::NoBankAccount { person } => {
                write!(f, "person '{person}' has no bank account")
            }
            ConfigError::NegativeAmount { what, value } => {
                write!(f, "{what} must be non-negative, got {value}")
            }
            ConfigError::EmptyBracketTable => write!(f, "tax bracket table is empty"),
            ConfigError::UnsortedBracketTable { index } => {
                write!(f, "tax bracket thresholds must be ascending (index {index})")
            }
            ConfigError::NonDecreasingRmdDivisors { age } => {
                write!(f, "RMD divisors must decrease with age (age {age})")
            }
            ConfigError::UnknownPrioritySource { person, name } => {
                write!(f, "withdrawal priority of '{person}' references unknown instrument '{name}'")
            }
            ConfigError::UnknownAccountName { person, name } => {
                write!(f, "person '{person}' references unknown account '{name}'")
            }
            ConfigError::CostBasisExceedsBalance { account } => {
                write!(f, "brokerage account '{account}' has cost basis above its balance")
            }
            ConfigError::DuplicateName { name } => {
                write!(f, "duplicate instrument name '{name}'")
            }
            ConfigError::UnknownSpouse { person, spouse } => {
                write!(f, "person '{person}' is married to unknown person '{spouse}'")
            }
            ConfigError::InvalidRate { what, value } => {
                write!(f, "{what} is not a valid rate: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statutory rules that must not be silently violated
///
/// These surface at the point the rule is checked; letting them pass would
/// corrupt the year's tax computation.
#[derive(Debug, Clone)]
pub enum StatutoryViolation {
    RequiredDistributionNotTaken {
        account: AccountId,
        required: f64,
        withdrawn: f64,
    },
    ContributionAboveLimit {
        account: AccountId,
        requested: f64,
        room: f64,
    },
}

impl fmt::Display for StatutoryViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatutoryViolation::RequiredDistributionNotTaken {
                account,
                required,
                withdrawn,
            } => {
                write!(
                    f,
                    "required distribution from {account:?} not satisfied: required {required:.2}, withdrawn {withdrawn:.2}"
                )
            }
            StatutoryViolation::ContributionAboveLimit {
                account,
                requested,
                room,
            } => {
                write!(
                    f,
                    "contribution of {requested:.2} to {account:?} exceeds remaining limit {room:.2}"
                )
            }
        }
    }
}

impl std::error::Error for StatutoryViolation {}

/// Any failure a simulation run can produce
#[derive(Debug, Clone)]
pub enum SimulationError {
    Config(ConfigError),
    Lookup(LookupError),
    Statutory(StatutoryViolation),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "{e}"),
            SimulationError::Lookup(e) => write!(f, "{e}"),
            SimulationError::Statutory(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::Lookup(e) => Some(e),
            SimulationError::Statutory(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

impl From<LookupError> for SimulationError {
    fn from(e: LookupError) -> Self {
        SimulationError::Lookup(e)
    }
}

impl From<StatutoryViolation> for SimulationError {
    fn from(e: StatutoryViolation) -> Self {
        SimulationError::Statutory(e)
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
