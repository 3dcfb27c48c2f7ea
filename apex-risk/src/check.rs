use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single, composable risk validation over one input value.
pub trait RiskCheck {
    type Input;
    type Error;

    fn name() -> &'static str;
    fn check(&self, input: &Self::Input) -> Result<(), Self::Error>;
}

/// Passes when `input <= limit`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize, Constructor)]
pub struct CheckHigherThan<T> {
    pub limit: T,
}

impl<T> RiskCheck for CheckHigherThan<T>
where
    T: Clone + PartialOrd,
{
    type Input = T;
    type Error = CheckHigherThanError<T>;

    fn name() -> &'static str {
        "CheckHigherThan"
    }

    fn check(&self, input: &Self::Input) -> Result<(), Self::Error> {
        if input > &self.limit {
            Err(CheckHigherThanError {
                input: input.clone(),
                limit: self.limit.clone(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Deserialize, Serialize, Error, Constructor)]
#[error("CheckHigherThan failed: input {input:?} > limit {limit:?}")]
pub struct CheckHigherThanError<T: std::fmt::Debug> {
    pub input: T,
    pub limit: T,
}

/// Passes when `input >= limit` (e.g. `daily_pnl >= -max_daily_loss`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize, Constructor)]
pub struct CheckLowerThan<T> {
    pub limit: T,
}

impl<T> RiskCheck for CheckLowerThan<T>
where
    T: Clone + PartialOrd,
{
    type Input = T;
    type Error = CheckLowerThanError<T>;

    fn name() -> &'static str {
        "CheckLowerThan"
    }

    fn check(&self, input: &Self::Input) -> Result<(), Self::Error> {
        if input < &self.limit {
            Err(CheckLowerThanError {
                input: input.clone(),
                limit: self.limit.clone(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Deserialize, Serialize, Error, Constructor)]
#[error("CheckLowerThan failed: input {input:?} < limit {limit:?}")]
pub struct CheckLowerThanError<T: std::fmt::Debug> {
    pub input: T,
    pub limit: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn check_higher_than_rejects_values_above_limit() {
        let check = CheckHigherThan::new(dec!(10));
        assert!(check.check(&dec!(10)).is_ok());
        assert!(check.check(&dec!(10.01)).is_err());
    }

    #[test]
    fn check_lower_than_rejects_values_below_limit() {
        let check = CheckLowerThan::new(dec!(-100));
        assert!(check.check(&dec!(-100)).is_ok());
        assert!(check.check(&dec!(-100.01)).is_err());
    }
}
