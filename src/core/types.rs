use serde::Serialize;
use thiserror::Error;

/// The only error the calculator core raises. Degenerate but valid
/// configurations (zero rate, single-year tenure) are handled via their
/// algebraic limits and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CalcError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Headline figure plus the yearly breakdown backing it. Rows are in
/// chronological order; the final row's closing value always matches the
/// headline where the two describe the same quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection<R> {
    pub headline: f64,
    pub rows: Vec<R>,
}

/// Systematic investment plan: fixed monthly contribution compounding at a
/// fixed annual rate, contributions at the start of each month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SipInputs {
    pub monthly_investment: f64,
    /// Expected annual return in percent, e.g. 12 for 12% p.a.
    pub expected_return: f64,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanInputs {
    pub principal: f64,
    /// Annual interest rate in percent.
    pub interest_rate: f64,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retire_age: u32,
    /// Monthly expenses in today's money.
    pub monthly_expenses: f64,
    /// Expected annual inflation in percent.
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwpInputs {
    pub corpus: f64,
    pub monthly_withdrawal: f64,
    /// Expected annual return in percent.
    pub expected_return: f64,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EducationInputs {
    pub current_cost: f64,
    pub years_to_goal: u32,
    /// Expected annual cost inflation in percent.
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipYearRow {
    pub year: u32,
    pub invested: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanYearRow {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementYearRow {
    pub age: u32,
    pub monthly_expense: f64,
    /// Populated on the retirement-age row only; earlier rows carry no
    /// corpus figure and serialize as null.
    pub corpus_target: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwpYearRow {
    pub year: u32,
    pub opening_balance: f64,
    pub withdrawn: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationYearRow {
    pub year: u32,
    pub projected_cost: f64,
}

fn require_finite(name: &str, value: f64) -> Result<(), CalcError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::invalid(format!("{name} must be a finite number")))
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), CalcError> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid(format!("{name} must be > 0")))
    }
}

fn require_rate(name: &str, value: f64) -> Result<(), CalcError> {
    require_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid(format!("{name} must be >= 0")))
    }
}

/// Longest schedule any calculator will produce, in years.
pub const MAX_SCHEDULE_YEARS: u32 = 100;

/// Oldest age the retirement projection accepts.
pub const MAX_AGE: u32 = 120;

fn require_years(name: &str, value: u32) -> Result<(), CalcError> {
    if value < 1 {
        return Err(CalcError::invalid(format!("{name} must be >= 1")));
    }
    if value > MAX_SCHEDULE_YEARS {
        return Err(CalcError::invalid(format!(
            "{name} must be <= {MAX_SCHEDULE_YEARS}"
        )));
    }
    Ok(())
}

impl SipInputs {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_positive("monthly_investment", self.monthly_investment)?;
        require_rate("expected_return", self.expected_return)?;
        require_years("tenure_years", self.tenure_years)
    }
}

impl LoanInputs {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_positive("principal", self.principal)?;
        require_rate("interest_rate", self.interest_rate)?;
        require_years("tenure_years", self.tenure_years)
    }
}

impl RetirementInputs {
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.retire_age <= self.current_age {
            return Err(CalcError::invalid("retire_age must be > current_age"));
        }
        if self.retire_age > MAX_AGE {
            return Err(CalcError::invalid(format!(
                "retire_age must be <= {MAX_AGE}"
            )));
        }
        require_positive("monthly_expenses", self.monthly_expenses)?;
        require_rate("inflation_rate", self.inflation_rate)
    }
}

impl SwpInputs {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_positive("corpus", self.corpus)?;
        require_positive("monthly_withdrawal", self.monthly_withdrawal)?;
        require_rate("expected_return", self.expected_return)?;
        require_years("tenure_years", self.tenure_years)
    }
}

impl EducationInputs {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_positive("current_cost", self.current_cost)?;
        require_rate("inflation_rate", self.inflation_rate)?;
        require_years("years_to_goal", self.years_to_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_nan_and_infinity() {
        let mut inputs = SipInputs {
            monthly_investment: f64::NAN,
            expected_return: 12.0,
            tenure_years: 10,
        };
        assert!(inputs.validate().is_err());

        inputs.monthly_investment = f64::INFINITY;
        assert!(inputs.validate().is_err());

        inputs.monthly_investment = 5_000.0;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn validation_rejects_negative_rates_but_allows_zero() {
        let mut inputs = EducationInputs {
            current_cost: 1_000_000.0,
            years_to_goal: 5,
            inflation_rate: -1.0,
        };
        assert!(inputs.validate().is_err());

        inputs.inflation_rate = 0.0;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn validation_caps_tenure_and_age() {
        let mut inputs = SipInputs {
            monthly_investment: 5_000.0,
            expected_return: 12.0,
            tenure_years: MAX_SCHEDULE_YEARS,
        };
        assert!(inputs.validate().is_ok());

        inputs.tenure_years = MAX_SCHEDULE_YEARS + 1;
        assert!(inputs.validate().is_err());

        inputs.tenure_years = 400_000_000;
        assert!(inputs.validate().is_err());

        let inputs = RetirementInputs {
            current_age: 30,
            retire_age: MAX_AGE + 10,
            monthly_expenses: 50_000.0,
            inflation_rate: 6.0,
        };
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn retirement_validation_requires_retire_age_after_current_age() {
        let inputs = RetirementInputs {
            current_age: 60,
            retire_age: 60,
            monthly_expenses: 50_000.0,
            inflation_rate: 6.0,
        };
        let err = inputs.validate().expect_err("must reject equal ages");
        assert_eq!(
            err,
            CalcError::InvalidInput("retire_age must be > current_age".to_string())
        );
    }
}
