use super::types::{
    CalcError, EducationInputs, EducationYearRow, LoanInputs, LoanYearRow, Projection,
    RetirementInputs, RetirementYearRow, SipInputs, SipYearRow, SwpInputs, SwpYearRow,
};

/// Retirement corpus sizing policy: target corpus is this many times the
/// projected annual expense at retirement (a 4% withdrawal-rate assumption).
pub const DEFAULT_EXPENSE_MULTIPLE: f64 = 25.0;

const MONTHS_PER_YEAR: u32 = 12;

fn monthly_rate(annual_pct: f64) -> f64 {
    annual_pct / 100.0 / 12.0
}

/// Future value of a level payment stream with payments at the start of each
/// period. Degenerates to simple accumulation when the rate is zero.
fn annuity_due_fv(payment: f64, rate: f64, months: u32) -> f64 {
    if rate == 0.0 {
        payment * f64::from(months)
    } else {
        payment * (((1.0 + rate).powi(months as i32) - 1.0) / rate) * (1.0 + rate)
    }
}

/// Maturity value of a monthly SIP, with one row per year. Each row's
/// balance is recomputed from the closed form at that year's month count
/// rather than accumulated, so rows cannot drift from the headline; the
/// interest column is the year-on-year gain net of contributions.
pub fn sip_future_value(inputs: &SipInputs) -> Result<Projection<SipYearRow>, CalcError> {
    inputs.validate()?;

    let rate = monthly_rate(inputs.expected_return);
    let headline = annuity_due_fv(
        inputs.monthly_investment,
        rate,
        inputs.tenure_years * MONTHS_PER_YEAR,
    );

    let invested_per_year = inputs.monthly_investment * f64::from(MONTHS_PER_YEAR);
    let mut rows = Vec::with_capacity(inputs.tenure_years as usize);
    let mut previous_balance = 0.0;
    for year in 1..=inputs.tenure_years {
        let balance = annuity_due_fv(inputs.monthly_investment, rate, year * MONTHS_PER_YEAR);
        rows.push(SipYearRow {
            year,
            invested: invested_per_year,
            interest: balance - previous_balance - invested_per_year,
            balance,
        });
        previous_balance = balance;
    }

    Ok(Projection { headline, rows })
}

/// EMI and yearly amortization for a fixed-rate loan. The headline is the
/// monthly installment; rows aggregate twelve months of interest and
/// principal, with the closing balance clamped at zero to absorb final-year
/// rounding.
pub fn loan_amortization(inputs: &LoanInputs) -> Result<Projection<LoanYearRow>, CalcError> {
    inputs.validate()?;

    let rate = monthly_rate(inputs.interest_rate);
    let months = inputs.tenure_years * MONTHS_PER_YEAR;
    let emi = if rate == 0.0 {
        inputs.principal / f64::from(months)
    } else {
        let growth = (1.0 + rate).powi(months as i32);
        inputs.principal * rate * growth / (growth - 1.0)
    };

    let mut rows = Vec::with_capacity(inputs.tenure_years as usize);
    let mut balance = inputs.principal;
    for year in 1..=inputs.tenure_years {
        let mut interest_paid = 0.0;
        let mut principal_paid = 0.0;
        for _ in 0..MONTHS_PER_YEAR {
            let interest = balance * rate;
            let principal = emi - interest;
            interest_paid += interest;
            principal_paid += principal;
            balance -= principal;
        }
        rows.push(LoanYearRow {
            year,
            principal_paid,
            interest_paid,
            balance: balance.max(0.0),
        });
    }

    Ok(Projection { headline: emi, rows })
}

/// Corpus needed to retire: projected monthly expense at retirement age
/// times twelve, times `expense_multiple`. Rows track the inflated monthly
/// expense for every age from today through retirement; only the final row
/// carries the corpus figure.
pub fn retirement_corpus(
    inputs: &RetirementInputs,
    expense_multiple: f64,
) -> Result<Projection<RetirementYearRow>, CalcError> {
    inputs.validate()?;
    if !expense_multiple.is_finite() || expense_multiple <= 0.0 {
        return Err(CalcError::invalid("expense_multiple must be > 0"));
    }

    let growth = 1.0 + inputs.inflation_rate / 100.0;
    let years_to_retire = inputs.retire_age - inputs.current_age;
    let future_expense = inputs.monthly_expenses * growth.powi(years_to_retire as i32);
    let headline = future_expense * f64::from(MONTHS_PER_YEAR) * expense_multiple;

    let mut rows = Vec::with_capacity(years_to_retire as usize + 1);
    for offset in 0..=years_to_retire {
        rows.push(RetirementYearRow {
            age: inputs.current_age + offset,
            monthly_expense: inputs.monthly_expenses * growth.powi(offset as i32),
            corpus_target: (offset == years_to_retire).then_some(headline),
        });
    }

    Ok(Projection { headline, rows })
}

/// Systematic withdrawal plan simulated month by month: interest accrues on
/// the running balance, then the withdrawal is taken. The schedule stops
/// after the first year whose closing balance is depleted, even if the
/// configured tenure is longer; closing balances are clamped at zero.
pub fn swp_projection(inputs: &SwpInputs) -> Result<Projection<SwpYearRow>, CalcError> {
    inputs.validate()?;

    let rate = monthly_rate(inputs.expected_return);
    let withdrawn_per_year = inputs.monthly_withdrawal * f64::from(MONTHS_PER_YEAR);

    let mut rows = Vec::with_capacity(inputs.tenure_years as usize);
    let mut balance = inputs.corpus;
    for year in 1..=inputs.tenure_years {
        let opening_balance = balance;
        let mut interest_accrued = 0.0;
        for _ in 0..MONTHS_PER_YEAR {
            let interest = balance * rate;
            interest_accrued += interest;
            balance = balance + interest - inputs.monthly_withdrawal;
        }
        rows.push(SwpYearRow {
            year,
            opening_balance,
            withdrawn: withdrawn_per_year,
            interest: interest_accrued,
            closing_balance: balance.max(0.0),
        });
        if balance <= 0.0 {
            break;
        }
    }

    Ok(Projection {
        headline: balance.max(0.0),
        rows,
    })
}

/// Inflation-adjusted future cost of an education goal, with one row per
/// intermediate year. The headline equals the final row's projected cost.
pub fn education_cost(inputs: &EducationInputs) -> Result<Projection<EducationYearRow>, CalcError> {
    inputs.validate()?;

    let growth = 1.0 + inputs.inflation_rate / 100.0;
    let mut rows = Vec::with_capacity(inputs.years_to_goal as usize);
    for year in 1..=inputs.years_to_goal {
        rows.push(EducationYearRow {
            year,
            projected_cost: inputs.current_cost * growth.powi(year as i32),
        });
    }

    Ok(Projection {
        headline: inputs.current_cost * growth.powi(inputs.years_to_goal as i32),
        rows,
    })
}
