mod engine;
mod ledger;
mod risk;
mod types;

pub use engine::{
    DEFAULT_EXPENSE_MULTIPLE, education_cost, loan_amortization, retirement_corpus,
    sip_future_value, swp_projection,
};
pub use ledger::{
    AssetClass, ClientRecord, EXPORT_HEADERS, ExportError, FinancialGoal, GoalKind, GoalStatus,
    Holding, LedgerFilter, LedgerMetrics, export_ledger_csv, filter_clients, ledger_metrics,
    seed_clients,
};
pub use risk::{
    RISK_CONSERVATIVE_MAX, RISK_MAX_SCORE, RISK_MODERATE_MAX, RISK_QUESTIONS, RiskAssessment,
    RiskBand, RiskOption, RiskQuestion, assess_risk_profile,
};
pub use types::{
    CalcError, EducationInputs, EducationYearRow, LoanInputs, LoanYearRow, MAX_AGE,
    MAX_SCHEDULE_YEARS, Projection, RetirementInputs, RetirementYearRow, SipInputs, SipYearRow,
    SwpInputs, SwpYearRow,
};
