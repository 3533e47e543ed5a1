use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    CalcError, ClientRecord, DEFAULT_EXPENSE_MULTIPLE, EducationInputs, EducationYearRow,
    GoalStatus, LedgerFilter, LoanInputs, LoanYearRow, RISK_MAX_SCORE, RISK_QUESTIONS,
    RetirementInputs, RetirementYearRow, RiskQuestion, SipInputs, SipYearRow, SwpInputs,
    SwpYearRow, education_cost, export_ledger_csv, filter_clients, ledger_metrics,
    loan_amortization, retirement_corpus, seed_clients, sip_future_value, swp_projection,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Clone)]
struct AppState {
    clients: Arc<RwLock<Vec<ClientRecord>>>,
}

impl AppState {
    fn new() -> Self {
        Self {
            clients: Arc::new(RwLock::new(seed_clients())),
        }
    }

    // A panicked writer must not take the ledger down with it; the Vec is
    // still valid after a poisoned lock, so recover the guard.
    fn ledger(&self) -> RwLockReadGuard<'_, Vec<ClientRecord>> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ledger_mut(&self) -> RwLockWriteGuard<'_, Vec<ClientRecord>> {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    monthly_investment: Option<f64>,
    expected_return: Option<f64>,
    #[serde(alias = "tenure")]
    tenure_years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanPayload {
    principal: Option<f64>,
    interest_rate: Option<f64>,
    tenure_years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    current_age: Option<u32>,
    retire_age: Option<u32>,
    monthly_expenses: Option<f64>,
    inflation_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SwpPayload {
    corpus: Option<f64>,
    monthly_withdrawal: Option<f64>,
    expected_return: Option<f64>,
    tenure_years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EducationPayload {
    current_cost: Option<f64>,
    years_to_goal: Option<u32>,
    inflation_rate: Option<f64>,
}

// Defaults mirror the web form's initial state.

fn default_sip_inputs() -> SipInputs {
    SipInputs {
        monthly_investment: 5_000.0,
        expected_return: 12.0,
        tenure_years: 10,
    }
}

fn default_loan_inputs() -> LoanInputs {
    LoanInputs {
        principal: 500_000.0,
        interest_rate: 8.5,
        tenure_years: 5,
    }
}

fn default_retirement_inputs() -> RetirementInputs {
    RetirementInputs {
        current_age: 30,
        retire_age: 60,
        monthly_expenses: 50_000.0,
        inflation_rate: 6.0,
    }
}

fn default_swp_inputs() -> SwpInputs {
    SwpInputs {
        corpus: 10_000_000.0,
        monthly_withdrawal: 50_000.0,
        expected_return: 8.0,
        tenure_years: 10,
    }
}

fn default_education_inputs() -> EducationInputs {
    EducationInputs {
        current_cost: 2_000_000.0,
        years_to_goal: 15,
        inflation_rate: 10.0,
    }
}

fn sip_inputs_from_payload(payload: SipPayload) -> SipInputs {
    let defaults = default_sip_inputs();
    SipInputs {
        monthly_investment: payload
            .monthly_investment
            .unwrap_or(defaults.monthly_investment),
        expected_return: payload.expected_return.unwrap_or(defaults.expected_return),
        tenure_years: payload.tenure_years.unwrap_or(defaults.tenure_years),
    }
}

fn loan_inputs_from_payload(payload: LoanPayload) -> LoanInputs {
    let defaults = default_loan_inputs();
    LoanInputs {
        principal: payload.principal.unwrap_or(defaults.principal),
        interest_rate: payload.interest_rate.unwrap_or(defaults.interest_rate),
        tenure_years: payload.tenure_years.unwrap_or(defaults.tenure_years),
    }
}

fn retirement_inputs_from_payload(payload: RetirementPayload) -> RetirementInputs {
    let defaults = default_retirement_inputs();
    RetirementInputs {
        current_age: payload.current_age.unwrap_or(defaults.current_age),
        retire_age: payload.retire_age.unwrap_or(defaults.retire_age),
        monthly_expenses: payload.monthly_expenses.unwrap_or(defaults.monthly_expenses),
        inflation_rate: payload.inflation_rate.unwrap_or(defaults.inflation_rate),
    }
}

fn swp_inputs_from_payload(payload: SwpPayload) -> SwpInputs {
    let defaults = default_swp_inputs();
    SwpInputs {
        corpus: payload.corpus.unwrap_or(defaults.corpus),
        monthly_withdrawal: payload
            .monthly_withdrawal
            .unwrap_or(defaults.monthly_withdrawal),
        expected_return: payload.expected_return.unwrap_or(defaults.expected_return),
        tenure_years: payload.tenure_years.unwrap_or(defaults.tenure_years),
    }
}

fn education_inputs_from_payload(payload: EducationPayload) -> EducationInputs {
    let defaults = default_education_inputs();
    EducationInputs {
        current_cost: payload.current_cost.unwrap_or(defaults.current_cost),
        years_to_goal: payload.years_to_goal.unwrap_or(defaults.years_to_goal),
        inflation_rate: payload.inflation_rate.unwrap_or(defaults.inflation_rate),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SipResponse {
    maturity_value: f64,
    schedule: Vec<SipYearRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoanResponse {
    monthly_emi: f64,
    schedule: Vec<LoanYearRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetirementResponse {
    corpus_target: f64,
    schedule: Vec<RetirementYearRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwpResponse {
    final_balance: f64,
    schedule: Vec<SwpYearRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EducationResponse {
    future_cost: f64,
    schedule: Vec<EducationYearRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AssessPayload {
    answers: Vec<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RiskQuestionsResponse {
    questions: &'static [RiskQuestion],
    max_score: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LedgerQuery {
    search: Option<String>,
    min_risk: Option<u32>,
    max_risk: Option<u32>,
    min_aum: Option<f64>,
    max_aum: Option<f64>,
    status: Option<GoalStatus>,
}

fn ledger_filter_from_query(query: LedgerQuery) -> LedgerFilter {
    let defaults = LedgerFilter::default();
    LedgerFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        min_risk: query.min_risk.unwrap_or(defaults.min_risk),
        max_risk: query.max_risk.unwrap_or(defaults.max_risk),
        min_aum: query.min_aum.unwrap_or(defaults.min_aum),
        max_aum: query.max_aum,
        status: query.status.unwrap_or(defaults.status),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LedgerClientsResponse {
    total: usize,
    matched: usize,
    clients: Vec<ClientRecord>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "planvision HTTP API listening");
    tracing::info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/calculators/sip",
            get(sip_get_handler).post(sip_post_handler),
        )
        .route(
            "/api/calculators/loan",
            get(loan_get_handler).post(loan_post_handler),
        )
        .route(
            "/api/calculators/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .route(
            "/api/calculators/swp",
            get(swp_get_handler).post(swp_post_handler),
        )
        .route(
            "/api/calculators/education",
            get(education_get_handler).post(education_post_handler),
        )
        .route("/api/risk/questions", get(risk_questions_handler))
        .route("/api/risk/assess", axum::routing::post(risk_assess_handler))
        .route(
            "/api/ledger/clients",
            get(ledger_clients_handler).post(ledger_add_client_handler),
        )
        .route("/api/ledger/clients/export", get(ledger_export_handler))
        .route("/api/ledger/metrics", get(ledger_metrics_handler))
        .fallback(not_found_handler)
        .with_state(AppState::new())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn sip_get_handler(Query(payload): Query<SipPayload>) -> Response {
    sip_handler_impl(payload)
}

async fn sip_post_handler(Json(payload): Json<SipPayload>) -> Response {
    sip_handler_impl(payload)
}

fn sip_handler_impl(payload: SipPayload) -> Response {
    let inputs = sip_inputs_from_payload(payload);
    match sip_future_value(&inputs) {
        Ok(projection) => json_response(
            StatusCode::OK,
            SipResponse {
                maturity_value: projection.headline,
                schedule: projection.rows,
            },
        ),
        Err(err) => invalid_input_response(err),
    }
}

async fn loan_get_handler(Query(payload): Query<LoanPayload>) -> Response {
    loan_handler_impl(payload)
}

async fn loan_post_handler(Json(payload): Json<LoanPayload>) -> Response {
    loan_handler_impl(payload)
}

fn loan_handler_impl(payload: LoanPayload) -> Response {
    let inputs = loan_inputs_from_payload(payload);
    match loan_amortization(&inputs) {
        Ok(projection) => json_response(
            StatusCode::OK,
            LoanResponse {
                monthly_emi: projection.headline,
                schedule: projection.rows,
            },
        ),
        Err(err) => invalid_input_response(err),
    }
}

async fn retirement_get_handler(Query(payload): Query<RetirementPayload>) -> Response {
    retirement_handler_impl(payload)
}

async fn retirement_post_handler(Json(payload): Json<RetirementPayload>) -> Response {
    retirement_handler_impl(payload)
}

fn retirement_handler_impl(payload: RetirementPayload) -> Response {
    let inputs = retirement_inputs_from_payload(payload);
    match retirement_corpus(&inputs, DEFAULT_EXPENSE_MULTIPLE) {
        Ok(projection) => json_response(
            StatusCode::OK,
            RetirementResponse {
                corpus_target: projection.headline,
                schedule: projection.rows,
            },
        ),
        Err(err) => invalid_input_response(err),
    }
}

async fn swp_get_handler(Query(payload): Query<SwpPayload>) -> Response {
    swp_handler_impl(payload)
}

async fn swp_post_handler(Json(payload): Json<SwpPayload>) -> Response {
    swp_handler_impl(payload)
}

fn swp_handler_impl(payload: SwpPayload) -> Response {
    let inputs = swp_inputs_from_payload(payload);
    match swp_projection(&inputs) {
        Ok(projection) => json_response(
            StatusCode::OK,
            SwpResponse {
                final_balance: projection.headline,
                schedule: projection.rows,
            },
        ),
        Err(err) => invalid_input_response(err),
    }
}

async fn education_get_handler(Query(payload): Query<EducationPayload>) -> Response {
    education_handler_impl(payload)
}

async fn education_post_handler(Json(payload): Json<EducationPayload>) -> Response {
    education_handler_impl(payload)
}

fn education_handler_impl(payload: EducationPayload) -> Response {
    let inputs = education_inputs_from_payload(payload);
    match education_cost(&inputs) {
        Ok(projection) => json_response(
            StatusCode::OK,
            EducationResponse {
                future_cost: projection.headline,
                schedule: projection.rows,
            },
        ),
        Err(err) => invalid_input_response(err),
    }
}

async fn risk_questions_handler() -> Response {
    json_response(
        StatusCode::OK,
        RiskQuestionsResponse {
            questions: RISK_QUESTIONS,
            max_score: RISK_MAX_SCORE,
        },
    )
}

async fn risk_assess_handler(Json(payload): Json<AssessPayload>) -> Response {
    match crate::core::assess_risk_profile(&payload.answers) {
        Ok(assessment) => json_response(StatusCode::OK, assessment),
        Err(err) => invalid_input_response(err),
    }
}

async fn ledger_clients_handler(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Response {
    let filter = ledger_filter_from_query(query);
    let clients = state.ledger();
    let matched: Vec<ClientRecord> = filter_clients(&clients, &filter)
        .into_iter()
        .cloned()
        .collect();
    json_response(
        StatusCode::OK,
        LedgerClientsResponse {
            total: clients.len(),
            matched: matched.len(),
            clients: matched,
        },
    )
}

fn validate_new_client(client: &ClientRecord) -> Result<(), String> {
    if client.name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if client.email.trim().is_empty() {
        return Err("email must not be empty".to_string());
    }
    if !client.portfolio_value.is_finite() || client.portfolio_value < 0.0 {
        return Err("portfolioValue must be >= 0".to_string());
    }
    if client.risk_score > 100 {
        return Err("riskScore must be between 0 and 100".to_string());
    }
    Ok(())
}

async fn ledger_add_client_handler(
    State(state): State<AppState>,
    Json(client): Json<ClientRecord>,
) -> Response {
    if let Err(msg) = validate_new_client(&client) {
        return error_response(StatusCode::BAD_REQUEST, &msg);
    }
    let mut clients = state.ledger_mut();
    clients.push(client.clone());
    tracing::info!(name = %client.name, total = clients.len(), "client added to ledger");
    json_response(StatusCode::CREATED, client)
}

async fn ledger_export_handler(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Response {
    let filter = ledger_filter_from_query(query);
    let clients = state.ledger();
    let matched = filter_clients(&clients, &filter);
    match export_ledger_csv(&matched) {
        Ok(body) => with_cache_control((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"vision_ledger.csv\"",
                ),
            ],
            body,
        )),
        Err(err) => {
            tracing::error!(%err, "ledger export failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to build ledger export",
            )
        }
    }
}

async fn ledger_metrics_handler(State(state): State<AppState>) -> Response {
    let clients = state.ledger();
    json_response(StatusCode::OK, ledger_metrics(&clients))
}

fn invalid_input_response(err: CalcError) -> Response {
    tracing::debug!(%err, "rejected calculator request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sip_payload_merges_over_defaults() {
        let payload: SipPayload =
            serde_json::from_str(r#"{"monthlyInvestment": 7500}"#).expect("json should parse");
        let inputs = sip_inputs_from_payload(payload);

        assert_approx(inputs.monthly_investment, 7_500.0);
        assert_approx(inputs.expected_return, 12.0);
        assert_eq!(inputs.tenure_years, 10);
    }

    #[test]
    fn sip_payload_accepts_tenure_alias() {
        let payload: SipPayload =
            serde_json::from_str(r#"{"tenure": 25}"#).expect("json should parse");
        let inputs = sip_inputs_from_payload(payload);
        assert_eq!(inputs.tenure_years, 25);
    }

    #[test]
    fn empty_payloads_reproduce_the_form_defaults() {
        let sip = sip_inputs_from_payload(SipPayload::default());
        assert_eq!(sip, default_sip_inputs());

        let loan = loan_inputs_from_payload(LoanPayload::default());
        assert_eq!(loan, default_loan_inputs());

        let swp = swp_inputs_from_payload(SwpPayload::default());
        assert_eq!(swp, default_swp_inputs());

        let education = education_inputs_from_payload(EducationPayload::default());
        assert_eq!(education, default_education_inputs());

        let retirement = retirement_inputs_from_payload(RetirementPayload::default());
        assert_eq!(retirement, default_retirement_inputs());
    }

    #[test]
    fn all_default_inputs_are_valid() {
        assert!(sip_future_value(&default_sip_inputs()).is_ok());
        assert!(loan_amortization(&default_loan_inputs()).is_ok());
        assert!(retirement_corpus(&default_retirement_inputs(), DEFAULT_EXPENSE_MULTIPLE).is_ok());
        assert!(swp_projection(&default_swp_inputs()).is_ok());
        assert!(education_cost(&default_education_inputs()).is_ok());
    }

    #[test]
    fn sip_response_serializes_with_camel_case_keys() {
        let projection = sip_future_value(&default_sip_inputs()).expect("valid inputs");
        let response = SipResponse {
            maturity_value: projection.headline,
            schedule: projection.rows,
        };
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"maturityValue\""));
        assert!(json.contains("\"schedule\""));
        assert!(json.contains("\"invested\""));
        assert!(json.contains("\"balance\""));
    }

    #[test]
    fn retirement_response_uses_null_for_missing_corpus_rows() {
        let projection = retirement_corpus(&default_retirement_inputs(), DEFAULT_EXPENSE_MULTIPLE)
            .expect("valid inputs");
        let response = RetirementResponse {
            corpus_target: projection.headline,
            schedule: projection.rows,
        };
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"corpusTarget\":null"));
    }

    #[test]
    fn ledger_query_parses_kebab_case_status() {
        let query: LedgerQuery =
            serde_json::from_str(r#"{"status": "on-track", "minRisk": 10}"#)
                .expect("json should parse");
        let filter = ledger_filter_from_query(query);
        assert_eq!(filter.status, GoalStatus::OnTrack);
        assert_eq!(filter.min_risk, 10);
        assert_eq!(filter.max_risk, 100);
    }

    #[test]
    fn ledger_filter_drops_blank_search_terms() {
        let query = LedgerQuery {
            search: Some("   ".to_string()),
            ..LedgerQuery::default()
        };
        let filter = ledger_filter_from_query(query);
        assert!(filter.search.is_none());
    }

    #[test]
    fn ledger_survives_a_poisoned_lock() {
        let state = AppState::new();

        let clients = Arc::clone(&state.clients);
        let writer = std::thread::spawn(move || {
            let _guard = clients.write().unwrap_or_else(PoisonError::into_inner);
            panic!("writer died mid-update");
        });
        assert!(writer.join().is_err());

        assert_eq!(state.ledger().len(), 3);
        state.ledger_mut().push(seed_clients().remove(0));
        assert_eq!(state.ledger().len(), 4);
    }

    #[test]
    fn new_client_validation_rejects_bad_records() {
        let mut client = seed_clients().remove(0);
        client.name = "  ".to_string();
        assert!(validate_new_client(&client).is_err());

        let mut client = seed_clients().remove(0);
        client.portfolio_value = f64::NAN;
        assert!(validate_new_client(&client).is_err());

        let client = seed_clients().remove(0);
        assert!(validate_new_client(&client).is_ok());
    }

    #[test]
    fn client_record_round_trips_through_json() {
        let client = seed_clients().remove(0);
        let json = serde_json::to_string(&client).expect("client should serialize");
        assert!(json.contains("\"riskScore\":35"));
        assert!(json.contains("\"category\":\"FD\""));

        let parsed: ClientRecord = serde_json::from_str(&json).expect("client should parse");
        assert_eq!(parsed, client);
    }

    #[test]
    fn assess_payload_parses_answer_indices() {
        let payload: AssessPayload =
            serde_json::from_str(r#"{"answers": [0, 3, 3, 3, 3, 3]}"#).expect("json should parse");
        let assessment =
            crate::core::assess_risk_profile(&payload.answers).expect("valid answers");
        assert_eq!(assessment.score, 60);
    }
}
