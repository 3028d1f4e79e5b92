use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_emi(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::amortization::emi::EmiInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_servicing_core::amortization::emi::calculate_emi(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::amortization::schedule::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_servicing_core::amortization::schedule::build_amortization(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_position(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::amortization::position::LoanPositionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_servicing_core::amortization::position::loan_position(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Prepayment
// ---------------------------------------------------------------------------

#[napi]
pub fn prepayment_impact(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::prepayment::impact::PrepaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_servicing_core::prepayment::impact::analyze_prepayment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[napi]
pub fn savings_report(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::reporting::savings::SavingsReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_servicing_core::reporting::savings::generate_savings_report(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn overall_summary(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::reporting::summary::OverallSummaryInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_servicing_core::reporting::summary::overall_summary(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rate_comparison(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::reporting::rates::RateComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_servicing_core::reporting::rates::compare_rates(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
