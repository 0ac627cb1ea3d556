//! HTTP API handlers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::arbitrage::{evaluate as evaluate_market, EvaluatorSettings, SurebetResult};
use crate::market::{Market, RawOdd};
use crate::metrics;
use crate::odds::{normalize as normalize_odd, normalize_as, OddsFormat};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Evaluator settings built from configuration.
    pub settings: Arc<EvaluatorSettings>,
    /// Stake used when a request omits one.
    pub default_stake: Decimal,
    /// Prometheus handle, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(settings: EvaluatorSettings, default_stake: Decimal) -> Self {
        Self {
            settings: Arc::new(settings),
            default_stake,
            prometheus: None,
        }
    }

    /// Attach a Prometheus handle for the /metrics endpoint.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EvaluatorSettings::default(), Decimal::ONE_HUNDRED)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// What went wrong.
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// Evaluate request body.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// Market to evaluate.
    pub market: Market,
    /// Bankroll; the configured default when absent.
    #[serde(default)]
    pub total_stake: Option<Decimal>,
}

/// Normalize request body.
#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    /// Raw price.
    pub odd: RawOdd,
    /// Force a notation instead of detecting one.
    #[serde(default)]
    pub format: Option<OddsFormat>,
}

/// Normalize response body.
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    /// Notation used.
    pub format: OddsFormat,
    /// Decimal odds.
    pub decimal: f64,
    /// `1 / decimal`.
    pub implied_probability: f64,
    /// The same price in every notation.
    pub notations: BTreeMap<String, String>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Evaluate a market - returns 400 on a non-positive stake.
pub async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<SurebetResult>, ApiError> {
    let stake = request.total_stake.unwrap_or(state.default_stake);
    let start = Instant::now();

    let result = evaluate_market(&request.market, stake, &state.settings)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    metrics::record_evaluation(&result, start);

    Ok(Json(result))
}

/// Normalize one price - returns 422 when it is malformed or implausible.
pub async fn normalize(
    State(state): State<AppState>,
    Json(request): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let odds = &state.settings.odds;
    let normalized = match request.format {
        Some(format) => normalize_as(&request.odd, format, odds),
        None => normalize_odd(&request.odd, odds),
    }
    .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    debug!(odd = %request.odd, decimal = normalized.decimal, "Normalize request");

    Ok(Json(NormalizeResponse {
        format: normalized.format,
        decimal: normalized.decimal,
        implied_probability: normalized.implied_probability(),
        notations: OddsFormat::iter()
            .map(|f| (f.to_string(), normalized.express(f)))
            .collect(),
    }))
}

/// Prometheus scrape endpoint - 404 when no recorder is installed.
pub async fn prometheus(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics not enabled".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_request_stake_is_optional() {
        let json = r#"{"market": {"outcomes": []}}"#;
        let request: EvaluateRequest = serde_json::from_str(json).unwrap();
        assert!(request.total_stake.is_none());

        let json = r#"{"market": {"outcomes": []}, "total_stake": 250}"#;
        let request: EvaluateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.total_stake, Some(Decimal::new(250, 0)));
    }

    #[test]
    fn normalize_request_accepts_format_override() {
        let json = r#"{"odd": 150, "format": "decimal"}"#;
        let request: NormalizeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.odd, RawOdd::Number(150.0));
        assert_eq!(request.format, Some(OddsFormat::Decimal));
    }
}
