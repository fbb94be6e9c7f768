//! Customer ledger endpoints.

use api_types::LedgerReportRequest;
use axum::{Json, extract::State};
use engine::{CustomerTransaction, LedgerReport};

use crate::{ServerError, ledger_filter, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CustomerTransaction>>, ServerError> {
    Ok(Json(state.engine.transactions().await?))
}

pub async fn report(
    State(state): State<ServerState>,
    Json(payload): Json<LedgerReportRequest>,
) -> Result<Json<LedgerReport<CustomerTransaction>>, ServerError> {
    let filter = ledger_filter(payload)?;
    Ok(Json(state.engine.transactions_report(&filter).await?))
}
