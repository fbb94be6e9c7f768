use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, FixedOffset, Utc};
use engine::{DateRange, EngineError, LedgerFilter};

use serde::Serialize;
pub use server::{router, run, run_with_listener, spawn_with_listener};

mod creditors;
mod debts;
mod deposits;
mod orders;
mod representatives;
mod server;
mod temp_orders;
mod transactions;

pub mod types {
    pub use api_types::{AccountType, Currency, LedgerReportRequest, RepresentativeAssign};

    pub mod creditor {
        pub use api_types::creditor::{CreditorKind, CreditorNew, CreditorTotal, CreditorUpdate};
        pub use engine::{Balances, Creditor};
    }

    pub mod debt {
        pub use api_types::debt::DebtNew;
        pub use engine::{ExternalDebt, LedgerReport};
    }

    pub mod transaction {
        pub use engine::{CustomerTransaction, LedgerReport};
    }

    pub mod temp_order {
        pub use api_types::temp_order::{
            SubOrderNew, SubOrderStatusUpdate, TempOrderNew, TempOrderPayment, TempOrderUpdate,
        };
        pub use engine::{SubOrder, TempOrder};
    }

    pub mod order {
        pub use api_types::order::{OrderCollect, OrderNew, OrderStatus, StatusUpdate};
        pub use engine::Order;
    }

    pub mod deposit {
        pub use api_types::deposit::{
            DepositNew, DepositStatus, DepositStatusUpdate, DepositUpdate,
        };
        pub use engine::Deposit;
    }

    pub mod representative {
        pub use api_types::representative::{LogPeriod, LogRequest, RepresentativeNew};
        pub use engine::{FinancialLog, Representative, RepresentativeSummary};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidInput(_)
        | EngineError::Overpayment(_)
        | EngineError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => {
            tracing::debug!(validation = other.is_validation(), "request rejected: {other}");
            other.to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Client supplied timestamp, or now.
fn occurred_at(value: Option<DateTime<FixedOffset>>) -> DateTime<Utc> {
    value.map_or_else(Utc::now, |at| at.with_timezone(&Utc))
}

fn account_type(value: Option<api_types::AccountType>) -> Result<engine::AccountType, ServerError> {
    match value {
        Some(value) => Ok(engine::AccountType::try_from(value.as_str())?),
        None => Ok(engine::AccountType::default()),
    }
}

fn ledger_filter(request: api_types::LedgerReportRequest) -> Result<LedgerFilter, ServerError> {
    let range = match (request.from, request.to) {
        (None, None) => None,
        (Some(day), None) | (None, Some(day)) => Some(DateRange::day(day)),
        (Some(from), Some(to)) => Some(DateRange::new(from, to)?),
    };
    let account_type = request
        .account_type
        .map(|value| engine::AccountType::try_from(value.as_str()))
        .transpose()?;
    Ok(LedgerFilter {
        range,
        account_type,
        text: request.text,
    })
}
