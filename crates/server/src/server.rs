use axum::{
    Router,
    routing::{get, post, put},
};

use std::sync::Arc;

use crate::{
    creditors, debts, deposits, orders, representatives, temp_orders, transactions,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Build the HTTP router over `engine`.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/creditors", get(creditors::list).post(creditors::create))
        .route(
            "/creditors/{id}",
            get(creditors::get)
                .patch(creditors::update)
                .delete(creditors::delete),
        )
        .route("/creditors/{id}/balance", get(creditors::balance))
        .route("/creditors/{id}/recompute", post(creditors::recompute))
        .route("/creditors/{id}/debts", get(creditors::debts))
        .route("/debts", get(debts::list).post(debts::create))
        .route("/debts/{id}", axum::routing::delete(debts::delete))
        .route("/debts/report", post(debts::report))
        .route("/transactions", get(transactions::list))
        .route("/transactions/report", post(transactions::report))
        .route(
            "/temp-orders",
            get(temp_orders::list).post(temp_orders::create),
        )
        .route(
            "/temp-orders/{id}",
            get(temp_orders::get).patch(temp_orders::update),
        )
        .route("/temp-orders/{id}/payments", post(temp_orders::payment))
        .route("/temp-orders/{id}/convert", post(temp_orders::convert))
        .route(
            "/sub-orders/{id}/representative",
            put(temp_orders::assign_representative),
        )
        .route("/sub-orders/{id}/status", put(temp_orders::update_status))
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/{id}", get(orders::get))
        .route("/orders/{id}/status", put(orders::update_status))
        .route(
            "/orders/{id}/representative",
            put(orders::assign_representative),
        )
        .route("/orders/{id}/collect", post(orders::collect))
        .route("/deposits", get(deposits::list).post(deposits::create))
        .route(
            "/deposits/{id}",
            get(deposits::get)
                .patch(deposits::update)
                .delete(deposits::delete),
        )
        .route("/deposits/{id}/status", put(deposits::update_status))
        .route(
            "/representatives",
            get(representatives::list).post(representatives::create),
        )
        .route("/representatives/{id}", get(representatives::get))
        .route("/representatives/{id}/orders", get(representatives::orders))
        .route(
            "/representatives/{id}/deposits",
            get(representatives::deposits),
        )
        .route(
            "/representatives/{id}/sub-orders",
            get(representatives::sub_orders),
        )
        .route(
            "/representatives/{id}/summary",
            get(representatives::summary),
        )
        .route("/representatives/{id}/log", post(representatives::log))
        .route(
            "/representatives/{id}/deposits/{deposit_id}/collect",
            post(representatives::collect_deposit),
        )
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
