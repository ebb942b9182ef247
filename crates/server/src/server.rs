use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{
    Mailer, analytics, auth, categories, dashboard, expenses, fixed_expenses, income, reports,
};
use ledger::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub mailer: Mailer,
}

/// Resolves the bearer token to a user and stores it in the request
/// extensions. A missing or stale session ends the request with 401.
async fn authenticate(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let user = state
        .ledger
        .session_user(auth_header.token())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let open = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let authed = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/auth/profile",
            get(auth::profile)
                .put(auth::update_profile)
                .delete(auth::delete_account),
        )
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categories/{id}",
            put(categories::update).delete(categories::remove),
        )
        .route("/api/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/api/expenses/{id}",
            put(expenses::update).delete(expenses::remove),
        )
        .route(
            "/api/fixed-expenses",
            get(fixed_expenses::list).post(fixed_expenses::create),
        )
        .route(
            "/api/fixed-expenses/{id}",
            put(fixed_expenses::update).delete(fixed_expenses::remove),
        )
        .route(
            "/api/fixed-expenses/process-monthly",
            post(fixed_expenses::process_monthly),
        )
        .route("/api/income", get(income::config).put(income::update_config))
        .route(
            "/api/income/variable",
            get(income::list_variable).post(income::create_variable),
        )
        .route(
            "/api/income/variable/{id}",
            put(income::update_variable).delete(income::remove_variable),
        )
        .route(
            "/api/income/fixed",
            get(income::list_fixed).post(income::create_fixed),
        )
        .route(
            "/api/income/fixed/{id}",
            put(income::update_fixed).delete(income::remove_fixed),
        )
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route(
            "/api/dashboard/recent-transactions",
            get(dashboard::recent_transactions),
        )
        .route(
            "/api/dashboard/all-transactions",
            get(dashboard::all_transactions),
        )
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/api/analytics/chart-data", get(analytics::chart_data))
        .route("/api/reports/generate", get(reports::generate))
        .route("/api/reports/pdf", get(reports::download))
        .route("/api/reports/email", post(reports::email))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    open.merge(authed).with_state(state)
}

pub async fn run_with_listener(
    ledger: Ledger,
    mailer: Mailer,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
        mailer,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    mailer: Mailer,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, mailer, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
