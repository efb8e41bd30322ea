//! Example app for `juniper_relay_pagination`, serving todos and locations over GraphQL.
//!
//! Also what the integration tests in `tests/` run against.

pub mod config;
pub mod schema;

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use juniper_axum::extract::JuniperRequest;
use juniper_axum::graphiql;
use juniper_axum::response::JuniperResponse;
use std::sync::Arc;

use crate::schema::{Context, Schema};

/// Shared state for the GraphQL handler.
#[derive(Clone)]
pub struct AppState {
    pub schema: Arc<Schema>,
    pub context: Context,
}

impl AppState {
    pub fn new(context: Context) -> Self {
        AppState {
            schema: Arc::new(schema::schema()),
            context,
        }
    }
}

async fn graphql(
    State(state): State<AppState>,
    JuniperRequest(request): JuniperRequest,
) -> JuniperResponse {
    tracing::debug!("executing graphql request");
    JuniperResponse(request.execute(&*state.schema, &state.context).await)
}

/// Builds the router: `POST /graphql` executes queries, `GET /graphiql` serves the playground.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/graphql", post(graphql))
        .route("/graphiql", get(graphiql("/graphql", None)))
        .with_state(state)
}
