use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
};
use entity::ExitStatus;
use platform_api::{ApiError, ApiResult};
use platform_db::DbPool;
use products_hr::{
    ExitService, PermissionService,
    dto::{EmployeeExitResponse, ExitFilter, NewPermission, PermissionResponse},
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{config::AppConfig, graphql::SchemaType};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "hrms server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/permissions",
            get(list_permissions).post(create_permission),
        )
        .route(
            "/api/permissions/{id}",
            get(get_permission).delete(delete_permission),
        )
        .route("/api/employee-exits", get(list_exits))
        .route("/api/employee-exits/{id}", get(get_exit))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn graphql_handler(
    State(state): State<AppState>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = platform_db::check(&state.pool).await.is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn list_permissions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let rows = PermissionService::new(&state.pool).list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PermissionResponse>> {
    let row = PermissionService::new(&state.pool).get(id).await?;
    Ok(Json(row.into()))
}

async fn create_permission(
    State(state): State<AppState>,
    Json(input): Json<NewPermission>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let row = PermissionService::new(&state.pool).create(input).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

async fn delete_permission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    PermissionService::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExitQuery {
    employee_id: Option<i64>,
    status: Option<String>,
}

impl ExitQuery {
    fn into_filter(self) -> ApiResult<ExitFilter> {
        let status = self
            .status
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.parse::<ExitStatus>())
            .transpose()
            .map_err(|err| ApiError::invalid(err.to_string()))?;
        Ok(ExitFilter {
            employee_id: self.employee_id,
            status,
        })
    }
}

async fn list_exits(
    State(state): State<AppState>,
    Query(query): Query<ExitQuery>,
) -> ApiResult<Json<Vec<EmployeeExitResponse>>> {
    let filter = query.into_filter()?;
    let rows = ExitService::new(&state.pool).list(filter).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_exit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EmployeeExitResponse>> {
    let row = ExitService::new(&state.pool).get(id).await?;
    Ok(Json(row.into()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}
