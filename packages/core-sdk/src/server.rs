use std::{any::Any, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::RelayConfig,
    error::{Failure, RelayError},
    ingest::Inbound,
    models::ChatReply,
    relay,
};

/** \brief /api/chat 请求体上限 */
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/**
 * \brief 处理器共享状态：不可变配置与复用的 HTTP 客户端。
 */
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }
}

/**
 * \brief 构建路由：/api/chat（POST/OPTIONS）与 /api/ping（任意方法）。
 */
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AllowMethods::list([Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([CONTENT_TYPE]));

    Router::new()
        .route(
            "/api/chat",
            post(chat)
                .options(preflight)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/api/ping", any(ping))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/**
 * \brief 启动 HTTP 服务，直到收到 Ctrl-C。
 */
pub async fn run(config: RelayConfig) -> Result<()> {
    let addr = config.bind_addr.clone();
    tracing::info!(
        target: "server",
        addr = %addr,
        api_base = %config.api_base,
        model = %config.default_model,
        has_key = config.has_key(),
        timeout_secs = config.timeout.map(|t| t.as_secs()),
        "starting chat relay"
    );
    if !config.has_key() {
        tracing::warn!(target: "server", "OPENAI_API_KEY is not set, /api/chat will answer 500");
    }

    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(target: "server", "listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await?;
    Ok(())
}

/**
 * \brief 等待关闭信号；信号处理器安装失败时只记录错误并保持运行。
 */
async fn shutdown_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        tracing::error!(target: "server", "failed to install ctrl-c handler: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "server", "shutting down");
}

/**
 * \brief POST /api/chat；读取请求体失败（如超出上限）同样返回 JSON 错误。
 */
async fn chat(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatReply>, Failure> {
    let body = body.map_err(|rejection| {
        tracing::warn!(
            target: "server.chat",
            status = rejection.status().as_u16(),
            "request body rejected: {}",
            rejection.body_text()
        );
        RelayError::Body {
            status: rejection.status().as_u16(),
            message: rejection.body_text(),
        }
    })?;
    let reply = relay::relay(&state.config, &state.client, Inbound::Raw(body)).await?;
    Ok(Json(reply))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/**
 * \brief 健康检查：仅报告凭据是否已配置，不发起网络调用。
 */
async fn ping(State(state): State<AppState>, method: Method) -> Json<serde_json::Value> {
    tracing::debug!(target: "server.ping", method = %method, "ping");
    Json(json!({
        "ok": true,
        "method": method.as_str(),
        "runtime": "rust",
        "hasKey": state.config.has_key(),
    }))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(target: "server.chat", "handler panicked: {}", detail);
    Failure::from(RelayError::Internal(detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panic_becomes_json_500() {
        let resp = panic_response(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], crate::error::INTERNAL_FAILED);
        assert_eq!(body["detail"], "boom");
    }

    #[tokio::test]
    async fn failed_signal_install_keeps_serving() {
        let failed = async { Err(std::io::Error::other("no signal driver")) };
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            shutdown_signal(failed),
        )
        .await;
        assert!(waited.is_err(), "shutdown must not fire on handler failure");
    }

    #[tokio::test]
    async fn received_signal_triggers_shutdown() {
        let received = async { Ok(()) };
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            shutdown_signal(received),
        )
        .await;
        assert!(waited.is_ok());
    }
}
