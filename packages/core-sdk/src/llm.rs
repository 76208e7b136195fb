use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::{
    error::RelayError,
    models::{CompletionRequest, Upstream},
};

/**
 * \brief 非流式调用 /v1/chat/completions，返回首个 choice 的回复文本。
 *
 * 配置了截止时间时，整个交换（发送与读取响应体）受其约束；超时后丢弃 future 即中止连接。
 */
pub async fn chat_once(
    client: &reqwest::Client,
    upstream: &Upstream,
    request: &CompletionRequest,
) -> Result<String, RelayError> {
    let exchange = exchange(client, upstream, request);
    match upstream.timeout {
        Some(limit) => tokio::time::timeout(limit, exchange).await.map_err(|_| {
            RelayError::Network(format!("Zeitüberschreitung nach {}s", limit.as_secs_f32()))
        })?,
        None => exchange.await,
    }
}

async fn exchange(
    client: &reqwest::Client,
    upstream: &Upstream,
    request: &CompletionRequest,
) -> Result<String, RelayError> {
    let url = format!(
        "{}/v1/chat/completions",
        upstream.api_base.trim_end_matches('/')
    );

    let resp = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {}", upstream.api_key))
        .json(request)
        .send()
        .await
        .map_err(network_err)?;

    let status = resp.status();
    let text = resp.text().await.map_err(network_err)?;
    if !status.is_success() {
        return Err(RelayError::Upstream {
            status: status.as_u16(),
            detail: text,
        });
    }
    let v: Value = serde_json::from_str(&text).map_err(|e| RelayError::Upstream {
        status: status.as_u16(),
        detail: format!("invalid completion payload: {}", e),
    })?;
    Ok(extract_openai_content(&v))
}

fn network_err(e: reqwest::Error) -> RelayError {
    RelayError::Network(e.to_string())
}

fn extract_openai_content(v: &Value) -> String {
    v.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .trim()
        .to_string()
}
