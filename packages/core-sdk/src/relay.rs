use std::time::Instant;

use tracing::{info, warn};

use crate::{
    config::RelayConfig,
    error::{Failure, RelayError, KEY_MISSING},
    ingest::Inbound,
    llm,
    models::{ChatReply, CompletionRequest, Upstream},
    normalize, prompts,
};

/**
 * \brief 完整的中继流程：凭据检查 → 解析请求体 → 校验 → 组装提示 → 调用上游 → 组装回复。
 * \param config  注入的配置
 * \param client  共享 HTTP 客户端
 * \param inbound 入站负载
 */
pub async fn relay(
    config: &RelayConfig,
    client: &reqwest::Client,
    inbound: Inbound,
) -> Result<ChatReply, Failure> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| RelayError::Configuration(KEY_MISSING.to_string()))?;

    let payload = inbound.into_object();
    let request_id = normalize::request_id(&payload);
    let input = normalize::chat_input(&payload, config, request_id.clone()).map_err(|e| {
        info!(target: "server.chat", request_id = %request_id, "rejected: {}", e);
        e.with_request_id(request_id.as_str())
    })?;

    let request = CompletionRequest {
        model: input.model.clone(),
        temperature: input.temperature,
        messages: prompts::build_messages(&input),
    };
    let upstream = Upstream {
        api_base: config.api_base.clone(),
        api_key,
        timeout: config.timeout,
    };

    info!(
        target: "server.chat",
        request_id = %input.request_id,
        role = input.role.as_str(),
        model = %input.model,
        temperature = input.temperature,
        message_len = input.message.len(),
        "forwarding to provider"
    );
    let started = Instant::now();
    let reply = llm::chat_once(client, &upstream, &request)
        .await
        .map_err(|e| {
            warn!(
                target: "server.chat",
                request_id = %input.request_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "provider call failed: {}", e
            );
            e.with_request_id(input.request_id.as_str())
        })?;
    info!(
        target: "server.chat",
        request_id = %input.request_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        reply_len = reply.len(),
        "provider replied"
    );

    Ok(ChatReply {
        reply,
        request_id: input.request_id,
        role: input.role,
        model: input.model,
        temperature: input.temperature,
    })
}
