use serde_json::{Map, Value};

use crate::{
    config::RelayConfig,
    error::{RelayError, MESSAGE_MISSING},
    models::ChatInput,
    prompts::ChatRole,
};

pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/**
 * \brief 取客户端提供的 requestId，缺失或非字符串时生成 UUID v4。
 */
pub fn request_id(payload: &Map<String, Value>) -> String {
    non_empty_str(payload, "requestId")
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/**
 * \brief 校验并规范化入站字段；类型不符的字段按缺省处理。
 * \param payload    已解析的请求对象
 * \param config     提供默认模型
 * \param request_id 已确定的关联 ID
 */
pub fn chat_input(
    payload: &Map<String, Value>,
    config: &RelayConfig,
    request_id: String,
) -> Result<ChatInput, RelayError> {
    let message = non_empty_str(payload, "message")
        .ok_or_else(|| RelayError::Validation(MESSAGE_MISSING.to_string()))?;

    let role = payload
        .get("role")
        .and_then(Value::as_str)
        .map(ChatRole::parse)
        .unwrap_or_default();

    let model = non_empty_str(payload, "model")
        .map(str::to_string)
        .unwrap_or_else(|| config.default_model.clone());

    Ok(ChatInput {
        message: message.to_string(),
        role,
        model,
        temperature: temperature(payload.get("temperature")),
        request_id,
    })
}

fn temperature(value: Option<&Value>) -> f32 {
    match value.and_then(Value::as_f64) {
        Some(t) if t.is_finite() => t.clamp(0.0, 1.0) as f32,
        _ => DEFAULT_TEMPERATURE,
    }
}

fn non_empty_str<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
