use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::prompts::ChatRole;

/**
 * \brief 上游 Provider 的连接参数。
 */
#[derive(Debug, Clone)]
pub struct Upstream {
    /** \brief API 基地址 */
    pub api_base: String,
    /** \brief Bearer 凭据 */
    pub api_key: String,
    /** \brief 单次调用截止时间 */
    pub timeout: Option<Duration>,
}

/**
 * \brief 消息结构，与 OpenAI Chat 消息格式对齐。
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /** \brief 角色：system/user */
    pub role: String,
    /** \brief 内容 */
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/**
 * \brief 发往 /v1/chat/completions 的请求体；messages 固定为 system + user 两条。
 */
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: [Message; 2],
}

/**
 * \brief 规范化后的入站请求。
 */
#[derive(Debug, Clone, PartialEq)]
pub struct ChatInput {
    /** \brief 已去除首尾空白，非空 */
    pub message: String,
    pub role: ChatRole,
    pub model: String,
    /** \brief 已截断到 [0,1] */
    pub temperature: f32,
    pub request_id: String,
}

/**
 * \brief 成功响应体。
 */
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub request_id: String,
    pub role: ChatRole,
    pub model: String,
    pub temperature: f32,
}
