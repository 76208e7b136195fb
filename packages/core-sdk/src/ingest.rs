use bytes::Bytes;
use serde_json::{Map, Value};

/**
 * \brief 入站负载：已解析的 JSON（CLI）或原始请求体（HTTP）。
 */
#[derive(Debug, Clone)]
pub enum Inbound {
    Json(Value),
    Raw(Bytes),
}

impl Inbound {
    /**
     * \brief 尽力取得 JSON 对象，从不失败。
     *
     * 空体、非 UTF-8、非法 JSON 以及非对象值都得到空对象，交由后续校验拒绝。
     */
    pub fn into_object(self) -> Map<String, Value> {
        match self {
            Inbound::Json(value) => object_or_empty(value),
            Inbound::Raw(bytes) => parse_raw(&bytes),
        }
    }
}

fn parse_raw(bytes: &[u8]) -> Map<String, Value> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(target: "server.chat", error = %err, "request body is not utf-8, treating as empty");
            return Map::new();
        }
    };
    if text.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => object_or_empty(value),
        Err(err) => {
            tracing::warn!(target: "server.chat", error = %err, "malformed JSON body, treating as empty");
            Map::new()
        }
    }
}

fn object_or_empty(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_and_blank_bodies_are_empty_objects() {
        assert!(Inbound::Raw(Bytes::new()).into_object().is_empty());
        assert!(Inbound::Raw(Bytes::from_static(b"  \n")).into_object().is_empty());
    }

    #[test]
    fn malformed_json_is_swallowed() {
        let map = Inbound::Raw(Bytes::from_static(b"{\"message\": ")).into_object();
        assert!(map.is_empty());
    }

    #[test]
    fn invalid_utf8_is_swallowed() {
        let map = Inbound::Raw(Bytes::from_static(&[0xff, 0xfe, b'{'])).into_object();
        assert!(map.is_empty());
    }

    #[test]
    fn non_object_json_is_empty() {
        assert!(Inbound::Raw(Bytes::from_static(b"[1,2]")).into_object().is_empty());
        assert!(Inbound::Json(json!("hello")).into_object().is_empty());
    }

    #[test]
    fn raw_object_is_parsed() {
        let map = Inbound::Raw(Bytes::from_static(br#"{"message":"hi","role":"frei"}"#))
            .into_object();
        assert_eq!(map.get("message"), Some(&json!("hi")));
        assert_eq!(map.get("role"), Some(&json!("frei")));
    }

    #[test]
    fn structured_payload_used_directly() {
        let map = Inbound::Json(json!({ "message": "x", "temperature": 0.5 })).into_object();
        assert_eq!(map.len(), 2);
    }
}
