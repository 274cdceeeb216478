//! JSend response envelopes.
//!
//! Success: `{"status": "success", "data": {"<name>": <value>}}`.
//! Rejected input: `{"status": "fail", "data": {"<field>": "<message>"}}`.
//! Everything else: `{"status": "error", "code": "...", "message": "..."}`.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Serialize)]
pub struct JSendResponse<T> {
    pub status: JSendStatus,
    pub data: BTreeMap<&'static str, T>,
}

impl<T: Serialize> JSendResponse<T> {
    /// Wrap `value` under the resource name `name`.
    pub fn success(name: &'static str, value: T) -> Self {
        Self {
            status: JSendStatus::Success,
            data: BTreeMap::from([(name, value)]),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JSendError {
    pub status: JSendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
}

impl JSendError {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: JSendStatus::Error,
            code: Some(code),
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn fail(fields: BTreeMap<String, String>) -> Self {
        Self {
            status: JSendStatus::Fail,
            code: Some("validation_failed"),
            message: None,
            data: Some(fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_nests_under_name() {
        let v = serde_json::to_value(JSendResponse::success("user", json!({"id": "U1"}))).unwrap();
        assert_eq!(v, json!({"status": "success", "data": {"user": {"id": "U1"}}}));
    }

    #[test]
    fn error_has_code_and_message() {
        let v = serde_json::to_value(JSendError::error("not_found", "task not found: T1")).unwrap();
        assert_eq!(
            v,
            json!({"status": "error", "code": "not_found", "message": "task not found: T1"})
        );
    }

    #[test]
    fn fail_carries_field_messages() {
        let fields = BTreeMap::from([("username".to_string(), "required".to_string())]);
        let v = serde_json::to_value(JSendError::fail(fields)).unwrap();
        assert_eq!(v["status"], "fail");
        assert_eq!(v["data"]["username"], "required");
        assert!(v.get("message").is_none());
    }
}
