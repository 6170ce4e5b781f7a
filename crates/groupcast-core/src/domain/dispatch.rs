//! Dispatch status and webhook payload

use serde::Serialize;
use serde_json::Value;

use super::group::ExternalGroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    #[default]
    Idle,
    Sending,
    Success,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Idle => "idle",
            DispatchStatus::Sending => "sending",
            DispatchStatus::Success => "success",
            DispatchStatus::Failed => "failed",
        }
    }
}

/// JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchPayload {
    pub group_ids: Vec<ExternalGroupId>,
    #[serde(flatten)]
    pub host: Option<HostPassthrough>,
}

/// Host context fields appended to the payload when running inside the host app.
///
/// `raw` is forwarded untouched; the other fields are lifted out of it so the receiver does
/// not have to dig for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostPassthrough {
    #[serde(rename = "telegramRaw")]
    pub raw: Value,
    #[serde(rename = "initData", skip_serializing_if = "Option::is_none")]
    pub init_data: Option<Value>,
    #[serde(rename = "initDataUnsafe", skip_serializing_if = "Option::is_none")]
    pub init_data_unsafe: Option<Value>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl DispatchPayload {
    pub fn new(group_ids: Vec<ExternalGroupId>, host: Option<HostPassthrough>) -> Self {
        Self { group_ids, host }
    }
}

impl HostPassthrough {
    pub fn from_raw(raw: Value) -> Self {
        let unsafe_data = present(raw.get("initDataUnsafe"));
        let lift = |key: &str| present(unsafe_data.as_ref().and_then(|d| d.get(key)));

        Self {
            init_data: present(raw.get("initData")),
            user_id: present(
                unsafe_data
                    .as_ref()
                    .and_then(|d| d.get("user"))
                    .and_then(|u| u.get("id")),
            ),
            callback_query: lift("callback_query"),
            message: lift("message"),
            init_data_unsafe: unsafe_data.clone(),
            raw,
        }
    }
}

/// Null, `false` and empty strings count as absent.
fn present(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(other.clone()),
    }
}
