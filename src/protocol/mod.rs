//! Messages exchanged between the per-tab arbitrator and each frame.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::ContextQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum FrameRequest {
    #[serde(rename = "DC_QUERY_CTX")]
    QueryContext,
    #[serde(rename = "DC_OPEN_FROM_CTX")]
    OpenFromContext { timestamp: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub ok: bool,
    pub has_context: bool,
    pub timestamp: u64,
    pub age_ms: u64,
}

impl QueryResponse {
    pub fn failed() -> Self {
        Self {
            ok: false,
            has_context: false,
            timestamp: 0,
            age_ms: 0,
        }
    }
}

impl From<ContextQuery> for QueryResponse {
    fn from(query: ContextQuery) -> Self {
        Self {
            ok: true,
            has_context: query.has_context,
            timestamp: query.timestamp,
            age_ms: query.age_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResponse {
    pub ok: bool,
    pub opened: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OpenResponse {
    pub fn opened() -> Self {
        Self {
            ok: true,
            opened: true,
            reason: None,
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        Self {
            ok: true,
            opened: false,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            opened: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameResponse {
    Query(QueryResponse),
    Open(OpenResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("frame {frame:?} is not reachable in tab {tab:?}")]
    UnknownFrame { tab: TabId, frame: FrameId },
    #[error("frame {frame:?} did not answer: {message}")]
    Delivery { frame: FrameId, message: String },
    #[error("frame {frame:?} answered {request:?} with an unexpected response")]
    UnexpectedResponse { frame: FrameId, request: FrameRequest },
}

/// Lists the frames that belong to a tab.
#[async_trait]
pub trait FrameDirectory: Send + Sync {
    async fn frames(&self, tab: TabId) -> Vec<FrameId>;
}

/// Delivers one request to one frame and resolves with its reply.
#[async_trait]
pub trait FrameTransport: Send + Sync {
    async fn send(
        &self,
        tab: TabId,
        frame: FrameId,
        request: FrameRequest,
    ) -> Result<FrameResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_command_tags_on_the_wire() {
        assert_eq!(
            serde_json::to_value(FrameRequest::QueryContext).expect("json"),
            serde_json::json!({ "cmd": "DC_QUERY_CTX" })
        );
        assert_eq!(
            serde_json::to_value(FrameRequest::OpenFromContext { timestamp: 42 }).expect("json"),
            serde_json::json!({ "cmd": "DC_OPEN_FROM_CTX", "timestamp": 42 })
        );
    }

    #[test]
    fn query_response_uses_camel_case_fields() {
        let response = QueryResponse::from(ContextQuery {
            has_context: true,
            timestamp: 10,
            age_ms: 3,
        });
        assert_eq!(
            serde_json::to_value(response).expect("json"),
            serde_json::json!({ "ok": true, "hasContext": true, "timestamp": 10, "ageMs": 3 })
        );
    }

    #[test]
    fn open_response_omits_missing_reason() {
        assert_eq!(
            serde_json::to_value(OpenResponse::opened()).expect("json"),
            serde_json::json!({ "ok": true, "opened": true })
        );
        let declined: OpenResponse =
            serde_json::from_str(r#"{ "ok": true, "opened": false, "reason": "no-target" }"#)
                .expect("parse");
        assert_eq!(declined, OpenResponse::declined("no-target"));
    }

    #[test]
    fn untagged_response_distinguishes_query_from_open() {
        let query: FrameResponse = serde_json::from_str(
            r#"{ "ok": true, "hasContext": false, "timestamp": 0, "ageMs": 0 }"#,
        )
        .expect("query");
        assert!(matches!(query, FrameResponse::Query(_)));
        let open: FrameResponse =
            serde_json::from_str(r#"{ "ok": true, "opened": true }"#).expect("open");
        assert!(matches!(open, FrameResponse::Open(_)));
    }
}
