//! Outbound query response.

use serde::{Deserialize, Serialize};

/// The answer returned for every request, successful or degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub conversation_id: String,
    /// Ids of the agents (or `fallback`) that contributed.
    pub tools_used: Vec<String>,
    pub processing_time_ms: u64,
    pub success: bool,
}

impl QueryResponse {
    pub fn success(
        response: impl Into<String>,
        conversation_id: impl Into<String>,
        tools_used: Vec<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            response: response.into(),
            conversation_id: conversation_id.into(),
            tools_used,
            processing_time_ms,
            success: true,
        }
    }

    pub fn failure(
        response: impl Into<String>,
        conversation_id: impl Into<String>,
        tools_used: Vec<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            response: response.into(),
            conversation_id: conversation_id.into(),
            tools_used,
            processing_time_ms,
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_success_flag() {
        let ok = QueryResponse::success("answer", "c1", vec!["tariff_analysis".into()], 12);
        assert!(ok.success);
        let failed = QueryResponse::failure("sorry", "c1", vec![], 3);
        assert!(!failed.success);
        assert!(failed.tools_used.is_empty());
    }

    #[test]
    fn test_serializes_field_names() {
        let json = serde_json::to_value(QueryResponse::success("a", "c", vec![], 1)).unwrap();
        assert_eq!(json["conversation_id"], "c");
        assert_eq!(json["processing_time_ms"], 1);
        assert_eq!(json["success"], true);
    }
}
