//! HTTP message types for the FAQ backend. Client ↔ server JSON.

use serde::{Deserialize, Serialize};

/// Client → server: body of `POST /ask`.
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

impl<'a> AskRequest<'a> {
    pub fn new(question: &'a str) -> Self {
        Self { question }
    }
}

/// Server → client: answer to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub matched_question: Option<String>,
    pub confidence_score: f64,
}

/// One entry of the `GET /all` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: i64,
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// Server → client: `GET /` health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub message: String,
    pub status: String,
}

impl ServiceStatus {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_request_serializes_question_only() {
        let json = serde_json::to_string(&AskRequest::new("How do I pay?")).unwrap();
        assert_eq!(json, r#"{"question":"How do I pay?"}"#);
    }

    #[test]
    fn ask_response_accepts_null_matched_question() {
        let resp: AskResponse = serde_json::from_str(
            r#"{"answer":"Not sure.","matched_question":null,"confidence_score":0.12}"#,
        )
        .unwrap();
        assert_eq!(resp.matched_question, None);
        assert!((resp.confidence_score - 0.12).abs() < f64::EPSILON);
    }

    #[test]
    fn ask_response_rejects_missing_score() {
        let result: Result<AskResponse, _> = serde_json::from_str(r#"{"answer":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn faq_entry_parses_snapshot_item() {
        let entries: Vec<FaqEntry> = serde_json::from_str(
            r#"[{"id":1,"category":"Billing","question":"How do I pay?","answer":"By card."}]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "Billing");
    }

    #[test]
    fn service_status_online() {
        let status: ServiceStatus =
            serde_json::from_str(r#"{"message":"Welcome","status":"online"}"#).unwrap();
        assert!(status.is_online());
    }
}
