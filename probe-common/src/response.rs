//! The fixed invocation response.
//!
//! Both probes return the same literal 200 on success no matter what the
//! queries returned; results are only logged. Failures never produce a
//! response object at all, they propagate to the runtime as faults.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResponse {
    #[serde(rename = "statusCode")]
    pub status_code: String,
    pub body: String,
}

impl ProbeResponse {
    /// The one response the probes ever return.
    pub fn success() -> Self {
        Self {
            status_code: "200".to_string(),
            body: serde_json::json!({ "test": "value" }).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_to_the_literal_contract() {
        let json = serde_json::to_string(&ProbeResponse::success()).unwrap();
        assert_eq!(json, r#"{"statusCode":"200","body":"{\"test\":\"value\"}"}"#);
    }

    #[test]
    fn body_is_itself_encoded_json() {
        let response = ProbeResponse::success();
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["test"], "value");
    }
}
