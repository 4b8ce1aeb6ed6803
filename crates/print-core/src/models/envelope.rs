use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PRINT_API_ID: &str = "api.print";
pub const HEALTH_API_ID: &str = "api.health";
pub const API_VERSION: &str = "1.0";

/// How long a published PDF URL is advertised as valid, in seconds.
pub const PDF_URL_TTL_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    Success,
    ClientError,
    ServerError,
}

impl ResponseCode {
    pub fn http_status(self) -> u16 {
        match self {
            ResponseCode::Success => 200,
            ResponseCode::ClientError => 400,
            ResponseCode::ServerError => 500,
        }
    }
}

/// The body every endpoint answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub id: String,
    pub ver: String,
    pub ts: i64,
    pub params: Map<String, Value>,
    pub response_code: ResponseCode,
    pub result: Map<String, Value>,
}

impl ResponseEnvelope {
    fn new(
        id: &str,
        response_code: ResponseCode,
        params: Map<String, Value>,
        result: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.to_string(),
            ver: API_VERSION.to_string(),
            ts: jiff::Timestamp::now().as_millisecond(),
            params,
            response_code,
            result,
        }
    }

    pub fn success(id: &str, result: Map<String, Value>) -> Self {
        Self::new(id, ResponseCode::Success, Map::new(), result)
    }

    pub fn client_error(id: &str, params: Map<String, Value>) -> Self {
        Self::new(id, ResponseCode::ClientError, params, Map::new())
    }

    /// Internal failures carry no detail for the caller.
    pub fn server_error(id: &str) -> Self {
        Self::new(id, ResponseCode::ServerError, Map::new(), Map::new())
    }

    /// `{ pdfUrl, ttl }` result of a successful print.
    pub fn pdf_published(id: &str, pdf_url: &str) -> Self {
        let mut result = Map::new();
        result.insert("pdfUrl".to_string(), Value::String(pdf_url.to_string()));
        result.insert("ttl".to_string(), Value::from(PDF_URL_TTL_SECS));
        Self::success(id, result)
    }
}
