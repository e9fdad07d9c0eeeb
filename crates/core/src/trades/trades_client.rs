//! HTTP client for the external trade ledger and trade server.
//!
//! `GET  {base}/accounts/{account}/trades` returns the ledger, either as a bare
//! array or wrapped in `data`, `trades` or `items`.
//! `POST {base}/accounts/{account}/trades` submits one order.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::trades_constants::IDEMPOTENCY_KEY_HEADER;
use super::trades_errors::{LedgerError, SubmissionError};
use super::trades_model::{RawTradeRecord, TradeAcknowledgement, TradeOrder};
use super::trades_traits::{TradeLedgerSource, TradeSubmitter};

/// Envelope keys that may wrap the record array.
const ENVELOPE_KEYS: &[&str] = &["data", "trades", "items"];

pub struct LedgerApiClient {
    client: Client,
    base_url: String,
}

impl LedgerApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn trades_url(&self, account_id: &str) -> String {
        format!(
            "{}/accounts/{}/trades",
            self.base_url,
            urlencoding::encode(account_id)
        )
    }
}

#[async_trait]
impl TradeLedgerSource for LedgerApiClient {
    async fn fetch_trades(&self, account_id: &str) -> Result<Vec<RawTradeRecord>, LedgerError> {
        let url = self.trades_url(account_id);
        debug!("Fetching trade ledger: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(LedgerError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_ledger_body(&body)
    }
}

#[async_trait]
impl TradeSubmitter for LedgerApiClient {
    async fn submit_order(
        &self,
        account_id: &str,
        order: &TradeOrder,
        idempotency_key: &str,
    ) -> Result<TradeAcknowledgement, SubmissionError> {
        let url = self.trades_url(account_id);
        debug!("Submitting {} order for {} to {}", order.side.as_str(), order.symbol, url);

        let response = self
            .client
            .post(&url)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(order)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            warn!("Trade server rejected order {}: {}", idempotency_key, message);
            return Err(SubmissionError::ServerRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parse_acknowledgement(&body, idempotency_key))
    }
}

pub(crate) fn parse_ledger_body(body: &str) -> Result<Vec<RawTradeRecord>, LedgerError> {
    let value: Value = serde_json::from_str(body).map_err(|e| LedgerError::Parse(e.to_string()))?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut envelope) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match envelope.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| LedgerError::Parse("no trade array in response".to_string()))?,
        other => {
            return Err(LedgerError::Parse(format!(
                "expected an array of trades, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(records.into_iter().map(RawTradeRecord::from_value).collect())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AckBody {
    #[serde(alias = "orderId", alias = "order_id")]
    id: Option<Value>,
    status: Option<String>,
    message: Option<String>,
}

pub(crate) fn parse_acknowledgement(body: &str, idempotency_key: &str) -> TradeAcknowledgement {
    let ack: AckBody = serde_json::from_str(body).unwrap_or_default();
    let order_id = ack.id.and_then(|id| match id {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    TradeAcknowledgement {
        order_id,
        client_order_id: idempotency_key.to_string(),
        status: ack
            .status
            .map(|s| s.to_uppercase())
            .unwrap_or_else(|| "ACCEPTED".to_string()),
        message: ack.message,
        submitted_at: Utc::now(),
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .or_else(|| Some(body.trim().to_string()).filter(|s| !s.is_empty()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array_body() {
        let records = parse_ledger_body(r#"[{"id":"1"},{"id":"2"}]"#).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_enveloped_body() {
        let records = parse_ledger_body(r#"{"total":1,"trades":[{"id":"1"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
        let records = parse_ledger_body(r#"{"data":[]}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_unusable_body_is_a_ledger_error() {
        assert!(matches!(parse_ledger_body("not json"), Err(LedgerError::Parse(_))));
        assert!(matches!(parse_ledger_body(r#"{"ok":true}"#), Err(LedgerError::Parse(_))));
        let err = parse_ledger_body("42").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_acknowledgement_parsing() {
        let ack = parse_acknowledgement(r#"{"orderId":981,"status":"accepted"}"#, "key-1");
        assert_eq!(ack.order_id.as_deref(), Some("981"));
        assert_eq!(ack.status, "ACCEPTED");
        assert_eq!(ack.client_order_id, "key-1");

        let empty = parse_acknowledgement("", "key-2");
        assert_eq!(empty.order_id, None);
        assert_eq!(empty.status, "ACCEPTED");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":"market closed"}"#).as_deref(),
            Some("market closed")
        );
        assert_eq!(error_message(" plain text ").as_deref(), Some("plain text"));
        assert_eq!(error_message(""), None);
    }
}
