use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, header::HeaderMap};
use serde_json::{Value, json};

use crate::{
    data::{PaymentRequest, PaymentStatus, ProviderResponse},
    error::ProcessError,
    processor::PaymentProcessor,
    relay::{Relay, RelayOutcome, RelayRequest},
};

/// Sends payments to a single provider and, when configured, reports
/// callback outcomes to a status endpoint.
#[derive(Debug, Clone)]
pub struct ProviderProcessor {
    relay: Relay,
    provider_url: String,
    status_url: Option<String>,
    headers: HeaderMap,
}

impl ProviderProcessor {
    pub fn new(
        relay: Relay,
        provider_url: String,
        status_url: Option<String>,
        headers: HeaderMap,
    ) -> Self {
        Self {
            relay,
            provider_url,
            status_url,
            headers,
        }
    }
}

#[async_trait]
impl PaymentProcessor for ProviderProcessor {
    #[tracing::instrument(skip_all)]
    async fn initiate_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<ProviderResponse, ProcessError> {
        let req = RelayRequest::new(Method::POST, &self.provider_url)
            .with_headers(&self.headers)
            .with_body(request.0);

        let outcome = self.relay.execute(&req).await?;

        tracing::info!(
            success = outcome.is_success(),
            status = %outcome.envelope().status,
            "provider_initiate"
        );

        let res = outcome.into_envelope();

        Ok(ProviderResponse(decode_body(&res.body)))
    }

    #[tracing::instrument(skip(self))]
    async fn process_payment(
        &self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> Result<(), ProcessError> {
        let Some(url) = &self.status_url else {
            tracing::info!("status_update_not_forwarded");
            return Ok(());
        };

        let body = json!({
            "paymentId": payment_id,
            "status": status,
            "reportedAt": Utc::now(),
        });

        let req = RelayRequest::new(Method::POST, url)
            .with_headers(&self.headers)
            .with_body(body);

        match self.relay.execute(&req).await? {
            RelayOutcome::Success(_) => {
                tracing::info!("status_update_sent");
                Ok(())
            }
            RelayOutcome::ProviderError(res) => Err(ProcessError::Rejected {
                payment_id: payment_id.to_string(),
                status: res.status,
            }),
        }
    }
}

/// Provider bodies are passed back as json when they are json, as a plain
/// string when they are not, and as null when empty.
fn decode_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    use crate::error::RelayError;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, body_partial_json, header, method, path},
    };

    fn processor(server: &MockServer, status_url: Option<String>) -> ProviderProcessor {
        let mut headers = HeaderMap::new();
        headers.insert("x-merchant", "m-1".parse().expect("header"));

        ProviderProcessor::new(
            Relay::default(),
            format!("{}/pay", server.uri()),
            status_url,
            headers,
        )
    }

    #[tokio::test]
    async fn initiate_returns_provider_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/pay"))
            .and(header("x-merchant", "m-1"))
            .and(body_json(json!({"amount": 100})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let res = processor(&server, None)
            .initiate_payment(PaymentRequest(json!({"amount": 100})))
            .await
            .expect("initiate");

        assert_eq!(res.0, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn initiate_passes_provider_errors_through_the_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(402).set_body_json(json!({"error": "insufficient_funds"})),
            )
            .mount(&server)
            .await;

        let res = processor(&server, None)
            .initiate_payment(PaymentRequest(json!({"amount": 100})))
            .await
            .expect("initiate");

        assert_eq!(res.0, json!({"error": "insufficient_funds"}));
    }

    #[tokio::test]
    async fn initiate_fails_on_transport_error() {
        let processor = ProviderProcessor::new(
            Relay::default(),
            "http://127.0.0.1:1/pay".into(),
            None,
            HeaderMap::new(),
        );

        let err = processor
            .initiate_payment(PaymentRequest(json!({})))
            .await
            .expect_err("unreachable provider");

        assert!(matches!(err, ProcessError::Relay(RelayError::Transport(_))));
    }

    #[tokio::test]
    async fn status_update_is_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/status"))
            .and(body_partial_json(json!({"paymentId": "p1", "status": "FAILED"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        processor(&server, Some(format!("{}/status", server.uri())))
            .process_payment("p1", PaymentStatus::Failed)
            .await
            .expect("status update");
    }

    #[tokio::test]
    async fn rejected_status_update_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let err = processor(&server, Some(format!("{}/status", server.uri())))
            .process_payment("p1", PaymentStatus::Success)
            .await
            .expect_err("conflict");

        assert!(matches!(
            err,
            ProcessError::Rejected { ref payment_id, status }
                if payment_id == "p1" && status == StatusCode::CONFLICT
        ));
    }

    #[tokio::test]
    async fn status_update_without_url_is_only_logged() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        processor(&server, None)
            .process_payment("p1", PaymentStatus::Success)
            .await
            .expect("noop");
    }

    #[test]
    fn decodes_bodies() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(decode_body("plain"), json!("plain"));
    }
}
