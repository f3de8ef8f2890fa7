//! Inbound SMS webhook.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Form;
use compliance::{InboundMessage, ACK_RESPONSE};

use crate::error::Result;
use crate::state::AppState;

/// Receive an inbound SMS from the gateway.
///
/// Anything past field validation is acknowledged with 200 so the gateway
/// does not retry.
pub async fn receive(
    State(state): State<AppState>,
    Form(message): Form<InboundMessage>,
) -> Result<Response> {
    state.webhook.process(message).await?;
    Ok(ack())
}

fn ack() -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], ACK_RESPONSE).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use compliance::ComplianceEventType;

    use super::*;
    use crate::state::test_support::memory_state;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_stop_returns_xml_ack_and_opts_out() {
        let (state, store, _) = memory_state(None);

        let response = receive(
            State(state),
            Form(InboundMessage::new("5551234567", "STOP").with_message_sid("SM1")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");
        assert_eq!(body_text(response).await, ACK_RESPONSE);

        assert!(store.record("+15551234567").await.unwrap().opted_out);
        assert!(store
            .events()
            .await
            .iter()
            .any(|e| e.event_type == ComplianceEventType::OptOut));
    }

    #[tokio::test]
    async fn test_random_text_acked_without_mutation() {
        let (state, store, _) = memory_state(None);

        let response = receive(
            State(state),
            Form(InboundMessage::new("+15559876543", "RANDOM TEXT")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(store.record("+15559876543").await.is_none());
        assert!(store.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_body_is_bad_request() {
        let (state, _, _) = memory_state(None);

        let err = receive(
            State(state),
            Form(InboundMessage {
                from_number: Some("+15551234567".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_gateway_failure_still_acks() {
        let (state, _, gateway) = memory_state(None);
        gateway.set_fail(true);

        let response = receive(State(state), Form(InboundMessage::new("+15551234567", "HELP")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
