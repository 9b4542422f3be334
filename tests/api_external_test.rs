//! Integration tests for external sends and the delivery side-channel
mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use mockito::Matcher;
    use serde_json::json;
    use tower::util::ServiceExt;

    use crate::test_utils::{MEMBER, OWNER, body_json, get, post_json, test_app, test_app_with_mailer};

    #[tokio::test]
    async fn it_delivers_external_messages_through_the_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            // Replies must go to the human sender, not the system address
            .match_body(Matcher::PartialJson(json!({
                "reply_to": "ava@example.com",
                "to": ["unknown@example.com"],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"email_123"}"#)
            .create_async()
            .await;

        let fixture = test_app_with_mailer(&server.url(), Some("test-key")).await;

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/external",
                OWNER,
                json!({
                    "to_email": "unknown@example.com",
                    "subject": "Your shared stream",
                    "body": "Here is the link",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["delivered"], true);
        let message = &body["message"];
        assert_eq!(message["type"], "external");
        assert_eq!(message["to_email"], "unknown@example.com");
        assert_eq!(message["email_status"], "sent");
        assert_eq!(message["email_id"], "email_123");
        // The address matches no account, so there is no linked recipient
        assert!(message.get("recipient_id").is_none());

        mock.assert_async().await;

        // Visible in the sender's sent folder with the terminal status
        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/messages?folder=sent&type=external", OWNER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["messages"][0]["email_status"], "sent");
    }

    #[tokio::test]
    async fn it_saves_the_message_when_the_provider_is_unconfigured() {
        // No API key configured: delivery is a deployment-time no-op
        let fixture = test_app().await;

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/external",
                OWNER,
                json!({
                    "to_email": "unknown@example.com",
                    "subject": "Hello",
                    "body": "Out there",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["delivered"], false);
        assert_eq!(body["message"]["email_status"], "failed");
        assert!(body["message"].get("recipient_id").is_none());

        // Saved, not delivered: still in the sent folder
        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/messages?folder=sent", OWNER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn it_saves_the_message_when_the_provider_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let fixture = test_app_with_mailer(&server.url(), Some("test-key")).await;

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/external",
                OWNER,
                json!({
                    "to_email": "unknown@example.com",
                    "subject": "Hello",
                    "body": "Out there",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["delivered"], false);
        assert_eq!(body["message"]["email_status"], "failed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn it_links_known_accounts_and_notifies_them() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/emails")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"email_456"}"#)
            .create_async()
            .await;

        let fixture = test_app_with_mailer(&server.url(), Some("test-key")).await;

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/external",
                OWNER,
                json!({
                    "to_email": "ben@example.com",
                    "subject": "Outside the app",
                    "body": "Sent by email",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["message"]["recipient_id"], MEMBER);

        // The linked account sees it in their inbox and unread count
        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/messages/unread-count", MEMBER))
            .await
            .unwrap();
        let counts = body_json(response.into_body()).await;
        assert_eq!(counts["external"], 1);
        assert_eq!(counts["internal"], 0);

        // And gets an in-app notification flagged as external
        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/notifications", MEMBER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        let notification = &body["notifications"][0];
        assert_eq!(notification["kind"], "message.external");
        assert_eq!(notification["metadata"]["isExternal"], true);
    }

    #[tokio::test]
    async fn it_validates_external_send_fields() {
        let fixture = test_app().await;

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/external",
                OWNER,
                json!({ "to_email": "", "subject": "Hello", "body": "x" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/external",
                OWNER,
                json!({ "to_email": "not-an-address", "subject": "Hello", "body": "x" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/external",
                OWNER,
                json!({ "to_email": "a@b.com", "subject": "Hello", "body": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Nothing written for any rejected request
        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/messages?folder=sent", OWNER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["total"], 0);
    }
}
