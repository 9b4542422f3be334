//! Integration tests for the in-app notification surface
mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::util::ServiceExt;

    use crate::test_utils::{MEMBER, OWNER, body_json, get, post, post_json, test_app};

    #[tokio::test]
    async fn it_creates_a_notification_on_internal_send() {
        let fixture = test_app().await;

        let response = fixture
            .app
            .clone()
            .oneshot(post_json(
                "/api/messages/internal",
                OWNER,
                json!({ "target": MEMBER, "subject": "Ping", "body": "Got a sec?" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/notifications", MEMBER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        let notifications = body["notifications"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["kind"], "message.internal");
        assert_eq!(notifications[0]["title"], "New message from Ava Chen");
        assert_eq!(notifications[0]["body"], "Ping");
        assert_eq!(notifications[0]["seen"], false);

        // The sender got nothing
        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/notifications", OWNER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["notifications"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn it_marks_all_notifications_seen() {
        let fixture = test_app().await;

        for subject in ["One", "Two"] {
            let response = fixture
                .app
                .clone()
                .oneshot(post_json(
                    "/api/messages/internal",
                    OWNER,
                    json!({ "target": MEMBER, "subject": subject, "body": "x" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = fixture
            .app
            .clone()
            .oneshot(post("/api/notifications/seen", MEMBER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["updated"], 2);

        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/notifications", MEMBER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        for notification in body["notifications"].as_array().unwrap() {
            assert_eq!(notification["seen"], true);
        }

        // Marking again finds nothing unseen
        let response = fixture
            .app
            .clone()
            .oneshot(post("/api/notifications/seen", MEMBER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["updated"], 0);
    }
}
