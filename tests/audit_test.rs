//! Tests for the fire-and-forget audit recorder
mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{Router, routing::get};
    use serde_json::json;
    use tower::util::ServiceExt;

    use shareflow::audit::{self, AuditAction, ClientFingerprint};

    use crate::test_utils::{OWNER, body_json, test_app};

    #[tokio::test]
    async fn it_records_an_action_with_fingerprint_and_metadata() {
        let fixture = test_app().await;

        let fingerprint = ClientFingerprint {
            ip: Some("203.0.113.7".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };
        audit::record(
            &fixture.db,
            OWNER,
            AuditAction::TeamInvite,
            Some(json!({ "invitee": "dee@example.com" })),
            &fingerprint,
        )
        .await;

        let entries = audit::entries_for_actor(&fixture.db, OWNER, 10)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "team_invite");
        assert_eq!(entries[0].ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(entries[0].user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(
            entries[0].metadata.as_ref().unwrap()["invitee"],
            "dee@example.com"
        );
    }

    #[tokio::test]
    async fn it_swallows_recording_failures() {
        let fixture = test_app().await;

        fixture
            .db
            .call(|conn| {
                conn.execute_batch("DROP TABLE audit_log")?;
                Ok(())
            })
            .await
            .unwrap();

        // Recording into a broken store must not panic or error out
        audit::record(
            &fixture.db,
            OWNER,
            AuditAction::SecurityLogin,
            None,
            &ClientFingerprint::default(),
        )
        .await;
    }

    async fn fingerprint_handler(fingerprint: ClientFingerprint) -> axum::Json<serde_json::Value> {
        axum::Json(json!({
            "ip": fingerprint.ip,
            "user_agent": fingerprint.user_agent,
        }))
    }

    fn fingerprint_app() -> Router {
        Router::new().route("/fp", get(fingerprint_handler))
    }

    #[tokio::test]
    async fn it_prefers_the_first_forwarded_for_hop() {
        let response = fingerprint_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/fp")
                    .header("x-forwarded-for", "198.51.100.4, 203.0.113.9")
                    .header("x-real-ip", "192.0.2.1")
                    .header("user-agent", "test-agent")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["ip"], "198.51.100.4");
        assert_eq!(body["user_agent"], "test-agent");
    }

    #[tokio::test]
    async fn it_falls_back_to_the_real_ip_header() {
        let response = fingerprint_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/fp")
                    .header("x-real-ip", "192.0.2.1")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["ip"], "192.0.2.1");
        assert!(body["user_agent"].is_null());
    }

    #[tokio::test]
    async fn it_yields_nulls_when_nothing_identifies_the_client() {
        let response = fingerprint_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/fp")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;
        assert!(body["ip"].is_null());
        assert!(body["user_agent"].is_null());
    }
}
