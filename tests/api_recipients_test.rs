//! Integration tests for the compose-UI recipient listing
mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::util::ServiceExt;

    use crate::test_utils::{MEMBER, OWNER, SOLO, body_json, get, test_app};

    #[tokio::test]
    async fn it_lists_accepted_members_for_the_owner() {
        let fixture = test_app().await;

        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/recipients", OWNER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;

        let recipients = body["recipients"].as_array().unwrap();
        let mut ids: Vec<&str> = recipients
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        ids.sort();
        // Accepted members only: the pending invite and the actor are excluded
        assert_eq!(ids, vec!["acct-ben", "acct-cam"]);
    }

    #[tokio::test]
    async fn it_includes_the_owner_for_a_team_member() {
        let fixture = test_app().await;

        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/recipients", MEMBER))
            .await
            .unwrap();
        let body = body_json(response.into_body()).await;

        let recipients = body["recipients"].as_array().unwrap();
        let mut ids: Vec<&str> = recipients
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["acct-ava", "acct-cam"]);
    }

    #[tokio::test]
    async fn it_returns_an_empty_list_without_a_team() {
        let fixture = test_app().await;

        let response = fixture
            .app
            .clone()
            .oneshot(get("/api/recipients", SOLO))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.into_body()).await;
        assert_eq!(body["recipients"].as_array().unwrap().len(), 0);
    }
}
