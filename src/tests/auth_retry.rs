// These tests run an AuthenticatedClient against mock vendors and check:
//  - no login happens before the first request
//  - a 401/403 is recovered with exactly one re-login and one replay
//  - a second rejection surfaces as AuthFailed
//  - concurrent callers share a single login

#[cfg(test)]
mod test {

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use http::StatusCode;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;
    use tokio::task::JoinSet;

    use crate::client::ApiRequest;
    use crate::errors::VendorError;
    use crate::tests::common::{build_reqwest_client, iptv_auth, spawn_axum, vendor_client, IPTV_LOGIN_PATH};
    use crate::utils::constants::SERVICE_IPTV;

    #[tokio::test]
    async fn no_login_until_first_request() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path(IPTV_LOGIN_PATH);
                then.status(200).json_body(json!({"token": "tok-1", "expires_in": 3600}));
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/resource").header("authorization", "Bearer tok-1");
                then.status(200).body("{}");
            })
            .await;

        let client = vendor_client(SERVICE_IPTV, &server.base_url(), iptv_auth(), &build_reqwest_client());
        assert_eq!(login.hits_async().await, 0);

        client.execute(&ApiRequest::get("/resource")).await.unwrap();
        client.execute(&ApiRequest::get("/resource")).await.unwrap();

        assert_eq!(login.hits_async().await, 1);
        assert_eq!(resource.hits_async().await, 2);
        assert_eq!(client.cache().get().await.unwrap().token, "tok-1");
    }

    #[tokio::test]
    async fn second_rejection_is_auth_failed() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path(IPTV_LOGIN_PATH);
                then.status(200).json_body(json!({"token": "tok-1"}));
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/resource");
                then.status(401).body("expired");
            })
            .await;

        let client = vendor_client(SERVICE_IPTV, &server.base_url(), iptv_auth(), &build_reqwest_client());
        let err = client.execute(&ApiRequest::get("/resource")).await.unwrap_err();

        assert_eq!(err, VendorError::AuthFailed { status: StatusCode::UNAUTHORIZED, body: "expired".into() });
        assert_eq!(resource.hits_async().await, 2);
        assert_eq!(login.hits_async().await, 2);
    }

    #[tokio::test]
    async fn zero_auth_retries_still_replays_once() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path(IPTV_LOGIN_PATH);
                then.status(200).json_body(json!({"token": "tok-1"}));
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/resource");
                then.status(403).body("forbidden");
            })
            .await;

        let client = vendor_client(SERVICE_IPTV, &server.base_url(), iptv_auth(), &build_reqwest_client())
            .with_auth_retries(0);
        let err = client.execute(&ApiRequest::get("/resource")).await.unwrap_err();

        assert!(err.is_auth_failed(), "{err:?}");
        assert_eq!(login.hits_async().await, 2);
        assert_eq!(resource.hits_async().await, 2);
    }

    #[tokio::test]
    async fn rejected_login_fails_without_touching_resource() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path(IPTV_LOGIN_PATH);
                then.status(401).body("bad credentials");
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/resource");
                then.status(200);
            })
            .await;

        let client = vendor_client(SERVICE_IPTV, &server.base_url(), iptv_auth(), &build_reqwest_client());
        let err = client.execute(&ApiRequest::get("/resource")).await.unwrap_err();

        assert!(err.is_auth_failed(), "{err:?}");
        assert_eq!(login.hits_async().await, 1);
        assert_eq!(resource.hits_async().await, 0);
    }

    #[tokio::test]
    async fn server_errors_are_returned_without_relogin() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path(IPTV_LOGIN_PATH);
                then.status(200).json_body(json!({"token": "tok-1"}));
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/resource");
                then.status(500).body("boom");
            })
            .await;

        let client = vendor_client(SERVICE_IPTV, &server.base_url(), iptv_auth(), &build_reqwest_client());
        let response = client.execute(&ApiRequest::get("/resource")).await.unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(login.hits_async().await, 1);
        assert_eq!(resource.hits_async().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn rejection_then_success_replays_with_new_token() {
        // login hands out tok-1, tok-2, ...; only tok-2 is accepted
        let logins = Arc::new(AtomicUsize::new(0));
        let logins_clone = logins.clone();
        let trials = Arc::new(AtomicUsize::new(0));
        let trials_clone = trials.clone();

        let router = Router::new()
            .route(
                IPTV_LOGIN_PATH,
                post(move || {
                    let c = logins_clone.clone();
                    async move {
                        let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                        Json(json!({"token": format!("tok-{}", n), "expires_in": 3600}))
                    }
                }),
            )
            .route(
                "/lines/test",
                post(move |headers: HeaderMap| {
                    let c = trials_clone.clone();
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default();
                        if auth == "Bearer tok-2" {
                            (StatusCode::CREATED, json!({"username": "u1", "password": "p1"}).to_string())
                        } else {
                            (StatusCode::FORBIDDEN, "token expired".to_owned())
                        }
                    }
                }),
            );
        let (handle, addr) = spawn_axum(router).await;

        let client =
            vendor_client(SERVICE_IPTV, &format!("http://{}", addr), iptv_auth(), &build_reqwest_client());
        let response = client
            .execute(&ApiRequest::post_json("/lines/test", json!({"notes": "1234"})))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(logins.load(Ordering::SeqCst), 2);
        assert_eq!(trials.load(Ordering::SeqCst), 2);
        assert_eq!(client.cache().get().await.unwrap().token, "tok-2");

        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_share_one_login() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path(IPTV_LOGIN_PATH);
                then.status(200)
                    .delay(std::time::Duration::from_millis(100))
                    .json_body(json!({"token": "tok-1", "expires_in": 3600}));
            })
            .await;
        let resource = server
            .mock_async(|when, then| {
                when.method(GET).path("/resource");
                then.status(200);
            })
            .await;

        let client = Arc::new(vendor_client(SERVICE_IPTV, &server.base_url(), iptv_auth(), &build_reqwest_client()));
        let mut set = JoinSet::new();
        for _ in 0..8 {
            let client = client.clone();
            set.spawn(async move { client.execute(&ApiRequest::get("/resource")).await });
        }
        while let Some(joined) = set.join_next().await {
            assert_eq!(joined.unwrap().unwrap().status, StatusCode::OK);
        }

        assert_eq!(login.hits_async().await, 1);
        assert_eq!(resource.hits_async().await, 8);
    }

    #[tokio::test]
    async fn invalidated_cache_forces_login() {
        let server = MockServer::start_async().await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path(IPTV_LOGIN_PATH);
                then.status(200).json_body(json!({"token": "tok-1", "expires_in": 3600}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/resource");
                then.status(200);
            })
            .await;

        let client = vendor_client(SERVICE_IPTV, &server.base_url(), iptv_auth(), &build_reqwest_client());
        client.execute(&ApiRequest::get("/resource")).await.unwrap();
        client.cache().invalidate().await;
        client.execute(&ApiRequest::get("/resource")).await.unwrap();

        assert_eq!(login.hits_async().await, 2);
    }
}
