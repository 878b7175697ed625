//! HTTP routes called by the certificate management platform.

use crate::error::ConnectorError;
use avi_core::{
    DirectoryService, DiscoverCertificatesRequest, DiscoverCertificatesResponse,
    TestConnectionRequest, TestConnectionResponse,
};
use avi_discovery::DiscoveryService;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the connector router around a discovery service.
pub fn router<D>(service: DiscoveryService<D>) -> Router
where
    D: DirectoryService + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/testconnection", post(test_connection::<D>))
        .route("/v1/discovercertificates", post(discover_certificates::<D>))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(service))
}

async fn healthz() -> &'static str {
    "OK"
}

async fn test_connection<D: DirectoryService + 'static>(
    State(service): State<Arc<DiscoveryService<D>>>,
    payload: Result<Json<TestConnectionRequest>, JsonRejection>,
) -> Result<Json<TestConnectionResponse>, ConnectorError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "invalid test connection request");
        e
    })?;

    service.test_connection(&request.connection).await?;

    info!(
        address = %request.connection.hostname_or_address,
        port = request.connection.effective_port(),
        "success connecting to controller"
    );
    Ok(Json(TestConnectionResponse { result: true }))
}

async fn discover_certificates<D: DirectoryService + 'static>(
    State(service): State<Arc<DiscoveryService<D>>>,
    payload: Result<Json<DiscoverCertificatesRequest>, JsonRejection>,
) -> Result<Json<DiscoverCertificatesResponse>, ConnectorError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "invalid discovery request");
        e
    })?;

    let response = service.discover(&request).await.map_err(|e| {
        warn!(error = %e, "certificate discovery failed");
        e
    })?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use avi_core::{SslCertificate, SslKeyAndCertificate};
    use avi_discovery::InMemoryDirectory;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn certificate(name: &str) -> SslKeyAndCertificate {
        SslKeyAndCertificate {
            name: Some(name.to_string()),
            uuid: Some(format!("sslkeyandcertificate-{name}")),
            certificate_type: Some("SSL_CERTIFICATE_TYPE_SYSTEM".to_string()),
            certificate: Some(SslCertificate {
                certificate: Some(format!("PEM {name}")),
                not_after: Some("2099-01-01 00:00:00".to_string()),
                ..SslCertificate::default()
            }),
            ..SslKeyAndCertificate::default()
        }
    }

    fn app() -> Router {
        router(DiscoveryService::new(
            InMemoryDirectory::new()
                .with_password("secret")
                .with_certificate("admin", certificate("one"))
                .with_certificate("admin", certificate("two"))
                .with_certificate("admin", certificate("three")),
        ))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn connection(password: &str) -> Value {
        json!({
            "hostnameOrAddress": "avi.example.com",
            "port": 443,
            "username": "admin",
            "password": password
        })
    }

    #[tokio::test]
    async fn test_healthz() {
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_connection_success() {
        let body = json!({"connection": connection("secret")}).to_string();
        let response = app()
            .oneshot(post_json("/v1/testconnection", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value, json!({"result": true}));
    }

    #[tokio::test]
    async fn test_connection_failure_is_bad_request() {
        let body = json!({"connection": connection("wrong")}).to_string();
        let response = app()
            .oneshot(post_json("/v1/testconnection", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("authentication failed"));
    }

    #[tokio::test]
    async fn test_discovery_pages_through_budget() {
        let app = app();
        let body = json!({
            "connection": connection("secret"),
            "discovery": {
                "excludeExpiredCertificates": false,
                "excludeInactiveCertificates": false,
                "tenants": ""
            },
            "discoveryControl": {"maxResults": 2}
        });

        let response = app
            .clone()
            .oneshot(post_json("/v1/discovercertificates", &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let first: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(first["messages"].as_array().unwrap().len(), 2);
        assert_eq!(first["discoveryPage"]["discoveryType"], "admin");
        assert_eq!(
            first["discoveryPage"]["paginator"],
            r#"{"v":1,"page":1,"index":2}"#
        );
        assert_eq!(first["messages"][0]["certificate"], "PEM one");
        assert_eq!(first["messages"][0]["machineIdentities"], json!([]));

        let mut next = body;
        next["discoveryPage"] = first["discoveryPage"].clone();
        let response = app
            .oneshot(post_json("/v1/discovercertificates", &next.to_string()))
            .await
            .unwrap();

        let second: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(second["messages"].as_array().unwrap().len(), 1);
        assert_eq!(second["messages"][0]["certificate"], "PEM three");
        assert!(second["discoveryPage"].is_null());
    }

    #[tokio::test]
    async fn test_zero_budget_is_bad_request() {
        let body = json!({
            "connection": connection("secret"),
            "discoveryControl": {"maxResults": 0}
        });
        let response = app()
            .oneshot(post_json("/v1/discovercertificates", &body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("maxResults"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        for uri in ["/v1/discovercertificates", "/v1/testconnection"] {
            let response = app().oneshot(post_json(uri, "{not json")).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(body_text(response)
                .await
                .starts_with("failed to unmarshal json"));
        }
    }
}
