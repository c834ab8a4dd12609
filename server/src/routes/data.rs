use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::routes::api::{
    dataset_etag, if_none_match_matches, json_bytes_response, not_modified_response,
};
use crate::state::AppState;

/// Mirrored payloads change at most once per refresh interval, so clients may
/// cache for a few minutes and revalidate with the version-based ETag after.
const DATA_CACHE_CONTROL: &str = "public, max-age=300";

pub async fn education_json(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.observability.record_data_request();
    let (body, version) = {
        let datasets = state.datasets.read().await;
        (datasets.education_json.clone(), datasets.version)
    };
    serve_dataset("education", body, version, &headers)
}

pub async fn counties_json(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.observability.record_data_request();
    let (body, version) = {
        let datasets = state.datasets.read().await;
        (datasets.counties_json.clone(), datasets.version)
    };
    serve_dataset("counties", body, version, &headers)
}

fn serve_dataset(
    name: &str,
    body: Option<Arc<Bytes>>,
    version: u64,
    headers: &HeaderMap,
) -> Response {
    // Until the first upstream refresh lands there is nothing to serve.
    let Some(body) = body else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    let etag = dataset_etag(name, version);
    if if_none_match_matches(headers, &etag) {
        return not_modified_response(DATA_CACHE_CONTROL, Some(&etag));
    }
    json_bytes_response(body.as_ref().clone(), DATA_CACHE_CONTROL, Some(&etag))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::http::header;
    use bytes::Bytes;

    use crate::state::AppState;

    const EDUCATION_BODY: &str =
        r#"[{"fips":1001,"state":"AL","area_name":"Autauga County","bachelorsOrHigher":23.2}]"#;
    const COUNTIES_BODY: &str = r#"{"type":"Topology","arcs":[],"objects":{}}"#;

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    async fn seeded_state() -> AppState {
        let state = AppState::new();
        {
            let mut datasets = state.datasets.write().await;
            datasets.education_json = Some(Arc::new(Bytes::from_static(EDUCATION_BODY.as_bytes())));
            datasets.counties_json = Some(Arc::new(Bytes::from_static(COUNTIES_BODY.as_bytes())));
            datasets.education_records = 1;
            datasets.county_geometries = 0;
            datasets.refreshed_at = Some(chrono::Utc::now());
            datasets.version = 3;
        }
        state
    }

    #[tokio::test]
    async fn mirrored_education_data_is_served_with_etag() {
        let state = seeded_state().await;
        let (addr, server_handle) = spawn_test_server(state).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{addr}/data/for_user_education.json"))
            .send()
            .await
            .expect("education request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(
            response
                .headers()
                .get(header::ETAG)
                .and_then(|v| v.to_str().ok()),
            Some("\"education-3\"")
        );
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=300")
        );
        let body = response.text().await.expect("education body");
        assert_eq!(body, EDUCATION_BODY);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn matching_if_none_match_returns_not_modified() {
        let state = seeded_state().await;
        let (addr, server_handle) = spawn_test_server(state).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{addr}/data/counties.json"))
            .header(header::IF_NONE_MATCH, "\"counties-3\"")
            .send()
            .await
            .expect("counties request");

        assert_eq!(response.status(), reqwest::StatusCode::NOT_MODIFIED);
        assert_eq!(
            response
                .headers()
                .get(header::ETAG)
                .and_then(|v| v.to_str().ok()),
            Some("\"counties-3\"")
        );

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn stale_if_none_match_gets_fresh_body() {
        let state = seeded_state().await;
        let (addr, server_handle) = spawn_test_server(state).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{addr}/data/counties.json"))
            .header(header::IF_NONE_MATCH, "\"counties-2\"")
            .send()
            .await
            .expect("counties request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body = response.text().await.expect("counties body");
        assert_eq!(body, COUNTIES_BODY);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn unmirrored_dataset_is_unavailable() {
        let state = AppState::new();
        let (addr, server_handle) = spawn_test_server(state).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{addr}/data/for_user_education.json"))
            .send()
            .await
            .expect("education request");

        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        server_handle.abort();
        let _ = server_handle.await;
    }
}
