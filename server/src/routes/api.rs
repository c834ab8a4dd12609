use std::fmt::Write as _;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (education_records, county_geometries, ready, refreshed_at) = {
        let datasets = state.datasets.read().await;
        (
            datasets.education_records,
            datasets.county_geometries,
            datasets.ready(),
            datasets.refreshed_at.map(|t| t.to_rfc3339()),
        )
    };
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "education_records": education_records,
        "county_geometries": county_geometries,
        "datasets_ready": ready,
        "refreshed_at": refreshed_at,
        "observability": {
            "dataset_refreshes_total": observability.dataset_refreshes_total,
            "upstream_fetch_failures_total": observability.upstream_fetch_failures_total,
            "data_requests_total": observability.data_requests_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (education_records, county_geometries, ready) = {
        let datasets = state.datasets.read().await;
        (
            datasets.education_records,
            datasets.county_geometries,
            datasets.ready(),
        )
    };
    let observability = state.observability.snapshot();

    let body =
        render_prometheus_metrics(education_records, county_geometries, ready, observability);

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    education_records: usize,
    county_geometries: usize,
    datasets_ready: bool,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP edumap_education_records Number of attainment records in the mirrored dataset."
    );
    let _ = writeln!(body, "# TYPE edumap_education_records gauge");
    let _ = writeln!(body, "edumap_education_records {education_records}");

    let _ = writeln!(
        body,
        "# HELP edumap_county_geometries Number of county geometries decoded from the mirrored topology."
    );
    let _ = writeln!(body, "# TYPE edumap_county_geometries gauge");
    let _ = writeln!(body, "edumap_county_geometries {county_geometries}");

    let _ = writeln!(
        body,
        "# HELP edumap_datasets_ready Whether both datasets are mirrored and servable (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE edumap_datasets_ready gauge");
    let _ = writeln!(body, "edumap_datasets_ready {}", u8::from(datasets_ready));

    let _ = writeln!(
        body,
        "# HELP edumap_dataset_refreshes_total Total successful dataset refreshes."
    );
    let _ = writeln!(body, "# TYPE edumap_dataset_refreshes_total counter");
    let _ = writeln!(
        body,
        "edumap_dataset_refreshes_total {}",
        observability.dataset_refreshes_total
    );

    let _ = writeln!(
        body,
        "# HELP edumap_upstream_fetch_failures_total Total failed upstream dataset fetches."
    );
    let _ = writeln!(body, "# TYPE edumap_upstream_fetch_failures_total counter");
    let _ = writeln!(
        body,
        "edumap_upstream_fetch_failures_total {}",
        observability.upstream_fetch_failures_total
    );

    let _ = writeln!(
        body,
        "# HELP edumap_data_requests_total Total requests served by the dataset mirror."
    );
    let _ = writeln!(body, "# TYPE edumap_data_requests_total counter");
    let _ = writeln!(
        body,
        "edumap_data_requests_total {}",
        observability.data_requests_total
    );

    body
}

pub(crate) fn dataset_etag(name: &str, version: u64) -> String {
    format!("\"{name}-{version}\"")
}

pub(crate) fn json_bytes_response(
    body: Bytes,
    cache_control: &'static str,
    etag: Option<&str>,
) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

pub(crate) fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

pub(crate) fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::{HeaderMap, HeaderValue, header};

    use super::{dataset_etag, if_none_match_matches, render_prometheus_metrics};
    use crate::state::{AppState, ObservabilitySnapshot};

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

    #[test]
    fn metrics_output_contains_prometheus_help_type_and_values() {
        let observability = ObservabilitySnapshot {
            dataset_refreshes_total: 12,
            upstream_fetch_failures_total: 3,
            data_requests_total: 99,
        };

        let metrics = render_prometheus_metrics(3142, 3109, true, observability);

        assert!(metrics.contains("# HELP edumap_education_records"));
        assert!(metrics.contains("# TYPE edumap_dataset_refreshes_total counter"));
        assert!(metrics.contains("edumap_education_records 3142"));
        assert!(metrics.contains("edumap_county_geometries 3109"));
        assert!(metrics.contains("edumap_datasets_ready 1"));
        assert!(metrics.contains("edumap_dataset_refreshes_total 12"));
        assert!(metrics.contains("edumap_upstream_fetch_failures_total 3"));
        assert!(metrics.contains("edumap_data_requests_total 99"));
    }

    #[test]
    fn dataset_etag_is_quoted_and_versioned() {
        assert_eq!(dataset_etag("education", 7), "\"education-7\"");
        assert_eq!(dataset_etag("counties", 0), "\"counties-0\"");
    }

    #[test]
    fn if_none_match_handles_weak_tags_lists_and_star() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("W/\"education-3\", \"counties-9\""),
        );
        assert!(if_none_match_matches(&headers, "\"education-3\""));
        assert!(if_none_match_matches(&headers, "\"counties-9\""));
        assert!(!if_none_match_matches(&headers, "\"education-4\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match_matches(&headers, "\"anything-1\""));
    }

    #[test]
    fn absent_if_none_match_never_matches() {
        let headers = HeaderMap::new();
        assert!(!if_none_match_matches(&headers, "\"education-1\""));
    }

    #[tokio::test]
    async fn health_and_metrics_expose_expected_contract() {
        let state = AppState::new();
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");

        assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("ok"));
        assert_eq!(
            health.get("datasets_ready").and_then(|v| v.as_bool()),
            Some(false)
        );
        assert_eq!(
            health.get("education_records").and_then(|v| v.as_u64()),
            Some(0)
        );
        assert!(
            health
                .get("observability")
                .and_then(|v| v.get("dataset_refreshes_total"))
                .and_then(|v| v.as_u64())
                .is_some()
        );

        let metrics = client
            .get(format!("{base_url}/api/metrics"))
            .send()
            .await
            .expect("metrics request")
            .error_for_status()
            .expect("metrics status")
            .text()
            .await
            .expect("parse metrics text");

        assert!(metrics.contains("# TYPE edumap_dataset_refreshes_total counter"));
        assert!(metrics.contains("# TYPE edumap_datasets_ready gauge"));
        assert!(metrics.contains("edumap_datasets_ready 0"));
        assert!(metrics.contains("edumap_data_requests_total 0"));

        server_handle.abort();
        let _ = server_handle.await;
    }
}
