use std::sync::Arc;

use bytes::Bytes;
use edumap_shared::{EducationRecord, Topology, county_shapes};
use tracing::{info, warn};

use crate::config;
use crate::state::AppState;

pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(config::dataset_refresh_interval());

    // Fetch immediately on startup, then at the configured refresh interval
    loop {
        interval.tick().await;

        match refresh_datasets(&state).await {
            Ok((records, geometries)) => {
                info!(
                    "mirrored education data ({records} records) and county topology ({geometries} geometries)"
                );
            }
            Err(e) => {
                state.observability.record_upstream_fetch_failure();
                warn!("dataset refresh failed: {e}");
            }
        }
    }
}

/// Fetches both upstream payloads, checks that they still parse, and swaps the
/// original bytes into the cache. The mirror serves upstream JSON verbatim;
/// parsing here only guards against publishing a payload the client would
/// choke on.
async fn refresh_datasets(state: &AppState) -> Result<(usize, usize), String> {
    let education_body = fetch_dataset(&state.http_client, config::EDUCATION_DATA_URL).await?;
    let education_records = validate_education(&education_body)?;
    let counties_body = fetch_dataset(&state.http_client, config::COUNTY_TOPOLOGY_URL).await?;
    let county_geometries = validate_topology(&counties_body)?;

    {
        let mut datasets = state.datasets.write().await;
        datasets.education_json = Some(Arc::new(education_body));
        datasets.counties_json = Some(Arc::new(counties_body));
        datasets.education_records = education_records;
        datasets.county_geometries = county_geometries;
        datasets.refreshed_at = Some(chrono::Utc::now());
        datasets.version += 1;
    }
    state.observability.record_dataset_refresh();

    Ok((education_records, county_geometries))
}

async fn fetch_dataset(client: &reqwest::Client, url: &str) -> Result<Bytes, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("fetch {url}: {e}"))?
        .error_for_status()
        .map_err(|e| format!("fetch {url}: {e}"))?;
    response
        .bytes()
        .await
        .map_err(|e| format!("read {url}: {e}"))
}

fn validate_education(body: &[u8]) -> Result<usize, String> {
    let records: Vec<EducationRecord> =
        serde_json::from_slice(body).map_err(|e| format!("education payload: {e}"))?;
    Ok(records.len())
}

fn validate_topology(body: &[u8]) -> Result<usize, String> {
    let topology: Topology =
        serde_json::from_slice(body).map_err(|e| format!("county topology payload: {e}"))?;
    let shapes = county_shapes(&topology).map_err(|e| format!("county topology: {e}"))?;
    Ok(shapes.len())
}
