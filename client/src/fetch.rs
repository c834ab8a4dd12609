use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use edumap_shared::{CountyShape, EducationRecord, Topology, county_shapes};

pub const EDUCATION_DATA_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json";
pub const COUNTY_TOPOLOGY_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json";

/// Fetch the per-county attainment records.
pub async fn fetch_education() -> Result<Vec<EducationRecord>, String> {
    let resp = gloo_net::http::Request::get(EDUCATION_DATA_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Vec<EducationRecord>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Fetch the county topology.
pub async fn fetch_topology() -> Result<Topology, String> {
    let resp = gloo_net::http::Request::get(COUNTY_TOPOLOGY_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Topology>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Load both datasets in order (attainment first, then geometry), decode the
/// topology into county paths, and publish everything to the signals. Any
/// failure aborts the load; nothing retries.
pub fn load_datasets(
    education: RwSignal<Vec<EducationRecord>>,
    counties: RwSignal<Vec<CountyShape>>,
    load_error: RwSignal<Option<String>>,
) {
    spawn_local(async move {
        let records = match fetch_education().await {
            Ok(records) => records,
            Err(message) => {
                report_load_failure(load_error, message);
                return;
            }
        };

        let topology = match fetch_topology().await {
            Ok(topology) => topology,
            Err(message) => {
                report_load_failure(load_error, message);
                return;
            }
        };

        let shapes = match county_shapes(&topology) {
            Ok(shapes) => shapes,
            Err(e) => {
                report_load_failure(load_error, format!("county geometry: {e}"));
                return;
            }
        };

        education.set(records);
        counties.set(shapes);
    });
}

fn report_load_failure(load_error: RwSignal<Option<String>>, message: String) {
    web_sys::console::warn_1(&format!("dataset load failed: {message}").into());
    load_error.set(Some(message));
}
