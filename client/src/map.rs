use leptos::prelude::*;

use edumap_shared::{CountyShape, EducationRecord, fill_for, find_record};

use crate::format::number_text;
use crate::legend::Legend;

/// Drawing surface dimensions; the dataset's plane coordinates are
/// pre-projected into this box.
pub(crate) const SURFACE_WIDTH: u32 = 960;
pub(crate) const SURFACE_HEIGHT: u32 = 600;

/// The choropleth surface: one path per county, plus the legend overlay.
#[component]
pub fn CountyMap() -> impl IntoView {
    let counties: RwSignal<Vec<CountyShape>> = expect_context();

    view! {
        <svg width=SURFACE_WIDTH height=SURFACE_HEIGHT style="display: block; margin: 0 auto;">
            <g class="counties">
                <For
                    each=move || counties.get()
                    key=|shape| shape.id
                    children=move |shape| view! { <County shape=shape /> }
                />
            </g>
            <Legend />
        </svg>
    }
}

/// A single county path. Fill and the education attribute each run their own
/// record scan, so neither depends on the other's lookup.
#[component]
fn County(shape: CountyShape) -> impl IntoView {
    let education: RwSignal<Vec<EducationRecord>> = expect_context();
    let hovered: RwSignal<Option<u32>> = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();

    let fips = shape.id;

    let fill = move || education.with(|records| fill_for(find_record(records, fips)));
    let value = move || {
        education.with(|records| find_record(records, fips).map_or(0.0, |r| r.bachelors_or_higher))
    };

    let on_mouseover = move |e: web_sys::MouseEvent| {
        // Counties without a record never raise the tooltip.
        let matched = education.with_untracked(|records| find_record(records, fips).is_some());
        if !matched {
            return;
        }
        mouse_pos.set((e.client_x() as f64, e.client_y() as f64));
        if hovered.get_untracked() != Some(fips) {
            hovered.set(Some(fips));
        }
    };

    let on_mouseout = move |_| {
        if hovered.get_untracked().is_some() {
            hovered.set(None);
        }
    };

    view! {
        <path
            class="county"
            d=shape.path
            fill=fill
            data-fips=fips.to_string()
            data-education=move || number_text(value())
            on:mouseover=on_mouseover
            on:mouseout=on_mouseout
        />
    }
}
