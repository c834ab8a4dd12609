use leptos::prelude::*;

use edumap_shared::{CountyShape, EducationRecord, find_record};

use crate::fetch;
use crate::format::{county_label, number_text, percent_text};
use crate::map::CountyMap;

/// Offset between the cursor and the tooltip's top-left corner.
pub(crate) const TOOLTIP_OFFSET_X: f64 = 10.0;
pub(crate) const TOOLTIP_OFFSET_Y: f64 = -28.0;

/// Root component: owns the global signals, kicks off the dataset load, and
/// lays out the page around the map surface.
#[component]
pub fn App() -> impl IntoView {
    // Global signals
    let education: RwSignal<Vec<EducationRecord>> = RwSignal::new(Vec::new());
    let counties: RwSignal<Vec<CountyShape>> = RwSignal::new(Vec::new());
    let hovered: RwSignal<Option<u32>> = RwSignal::new(None);
    let mouse_pos: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);

    // Provide via context so children can access
    provide_context(education);
    provide_context(counties);
    provide_context(hovered);
    provide_context(mouse_pos);
    provide_context(load_error);

    // Fetch both datasets on mount
    Effect::new(move || {
        fetch::load_datasets(education, counties, load_error);
    });

    view! {
        <main style="max-width: 960px; margin: 0 auto; font-family: sans-serif;">
            <h1 id="title" style="text-align: center; margin-bottom: 0;">
                "United States Educational Attainment"
            </h1>
            <p id="description" style="text-align: center; margin-top: 4px;">
                "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)"
            </p>
            {move || {
                load_error.get().map(|message| {
                    view! {
                        <p style="color: #b00020; text-align: center;">{message}</p>
                    }
                })
            }}
            <CountyMap />
        </main>
        <Tooltip />
    }
}

/// Tooltip pinned near the cursor while a county with data is hovered. The
/// element stays mounted the whole time; leaving a county only drops its
/// opacity to 0.
#[component]
fn Tooltip() -> impl IntoView {
    let hovered: RwSignal<Option<u32>> = expect_context();
    let education: RwSignal<Vec<EducationRecord>> = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();

    let tooltip_info = Memo::new(move |_| {
        let fips = hovered.get()?;
        education.with(|records| {
            find_record(records, fips)
                .map(|r| (county_label(&r.area_name, &r.state), r.bachelors_or_higher))
        })
    });

    view! {
        <div
            id="tooltip"
            style="position: fixed; pointer-events: none; z-index: 10; background: #f4f0e6; border: 1px solid #8a8a8a; border-radius: 4px; padding: 6px 10px; font-size: 0.8rem;"
            style:opacity=move || if tooltip_info.get().is_some() { "0.9" } else { "0" }
            style:left=move || {
                let (x, _) = mouse_pos.get();
                format!("{}px", x + TOOLTIP_OFFSET_X)
            }
            style:top=move || {
                let (_, y) = mouse_pos.get();
                format!("{}px", y + TOOLTIP_OFFSET_Y)
            }
            data-education=move || tooltip_info.get().map(|(_, value)| number_text(value))
        >
            {move || {
                tooltip_info.get().map(|(name, value)| {
                    view! {
                        <span>{name}</span>
                        <span style="margin-left: 6px; font-weight: 700;">
                            {percent_text(value)}
                        </span>
                    }
                })
            }}
        </div>
    }
}
