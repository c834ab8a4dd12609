use leptos::prelude::*;

use edumap_shared::{EDUCATION_PALETTE, legend_label, legend_ranges};

use crate::map::{SURFACE_HEIGHT, SURFACE_WIDTH};

const CELL_WIDTH: f64 = 80.0;
const CELL_HEIGHT: f64 = 20.0;
const LABEL_OFFSET_X: f64 = 10.0;
const LABEL_Y: f64 = 35.0;

/// One legend entry: color block x-offset, fill, and the range text under it.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendCell {
    pub x: f64,
    pub color: &'static str,
    pub label: String,
}

/// Layout for the legend cells, left to right in palette order.
pub fn legend_cells() -> Vec<LegendCell> {
    EDUCATION_PALETTE
        .iter()
        .zip(legend_ranges())
        .enumerate()
        .map(|(i, (&color, (lo, hi)))| LegendCell {
            x: i as f64 * CELL_WIDTH,
            color,
            label: legend_label(lo, hi),
        })
        .collect()
}

/// Bottom-right legend group inside the map surface.
#[component]
pub fn Legend() -> impl IntoView {
    let x = SURFACE_WIDTH as f64 - 400.0;
    let y = SURFACE_HEIGHT as f64 - 50.0;

    view! {
        <g id="legend" transform=format!("translate({x},{y})")>
            {legend_cells()
                .into_iter()
                .map(|cell| {
                    let label_x = cell.x + LABEL_OFFSET_X;
                    view! {
                        <rect
                            x=cell.x
                            y="0"
                            width=CELL_WIDTH
                            height=CELL_HEIGHT
                            fill=cell.color
                            stroke="black"
                        />
                        <text x=label_x y=LABEL_Y font-size="12px">{cell.label}</text>
                    }
                })
                .collect_view()}
        </g>
    }
}
