/// Print a percentage value the way the DOM should carry it: shortest
/// decimal form, so whole numbers have no trailing `.0`.
pub fn number_text(value: f64) -> String {
    format!("{value}")
}

/// Percentage with its unit, as shown in the tooltip.
pub fn percent_text(value: f64) -> String {
    format!("{value}%")
}

/// "Area, ST" heading for a county.
pub fn county_label(area_name: &str, state: &str) -> String {
    format!("{area_name}, {state}")
}
