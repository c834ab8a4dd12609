use crate::education::EducationRecord;

/// Bucket boundaries for bachelor's-or-higher percentages.
pub const EDUCATION_THRESHOLDS: [f64; 4] = [12.0, 21.0, 30.0, 39.0];

/// Sequential blues, light to dark, one per bucket.
pub const EDUCATION_PALETTE: [&str; 5] = ["#eff3ff", "#bdd7e7", "#6baed6", "#3182bd", "#08519c"];

/// Fill for counties that have no matching education record.
pub const UNMATCHED_FILL: &str = "#ccc";

/// Upper bound printed on the last legend cell; the data never reaches it.
pub const LEGEND_CEILING: f64 = 50.0;

/// Palette bucket for a percentage. Values sitting exactly on a threshold
/// belong to the lower bucket (21.0 is still "12% - 21%").
pub fn bucket_index(value: f64) -> usize {
    if value < EDUCATION_THRESHOLDS[0] {
        0
    } else if value <= EDUCATION_THRESHOLDS[1] {
        1
    } else if value <= EDUCATION_THRESHOLDS[2] {
        2
    } else if value <= EDUCATION_THRESHOLDS[3] {
        3
    } else {
        4
    }
}

pub fn fill_color(value: f64) -> &'static str {
    EDUCATION_PALETTE[bucket_index(value)]
}

/// Fill for a county given the outcome of its record lookup.
pub fn fill_for(record: Option<&EducationRecord>) -> &'static str {
    match record {
        Some(r) => fill_color(r.bachelors_or_higher),
        None => UNMATCHED_FILL,
    }
}

/// The five legend intervals: thresholds padded with a 0 floor and the
/// display ceiling.
pub fn legend_ranges() -> [(f64, f64); 5] {
    let mut ranges = [(0.0, 0.0); 5];
    for (i, range) in ranges.iter_mut().enumerate() {
        let lo = if i == 0 {
            0.0
        } else {
            EDUCATION_THRESHOLDS[i - 1]
        };
        let hi = EDUCATION_THRESHOLDS
            .get(i)
            .copied()
            .unwrap_or(LEGEND_CEILING);
        *range = (lo, hi);
    }
    ranges
}

/// Legend cell text, bounds floored to whole percents.
pub fn legend_label(lo: f64, hi: f64) -> String {
    format!("{}% - {}%", lo.floor(), hi.floor())
}

#[cfg(test)]
mod tests {
    use super::{
        EDUCATION_PALETTE, UNMATCHED_FILL, bucket_index, fill_color, fill_for, legend_label,
        legend_ranges,
    };
    use crate::education::EducationRecord;

    #[test]
    fn values_below_twelve_take_the_first_bucket() {
        assert_eq!(bucket_index(0.0), 0);
        assert_eq!(bucket_index(11.9), 0);
    }

    #[test]
    fn threshold_values_stay_in_the_lower_bucket() {
        assert_eq!(bucket_index(12.0), 1);
        assert_eq!(bucket_index(21.0), 1);
        assert_eq!(bucket_index(30.0), 2);
        assert_eq!(bucket_index(39.0), 3);
    }

    #[test]
    fn values_between_thresholds_bucket_upward() {
        assert_eq!(bucket_index(21.1), 2);
        assert_eq!(bucket_index(30.1), 3);
        assert_eq!(bucket_index(39.1), 4);
        assert_eq!(bucket_index(66.0), 4);
    }

    #[test]
    fn fill_color_tracks_the_palette() {
        assert_eq!(fill_color(5.0), EDUCATION_PALETTE[0]);
        assert_eq!(fill_color(25.0), EDUCATION_PALETTE[2]);
        assert_eq!(fill_color(45.0), EDUCATION_PALETTE[4]);
    }

    #[test]
    fn missing_record_falls_back_to_gray() {
        assert_eq!(fill_for(None), UNMATCHED_FILL);
    }

    #[test]
    fn matched_record_uses_its_value() {
        let record = EducationRecord {
            fips: 1001,
            state: "AL".into(),
            area_name: "Autauga County".into(),
            bachelors_or_higher: 23.2,
        };
        assert_eq!(fill_for(Some(&record)), EDUCATION_PALETTE[2]);
    }

    #[test]
    fn legend_ranges_pad_floor_and_ceiling() {
        assert_eq!(
            legend_ranges(),
            [
                (0.0, 12.0),
                (12.0, 21.0),
                (21.0, 30.0),
                (30.0, 39.0),
                (39.0, 50.0),
            ]
        );
    }

    #[test]
    fn legend_labels_print_floored_whole_percents() {
        let labels: Vec<String> = legend_ranges()
            .iter()
            .map(|&(lo, hi)| legend_label(lo, hi))
            .collect();
        assert_eq!(
            labels,
            [
                "0% - 12%",
                "12% - 21%",
                "21% - 30%",
                "30% - 39%",
                "39% - 50%",
            ]
        );
    }
}
