//! Cache key construction shared by the fetch stages.
//!
//! Text keys are `"{stage}:{normalized text}"`, so lookups ignore case and
//! surrounding or repeated whitespace. Coordinate keys round to three decimal
//! places (roughly 100 m), so nearby repeat queries share an entry.

/// Decimal places kept in coordinate keys.
pub const COORDINATE_PRECISION: i32 = 3;

/// Lower-case, trim, and collapse inner whitespace.
pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn text_key(stage: &str, text: &str) -> String {
    format!("{stage}:{}", normalize_text(text))
}

pub fn coordinate_key(stage: &str, latitude: f64, longitude: f64) -> String {
    format!(
        "{stage}:{:.3}:{:.3}",
        round_coordinate(latitude),
        round_coordinate(longitude)
    )
}

fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION);
    // Adding 0.0 folds -0.0 into 0.0 so both sides of the equator/meridian agree.
    (value * scale).round() / scale + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_keys_ignore_case_and_spacing() {
        assert_eq!(text_key("geocode", "  New   York "), "geocode:new york");
        assert_eq!(text_key("geocode", "NEW YORK"), text_key("geocode", "new york"));
    }

    #[test]
    fn text_keys_are_stage_scoped() {
        assert_ne!(text_key("geocode", "paris"), text_key("weather", "paris"));
    }

    #[test]
    fn nearby_coordinates_share_a_key() {
        assert_eq!(
            coordinate_key("weather", 48.85661, 2.35222),
            coordinate_key("weather", 48.85649, 2.35181)
        );
        assert_eq!(coordinate_key("weather", 48.85661, 2.35222), "weather:48.857:2.352");
    }

    #[test]
    fn negative_zero_is_folded() {
        assert_eq!(coordinate_key("places", -0.0001, 0.0), "places:0.000:0.000");
    }
}
