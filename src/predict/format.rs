use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Lat,
    Lng,
}

/// `"12m 5s"`. Display only; pass filtering works on the raw duration.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as i64;
    format!("{}m {}s", total / 60, total % 60)
}

/// `"12.345° N"`
pub fn format_coordinate(value: f64, axis: Axis) -> String {
    let direction = match (axis, value >= 0.0) {
        (Axis::Lat, true) => 'N',
        (Axis::Lat, false) => 'S',
        (Axis::Lng, true) => 'E',
        (Axis::Lng, false) => 'W',
    };
    format!("{:.3}° {}", value.abs(), direction)
}

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0m 0s")]
    #[case(60.1, "1m 0s")]
    #[case(150.0, "2m 30s")]
    #[case(119.6, "2m 0s")]
    #[case(754.4, "12m 34s")]
    fn durations(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }

    #[rstest]
    #[case(51.5074, Axis::Lat, "51.507° N")]
    #[case(-33.8688, Axis::Lat, "33.869° S")]
    #[case(-0.1278, Axis::Lng, "0.128° W")]
    #[case(0.0, Axis::Lng, "0.000° E")]
    fn coordinates(#[case] value: f64, #[case] axis: Axis, #[case] expected: &str) {
        assert_eq!(format_coordinate(value, axis), expected);
    }

    #[test]
    fn instants_are_rfc3339() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(format_instant(t), "2024-03-01T12:30:05Z");
    }
}
