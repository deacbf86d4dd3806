//! Pure display derivations for the weather panel.

use chrono::{DateTime, Duration, Utc};

use crate::model::WeatherSnapshot;

pub const PLACEHOLDER: &str = "--";

/// Panel theme picked from the condition string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Mist,
    Default,
}

const THEME_KEYWORDS: &[(&[&str], Theme)] = &[
    (&["clear", "sun"], Theme::Clear),
    (&["cloud"], Theme::Clouds),
    (&["rain", "drizzle"], Theme::Rain),
    (&["snow"], Theme::Snow),
    (&["thunder"], Theme::Thunderstorm),
    (&["mist", "fog", "haze"], Theme::Mist),
];

impl Theme {
    pub fn from_condition(condition: Option<&str>) -> Self {
        first_match(condition, THEME_KEYWORDS).unwrap_or(Theme::Default)
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Theme::Clear => "weather-bg-clear",
            Theme::Clouds => "weather-bg-clouds",
            Theme::Rain => "weather-bg-rain",
            Theme::Snow => "weather-bg-snow",
            Theme::Thunderstorm => "weather-bg-thunderstorm",
            Theme::Mist => "weather-bg-mist",
            Theme::Default => "weather-bg-default",
        }
    }
}

/// Page-wide background gradient. Unlike [`Theme`], drizzle has its own
/// variant and unknown conditions fall back to clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    Mist,
}

const BACKDROP_KEYWORDS: &[(&[&str], Backdrop)] = &[
    (&["clear", "sun"], Backdrop::Clear),
    (&["cloud"], Backdrop::Clouds),
    (&["rain"], Backdrop::Rain),
    (&["drizzle"], Backdrop::Drizzle),
    (&["snow"], Backdrop::Snow),
    (&["thunder"], Backdrop::Thunderstorm),
    (&["mist", "fog", "haze"], Backdrop::Mist),
];

impl Backdrop {
    pub fn from_condition(condition: Option<&str>) -> Self {
        first_match(condition, BACKDROP_KEYWORDS).unwrap_or(Backdrop::Clouds)
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Backdrop::Clear => "bg-gradient-clear",
            Backdrop::Clouds => "bg-gradient-clouds",
            Backdrop::Rain => "bg-gradient-rain",
            Backdrop::Drizzle => "bg-gradient-drizzle",
            Backdrop::Snow => "bg-gradient-snow",
            Backdrop::Thunderstorm => "bg-gradient-thunderstorm",
            Backdrop::Mist => "bg-gradient-mist",
        }
    }
}

fn first_match<T: Copy>(condition: Option<&str>, table: &[(&[&str], T)]) -> Option<T> {
    let lower = condition?.to_lowercase();
    table
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, value)| *value)
}

/// Display unit of a numeric panel field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Celsius,
    Percent,
    Hectopascal,
    MetersPerSecond,
    /// Input in meters, shown in kilometers.
    Kilometers,
    Degrees,
}

impl Unit {
    fn suffix(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Percent => "%",
            Unit::Hectopascal => " hPa",
            Unit::MetersPerSecond => " m/s",
            Unit::Kilometers => " km",
            Unit::Degrees => "°",
        }
    }
}

/// Render a numeric field, or [`PLACEHOLDER`] when missing or NaN.
pub fn display_value(value: Option<f64>, unit: Unit) -> String {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return PLACEHOLDER.to_string();
    };

    match unit {
        Unit::MetersPerSecond => format!("{}{}", round_to_tenth(v), unit.suffix()),
        Unit::Kilometers => format!("{}{}", round_to_tenth(v / 1000.0), unit.suffix()),
        _ => format!("{}{}", round_half_up(v), unit.suffix()),
    }
}

// Half-up like a browser's Math.round, and never "-0".
fn round_half_up(v: f64) -> i64 {
    let r = (v + 0.5).floor() as i64;
    if r == 0 { 0 } else { r }
}

fn round_to_tenth(v: f64) -> String {
    let tenths = round_half_up(v * 10.0);
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.unsigned_abs();
    format!("{sign}{}.{}", abs / 10, abs % 10)
}

/// `HH:MM` at the location whose UTC offset is `offset_secs`.
pub fn local_time(offset_secs: i32, now: DateTime<Utc>) -> String {
    (now + Duration::seconds(i64::from(offset_secs))).format("%H:%M").to_string()
}

/// Sunrise/sunset style timestamps shifted into the location's local time.
pub fn clock_time(unix: Option<i64>, offset_secs: i32) -> String {
    unix.filter(|ts| *ts != 0)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|utc| local_time(offset_secs, utc))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// One labelled row of the details grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

impl DetailRow {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

pub fn detail_rows(snapshot: &WeatherSnapshot) -> Vec<DetailRow> {
    let offset = snapshot.timezone.unwrap_or(0);

    let wind = match snapshot.wind_speed {
        None => PLACEHOLDER.to_string(),
        Some(speed) => {
            let speed = display_value(Some(speed), Unit::MetersPerSecond);
            match snapshot.wind_deg {
                Some(deg) => format!("{speed} ({})", display_value(Some(deg), Unit::Degrees)),
                None => speed,
            }
        }
    };

    vec![
        DetailRow::new("Feels Like", display_value(snapshot.feels_like, Unit::Celsius)),
        DetailRow::new("Min", display_value(snapshot.temp_min, Unit::Celsius)),
        DetailRow::new("Max", display_value(snapshot.temp_max, Unit::Celsius)),
        DetailRow::new("Humidity", display_value(snapshot.humidity, Unit::Percent)),
        DetailRow::new("Pressure", display_value(snapshot.pressure, Unit::Hectopascal)),
        DetailRow::new("Wind", wind),
        DetailRow::new("Clouds", display_value(snapshot.clouds, Unit::Percent)),
        DetailRow::new("Visibility", display_value(snapshot.visibility, Unit::Kilometers)),
        DetailRow::new("Sunrise", clock_time(snapshot.sunrise, offset)),
        DetailRow::new("Sunset", clock_time(snapshot.sunset, offset)),
    ]
}

/// "City, Country" with placeholders for blanks.
pub fn location_line(snapshot: &WeatherSnapshot) -> String {
    let or_dash = |s: &str| if s.is_empty() { PLACEHOLDER.to_string() } else { s.to_string() };
    format!("{}, {}", or_dash(&snapshot.city), or_dash(&snapshot.country))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn any_condition_containing_rain_is_rain_theme() {
        for cond in ["Rain", "light RAIN", "freezing rain showers", "Drizzle"] {
            assert_eq!(Theme::from_condition(Some(cond)), Theme::Rain, "{cond}");
        }
        assert_eq!(Theme::Rain.css_class(), "weather-bg-rain");
    }

    #[test]
    fn unmatched_or_absent_condition_is_default_theme() {
        assert_eq!(Theme::from_condition(None), Theme::Default);
        assert_eq!(Theme::from_condition(Some("Tornado")), Theme::Default);
        assert_eq!(Theme::from_condition(Some("")).css_class(), "weather-bg-default");
    }

    #[test]
    fn first_keyword_wins() {
        // "sun" is checked before "cloud"
        assert_eq!(Theme::from_condition(Some("Sun and clouds")), Theme::Clear);
        assert_eq!(Theme::from_condition(Some("Thunderstorm with rain")), Theme::Rain);
        assert_eq!(Theme::from_condition(Some("Haze")), Theme::Mist);
    }

    #[test]
    fn backdrop_splits_drizzle_and_defaults_to_clouds() {
        assert_eq!(Backdrop::from_condition(Some("Drizzle")), Backdrop::Drizzle);
        assert_eq!(Backdrop::from_condition(Some("Rain")).css_class(), "bg-gradient-rain");
        assert_eq!(Backdrop::from_condition(None), Backdrop::Clouds);
        assert_eq!(Backdrop::from_condition(Some("Squall")), Backdrop::Clouds);
    }

    #[test]
    fn missing_and_nan_values_render_placeholder() {
        assert_eq!(display_value(None, Unit::Celsius), "--");
        assert_eq!(display_value(Some(f64::NAN), Unit::Percent), "--");
        assert_eq!(display_value(Some(f64::NAN), Unit::Kilometers), "--");
    }

    #[test]
    fn values_are_rounded_with_unit_suffix() {
        assert_eq!(display_value(Some(21.6), Unit::Celsius), "22°C");
        assert_eq!(display_value(Some(-0.4), Unit::Celsius), "0°C");
        assert_eq!(display_value(Some(-2.5), Unit::Celsius), "-2°C");
        assert_eq!(display_value(Some(64.0), Unit::Percent), "64%");
        assert_eq!(display_value(Some(1012.0), Unit::Hectopascal), "1012 hPa");
        assert_eq!(display_value(Some(4.12), Unit::MetersPerSecond), "4.1 m/s");
        assert_eq!(display_value(Some(10000.0), Unit::Kilometers), "10.0 km");
        assert_eq!(display_value(Some(250.0), Unit::Degrees), "250°");
    }

    #[test]
    fn local_time_applies_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 30, 0).unwrap();
        assert_eq!(local_time(0, now), "23:30");
        assert_eq!(local_time(3600, now), "00:30");
        assert_eq!(local_time(-5 * 3600, now), "18:30");
        assert_eq!(local_time(19800, now), "05:00");
    }

    #[test]
    fn clock_time_placeholder_for_zero_or_missing() {
        assert_eq!(clock_time(None, 0), "--");
        assert_eq!(clock_time(Some(0), 3600), "--");
        // 2024-09-10T05:26:40Z
        assert_eq!(clock_time(Some(1_725_946_000), 3600), "06:26");
    }

    #[test]
    fn detail_rows_cover_every_field() {
        let snap = WeatherSnapshot {
            city: "London".into(),
            country: "GB".into(),
            timezone: Some(3600),
            feels_like: Some(21.2),
            temp_min: Some(20.1),
            temp_max: Some(23.4),
            humidity: Some(64.0),
            pressure: Some(1012.0),
            wind_speed: Some(4.12),
            wind_deg: Some(250.0),
            clouds: Some(75.0),
            visibility: Some(9000.0),
            sunrise: Some(1_725_946_000),
            ..Default::default()
        };

        let rows = detail_rows(&snap);
        let labels: Vec<_> = rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            [
                "Feels Like", "Min", "Max", "Humidity", "Pressure", "Wind", "Clouds",
                "Visibility", "Sunrise", "Sunset"
            ]
        );
        assert_eq!(rows[0].value, "21°C");
        assert_eq!(rows[5].value, "4.1 m/s (250°)");
        assert_eq!(rows[7].value, "9.0 km");
        assert_eq!(rows[9].value, "--");
    }

    #[test]
    fn wind_without_speed_is_placeholder() {
        let snap = WeatherSnapshot { wind_deg: Some(90.0), ..Default::default() };
        let wind = detail_rows(&snap).into_iter().find(|r| r.label == "Wind").unwrap();
        assert_eq!(wind.value, "--");
    }

    #[test]
    fn location_line_uses_placeholders() {
        let snap = WeatherSnapshot { city: "Paris".into(), ..Default::default() };
        assert_eq!(location_line(&snap), "Paris, --");
    }
}
