use chrono::Utc;
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use weather_core::{
    Dashboard, WeatherSnapshot,
    present::{self, Backdrop, Theme, Unit},
};

/// Header block plus the details grid, the terminal version of the display panel.
pub fn panel(snapshot: &WeatherSnapshot) -> String {
    let condition = (!snapshot.condition.is_empty()).then_some(snapshot.condition.as_str());
    let local = snapshot
        .timezone
        .map(|tz| present::local_time(tz, Utc::now()))
        .unwrap_or_else(|| present::PLACEHOLDER.to_string());

    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}\n",
        present::display_value(snapshot.temp, Unit::Celsius),
        condition.unwrap_or(present::PLACEHOLDER)
    ));
    out.push_str(&format!("{}\n", present::location_line(snapshot)));
    out.push_str(&format!("Local Time: {local}\n"));
    out.push_str(&format!(
        "Theme: {} / {}\n",
        Theme::from_condition(condition).css_class(),
        Backdrop::from_condition(condition).css_class()
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    for row in present::detail_rows(snapshot).chunks(2) {
        let cells: Vec<String> = row.iter().flat_map(|r| [r.label.to_string(), r.value.clone()]).collect();
        table.add_row(cells);
    }
    out.push_str(&table.to_string());
    out
}

/// Full page: error banner or panel, then the map block.
pub fn dashboard(dash: &Dashboard) -> String {
    let mut out = String::new();

    if let Some(err) = dash.error() {
        out.push_str(&format!("Error: {err}\n"));
    }
    if !dash.location_label().is_empty() {
        out.push_str(&format!("Location: {}\n", dash.location_label()));
    }
    if let Some(snapshot) = dash.snapshot() {
        out.push_str(&panel(snapshot));
        out.push('\n');
    }

    let map = dash.map();
    out.push_str(&format!("Map: {}\n", map.osm_link()));
    out.push_str(&format!("Tile: {}\n", map.marker_tile_url()));
    if let Some(popup) = map.popup() {
        out.push_str(&format!(
            "  {} · {} {}\n",
            popup.city,
            popup.condition,
            popup.temp.as_deref().unwrap_or_default()
        ));
    }
    out
}
