use chrono::{DateTime, Local, Utc};

/// Formats bytes into human-readable size
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} {}", UNITS[unit_index])
    } else {
        format!("{size:.2} {}", UNITS[unit_index])
    }
}

/// Size in decimal kilobytes, the unit used by the file listing columns
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:9.0}", bytes as f64 / 1000.0)
}

/// Local-time `YYYY-MM-DD HH:MM` used in listings
#[must_use]
pub fn format_listing_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Formats a health percentage, `n/a` when nothing was measurable
#[must_use]
pub fn format_health(health: Option<f64>) -> String {
    health.map_or_else(|| "n/a".to_string(), |h| format!("{h:.1}%"))
}
