// Formatting helpers shared by the TUI widgets

/// Formats a byte count as a human readable size
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Ratio of `done` to `total`, 0.0 for an empty total
pub fn calculate_progress(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (done as f64 / total as f64).min(1.0)
    }
}

/// Shortens a file name to `max_len` characters, keeping its extension.
///
/// `"a_very_long_holiday_photo.jpeg"` becomes `"a_very_long_....jpeg"` at 20.
pub fn truncate_filename(name: &str, max_len: usize) -> String {
    let chars = name.chars().count();
    if chars <= max_len {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], Some(&name[dot + 1..])),
        _ => (name, None),
    };
    let ext_len = ext.map(|e| e.chars().count() + 1).unwrap_or(0);
    let keep = max_len.saturating_sub(ext_len + 3);
    if keep == 0 {
        return name.chars().take(max_len).collect();
    }

    let head: String = stem.chars().take(keep).collect();
    match ext {
        Some(ext) => format!("{}....{}", head, ext),
        None => format!("{}...", head),
    }
}
