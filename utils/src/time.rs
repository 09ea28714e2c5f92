//! Rendering of poll deadlines for operator output.

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Largest two non-zero units of `secs`, e.g. `"2h 5m"`, `"45s"`.
pub fn format_duration(secs: u64) -> String {
    let mut rest = secs;
    let mut parts = Vec::with_capacity(2);
    for (size, suffix) in UNITS {
        let count = rest / size;
        rest %= size;
        if count > 0 || !parts.is_empty() {
            parts.push(format!("{count}{suffix}"));
        }
        if parts.len() == 2 {
            break;
        }
    }
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.join(" ")
}

/// Time left before a deadline, or `"closed"` once it has passed.
pub fn format_remaining(remaining_secs: u64) -> String {
    if remaining_secs == 0 {
        "closed".to_string()
    } else {
        format_duration(remaining_secs)
    }
}
