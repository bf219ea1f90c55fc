// src/utils/log.rs

//! Console progress vocabulary on top of the `log` facade.
//!
//! Keeps run output uniform: a header per run, one step line per stage,
//! indented sub-items and a closing summary.

/// Total number of pipeline stages shown in step lines.
pub const TOTAL_STEPS: usize = 4;

fn border() -> String {
    "═".repeat(60)
}

/// Format a step line, e.g. `[STEP 2/4] Sorting rows`.
pub fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {}/{}] {}", step_num, total, message)
}

/// Log an info message
pub fn info(message: &str) {
    log::info!("{}", message);
}

/// Log a debug message
pub fn debug(message: &str) {
    log::debug!("{}", message);
}

/// Log a warning message
pub fn warn(message: &str) {
    log::warn!("{}", message);
}

/// Log an error message
pub fn error(message: &str) {
    log::error!("{}", message);
}

/// Log a success message
pub fn success(message: &str) {
    log::info!("✓ {}", message);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("{}", format_step(step_num, total, message));
}

/// Log a header
pub fn header(title: &str) {
    log::info!("{}", border());
    log::info!("  {}", title);
    log::info!("{}", border());
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_step() {
        assert_eq!(
            format_step(1, TOTAL_STEPS, "Indexing crawl.tar.gz"),
            "[STEP 1/4] Indexing crawl.tar.gz"
        );
    }
}
