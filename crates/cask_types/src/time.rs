//! Time constants and the wall-clock helper.

use std::time::{SystemTime, UNIX_EPOCH};

/// Sentinel meaning "no expiry" for TTLs and deletion times.
pub const INFINITE_TIME: i64 = -1;

/// Milliseconds per second.
pub const MS_PER_SEC: i64 = 1000;

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Used to default blob creation timestamps on the write path.
#[must_use]
pub fn current_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_positive_and_sane() {
        let now = current_time_millis();
        assert!(now > 0);
        // 2020-01-01 in ms; a clock before this is misconfigured.
        assert!(now > 1_577_836_800_000);
    }
}
