//! Timestamp sources for message factories.
//!
//! A clock is any function returning microseconds since the UNIX epoch. It
//! does not have to be monotonic; tests usually inject [`fixed_clock`].

use chrono::Utc;

/// Boxed timestamp provider held by a factory.
pub type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Current wall-clock time in microseconds since the UNIX epoch.
pub fn system_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Clock backed by the system wall clock.
pub fn system_clock() -> Clock {
    Box::new(system_micros)
}

/// Clock that always returns `micros`.
pub fn fixed_clock(micros: i64) -> Clock {
    Box::new(move || micros)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn system_clock_tracks_wall_time() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_micros() as i64;
        let now = system_clock()();
        assert!(now >= before);
        assert!(now - before < 5_000_000, "clock is more than 5s ahead");
    }

    #[test]
    fn fixed_clock_is_constant() {
        let clock = fixed_clock(1000);
        assert_eq!(clock(), 1000);
        assert_eq!(clock(), 1000);
    }
}
