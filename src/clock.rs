use chrono::Local;

/// Source of the human readable timestamps stamped onto commits.
pub trait Clock {
    fn now(&self) -> String;
}

/// The local wall clock, formatted as `%Y-%m-%d %H:%M:%S`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// A clock that always reports the same time.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

#[test]
fn test_local_clock_format() {
    let now = LocalClock.now();
    assert!(chrono::NaiveDateTime::parse_from_str(&now, "%Y-%m-%d %H:%M:%S").is_ok());
}
