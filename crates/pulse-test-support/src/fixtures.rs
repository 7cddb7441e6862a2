//! Test fixtures and environment helpers.

use tracing_subscriber::EnvFilter;

/// Pointer position used as a click payload in dispatch tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Route `tracing` output through the test harness writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_from(std::env::var("RUST_LOG").ok()))
        .with_test_writer()
        .try_init();
}

fn filter_from(directive: Option<String>) -> EnvFilter {
    directive
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new("debug"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn point_constructor_sets_fields() {
        assert_eq!(Point::new(1, 2), Point { x: 1, y: 2 });
    }

    #[test]
    fn filter_defaults_to_debug() {
        assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            filter_from(Some("warn".into())).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
