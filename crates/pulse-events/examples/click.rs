//! Registers two click listeners and a one-shot listener, then emits twice.
//!
//! Run with `RUST_LOG=debug cargo run -p pulse-events --example click` to see
//! registry log records.

use pulse_events::{Listener, Registry, RegistryConfig, Topic};
use pulse_telemetry::{LogFormat, LoggingConfig, init_logging};

#[derive(Debug, Clone, Copy)]
struct Point {
    x: i32,
    y: i32,
}

const CLICK: Topic<Point> = Topic::new("click");

fn main() -> anyhow::Result<()> {
    init_logging(&LoggingConfig {
        level: "debug",
        format: LogFormat::Pretty,
    })?;

    let registry = Registry::with_config(RegistryConfig::from_env()?)?;

    let log_click = registry.subscribe(&CLICK, |point: &Point| {
        println!("click at ({}, {})", point.x, point.y);
    });
    registry.subscribe(&CLICK, |point: &Point| {
        println!("distance from origin: {}", point.x.abs() + point.y.abs());
    });
    registry.once(
        &CLICK,
        &Listener::new(|_: &Point| println!("first click only")),
    );

    registry.emit(&CLICK, &Point { x: 1, y: 2 });
    registry.off(&CLICK, &log_click);
    registry.emit(&CLICK, &Point { x: -3, y: 4 });

    println!("listeners left on click: {}", registry.listener_count(&CLICK));
    Ok(())
}
