//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tigerfire_core` linkage and the compiled platform clock.
//! - Print one clock reading in both representations.

use tigerfire_core::{PlatformClock, PlatformTimeProvider, PLATFORM_CLOCK_NAME};

fn main() {
    let clock = PlatformClock::new();
    let now = clock.now_millis();

    println!("tigerfire_core version={}", tigerfire_core::core_version());
    println!("platform_clock={PLATFORM_CLOCK_NAME}");
    println!("now_millis={now}");
    println!("today={}", clock.date_string_at(now));
}
