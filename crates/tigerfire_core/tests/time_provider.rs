use chrono::{FixedOffset, NaiveDate, TimeZone};
use regex::Regex;
use std::thread::sleep;
use std::time::Duration;
use tigerfire_core::{
    DateString, EpochClock, ManualClock, PlatformClock, PlatformTimeProvider, ReferenceDateClock,
    ZoneSource,
};

const TOKYO_MINUTES: i32 = 9 * 60;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn date_pattern() -> Regex {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap()
}

fn local_millis(offset_minutes: i32, y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
    FixedOffset::east_opt(offset_minutes * 60)
        .unwrap()
        .from_local_datetime(
            &NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
        )
        .single()
        .unwrap()
        .timestamp_millis()
}

/// Civil date from days since 1970-01-01 (proleptic Gregorian).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn derived_date(millis: i64, offset_minutes: i32) -> String {
    let local = millis + i64::from(offset_minutes) * 60_000;
    let (y, m, d) = civil_from_days(local.div_euclid(DAY_MS));
    format!("{y:04}-{m:02}-{d:02}")
}

fn assert_provider_contract(provider: &dyn PlatformTimeProvider) {
    let pattern = date_pattern();
    let first = provider.today_date_string();
    assert!(pattern.is_match(first.as_str()), "bad date: {first}");
    let second = provider.today_date_string();
    // Equal unless the two reads straddle midnight.
    if first != second {
        assert_eq!(first.shift_days(1), second);
    }
}

#[test]
fn every_adapter_honors_the_contract() {
    assert_provider_contract(&EpochClock::new());
    assert_provider_contract(&ReferenceDateClock::new());
    assert_provider_contract(&PlatformClock::new());
    assert_provider_contract(&EpochClock::with_zone(ZoneSource::utc()));
    assert_provider_contract(&ManualClock::new(1_709_632_800_000));
}

#[test]
fn now_millis_is_non_decreasing_for_native_adapters() {
    let providers: Vec<Box<dyn PlatformTimeProvider>> = vec![
        Box::new(EpochClock::new()),
        Box::new(ReferenceDateClock::new()),
    ];
    for provider in providers {
        let mut previous = provider.now_millis();
        for _ in 0..500 {
            let current = provider.now_millis();
            assert!(current >= previous);
            previous = current;
        }
    }
}

#[test]
fn sleep_of_fifty_millis_is_observed() {
    let clock = PlatformClock::new();
    let first = clock.now_millis();
    sleep(Duration::from_millis(50));
    let second = clock.now_millis();
    assert!(second >= first + 40, "first={first} second={second}");
}

#[test]
fn morning_instant_formats_as_that_day() {
    let zone = ZoneSource::fixed_minutes(TOKYO_MINUTES).unwrap();
    let clock = ManualClock::with_zone(
        local_millis(TOKYO_MINUTES, 2024, 3, 5, 10, 0, 0),
        zone,
    );
    assert_eq!(clock.today_date_string().as_str(), "2024-03-05");
}

#[test]
fn date_string_agrees_with_civil_calendar_math() {
    let offsets = [-(12 * 60), -(5 * 60 + 30), 0, TOKYO_MINUTES, 14 * 60];
    let instants = [
        0_i64,
        -1,
        951_782_400_000,   // 2000-02-29T00:00:00Z
        1_709_251_199_999, // 2024-02-29T23:59:59.999Z
        4_102_444_800_000, // 2100-01-01T00:00:00Z
        -2_208_988_800_001,
    ];
    for offset in offsets {
        let zone = ZoneSource::fixed_minutes(offset).unwrap();
        let clock = ManualClock::with_zone(0, zone);
        for millis in instants {
            clock.set_millis(millis);
            assert_eq!(
                clock.today_date_string().as_str(),
                derived_date(clock.now_millis(), offset),
                "millis={millis} offset={offset}"
            );
        }
    }
}

#[test]
fn native_reading_round_trips_through_calendar_math() {
    let clock = EpochClock::with_zone(ZoneSource::utc());
    let millis = clock.now_millis();
    assert_eq!(clock.date_string_at(millis).as_str(), derived_date(millis, 0));
}

#[test]
fn midnight_rollover_advances_exactly_one_day() {
    let zone = ZoneSource::fixed_minutes(TOKYO_MINUTES).unwrap();
    let midnight = local_millis(TOKYO_MINUTES, 2024, 2, 29, 0, 0, 0);
    let clock = ManualClock::with_zone(midnight - 1, zone);

    let before = clock.today_date_string();
    clock.advance(Duration::from_millis(1));
    let after = clock.today_date_string();

    assert_eq!(before.as_str(), "2024-02-28");
    assert_eq!(after.as_str(), "2024-02-29");
    assert_eq!(before.shift_days(1), after);
}

#[test]
fn unrepresentable_instant_yields_empty_string() {
    let clock = ManualClock::new(i64::MAX);
    let day = clock.today_date_string();
    assert!(day.is_unavailable());
    assert_eq!(day.as_str(), "");
}

#[test]
fn date_string_serializes_as_plain_string() {
    let day = DateString::parse("2024-03-05").unwrap();
    assert_eq!(serde_json::to_value(&day).unwrap(), "2024-03-05");
    let decoded: DateString = serde_json::from_value(serde_json::json!("2024-03-05")).unwrap();
    assert_eq!(decoded, day);
    assert!(serde_json::from_value::<DateString>(serde_json::json!("2024-02-30")).is_err());
}
