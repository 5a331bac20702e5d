//! Availability and pricing rules exercised through the library surface.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rust_decimal_macros::dec;

use stayhub_server::booking::{quote_total, ranges_overlap, validate_date_order};
use stayhub_server::models::UserRole;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Random interval pairs: any set of bookings accepted one-by-one under the
/// overlap predicate stays pairwise non-overlapping.
#[test]
fn accepted_bookings_never_overlap_pairwise() {
    let mut rng = rand::thread_rng();
    let base = d("2024-01-01");

    for _ in 0..200 {
        let mut accepted: Vec<(NaiveDate, NaiveDate)> = Vec::new();

        for _ in 0..40 {
            let start_off = rng.gen_range(0..365u64);
            let len = rng.gen_range(0..14u64);
            let start = base + Days::new(start_off);
            let end = base + Days::new(start_off + len);

            let conflicts = accepted
                .iter()
                .any(|&(s, e)| ranges_overlap(s, e, start, end));
            if !conflicts {
                accepted.push((start, end));
            }
        }

        for (i, &(a_start, a_end)) in accepted.iter().enumerate() {
            for &(b_start, b_end) in &accepted[i + 1..] {
                assert!(
                    !(a_end >= b_start && a_start <= b_end),
                    "accepted bookings {:?} and {:?} overlap",
                    (a_start, a_end),
                    (b_start, b_end),
                );
            }
        }
    }
}

#[test]
fn inclusive_night_pricing() {
    // one-night stay: start == end bills exactly one night
    assert_eq!(quote_total(dec!(100), d("2024-05-01"), d("2024-05-01")), dec!(100));
    // Jan 1 - Jan 3 at 100/night bills three inclusive nights
    assert_eq!(quote_total(dec!(100), d("2024-01-01"), d("2024-01-03")), dec!(300));
    // decimal nightly rates stay exact
    assert_eq!(quote_total(dec!(99.50), d("2024-01-01"), d("2024-01-02")), dec!(199.00));
}

#[test]
fn inverted_ranges_always_rejected() {
    let mut rng = rand::thread_rng();
    let base = d("2024-01-01");

    for _ in 0..500 {
        let a = rng.gen_range(0..365u64);
        let b = rng.gen_range(0..365u64);
        let (start, end) = (base + Days::new(a), base + Days::new(b));

        assert_eq!(validate_date_order(start, end).is_ok(), start <= end);
    }
}

#[test]
fn host_role_never_creates_bookings() {
    assert!(stayhub_server::booking::validate_creator_role(UserRole::Host).is_err());
    assert!(stayhub_server::booking::validate_creator_role(UserRole::Guest).is_ok());
}
