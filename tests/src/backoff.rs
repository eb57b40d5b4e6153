//! Backoff policy coverage across consecutive failure counts

use link_core::test_utils::Harness;
use link_core::{LinkConfig, LinkState};
use rstest::rstest;

fn awake_harness(sample: u8) -> Harness {
    let mut h = Harness::new(LinkConfig::default());
    h.press(sample);
    h
}

/// Let a pending backoff expire so the next failure can be delivered
fn expire_backoff(h: &mut Harness) {
    if h.sched.session().state() == LinkState::Wait {
        let wait = h.sched.session().wait_time_ms();
        h.advance_ms(wait);
        assert_eq!(h.sched.session().state(), LinkState::Sending);
    }
}

#[rstest]
#[case(3, 10)]
#[case(4, 20)]
#[case(5, 40)]
#[case(6, 80)]
#[case(7, 160)]
#[case(8, 320)]
#[case(9, 640)]
#[case(10, 1000)]
#[case(11, 1000)]
#[case(12, 1000)]
fn test_wait_time_after_nth_consecutive_failure(#[case] failures: u32, #[case] expected_ms: u16) {
    let mut h = awake_harness(0x01);

    for _ in 0..failures {
        expire_backoff(&mut h);
        h.nack();
    }

    assert_eq!(h.sched.session().state(), LinkState::Wait);
    assert_eq!(h.sched.session().wait_time_ms(), expected_ms);
}

/// Backoff is non-decreasing across an unbroken failure run and never
/// exceeds the cap
#[test]
fn test_backoff_is_monotonic_and_capped() {
    let mut h = awake_harness(0x01);
    let cap = h.sched.config().backoff_cap_ms;

    let mut previous = 0u16;
    for _ in 0..16 {
        expire_backoff(&mut h);
        h.nack();

        if h.sched.session().state() == LinkState::Wait {
            let wait = h.sched.session().wait_time_ms();
            assert!(wait >= previous);
            assert!(wait <= cap);
            previous = wait;
        }
    }
    assert_eq!(previous, cap);
}

/// The first failures after any fresh send retry with no artificial delay
#[test]
fn test_fast_retries_precede_backoff() {
    let mut h = awake_harness(0x01);
    let limit = h.sched.config().fast_retry_limit;

    for _ in 0..limit - 1 {
        h.nack();
        assert_eq!(h.sched.session().state(), LinkState::Sending);
    }

    h.nack();
    assert_eq!(h.sched.session().state(), LinkState::Wait);
    assert_eq!(
        h.sched.session().wait_time_ms(),
        h.sched.config().backoff_initial_ms
    );
}
