//! End-to-end scenarios driven through the scheduler and mock hardware

use link_core::hal::regs;
use link_core::test_utils::Harness;
use link_core::{LinkConfig, LinkState, PowerMode};

fn harness() -> Harness {
    Harness::new(LinkConfig::default())
}

/// Sleep → Awake via the slow poll task observing a nonzero sample
#[test]
fn test_wake_on_polled_button_activity() {
    let mut h = harness();
    assert_eq!(h.sched.mode(), PowerMode::Sleep);
    h.take_send();

    h.sched.buttons_mut().set(0x05);
    h.advance_ms(250);

    assert_eq!(h.sched.mode(), PowerMode::Awake);
    assert_eq!(h.sched.session().local_state(), 0x05);
    assert_eq!(h.sched.session().state(), LinkState::Sending);

    // Radio powered up, one payload write, one chip-enable pulse
    let radio = h.sched.radio_mut();
    let config_reg = radio.last_write(regs::CONFIG).unwrap();
    assert_ne!(config_reg & regs::CONFIG_PWR_UP, 0);
    assert_eq!(radio.tx_payloads(), [[0x05]]);
    assert_eq!(radio.ce_pulses(), 1);
}

/// TX-complete IRQ records the in-flight state as acknowledged
#[test]
fn test_ack_settles_link_into_idle() {
    let mut h = harness();
    h.press(0x05);
    assert_eq!(h.sched.session().state(), LinkState::Sending);

    h.ack();

    assert_eq!(h.sched.session().state(), LinkState::Idle);
    assert_eq!(h.sched.session().acked_state(), Some(0x05));
}

/// Four consecutive max-retransmit IRQs walk the backoff from 10 to 20 ms
#[test]
fn test_sustained_failure_grows_backoff() {
    let mut h = harness();
    h.press(0x05);

    h.nack();
    h.nack();
    h.nack();
    assert_eq!(h.sched.session().state(), LinkState::Wait);
    assert_eq!(h.sched.session().wait_time_ms(), 10);

    h.advance_ms(10);
    assert_eq!(h.sched.session().state(), LinkState::Sending);

    h.nack();
    assert_eq!(h.sched.session().state(), LinkState::Wait);
    assert_eq!(h.sched.session().wait_time_ms(), 20);
}

/// All buttons released through the full idle window returns to Sleep,
/// powering the radio down exactly once
#[test]
fn test_quiescent_awake_returns_to_sleep() {
    let mut h = harness();
    h.press(0x03);
    h.ack();

    h.press(0x00);
    h.ack();
    assert_eq!(h.sched.session().acked_state(), Some(0x00));

    h.take_send();
    h.advance_with_ack(60_000);

    assert_eq!(h.sched.mode(), PowerMode::Sleep);
    let radio = h.sched.radio_mut();
    assert_eq!(radio.count_writes(regs::CONFIG), 1);
    assert_eq!(radio.last_write(regs::CONFIG), Some(0));
}

/// Losses followed by a clean ACK converge acked state onto local state
#[test]
fn test_link_converges_after_losses() {
    let mut h = harness();
    h.press(0x0F);

    h.nack();
    h.nack();
    h.ack();

    assert_eq!(h.sched.session().state(), LinkState::Idle);
    assert_eq!(h.sched.session().acked_state(), Some(0x0F));
    assert_eq!(
        h.sched.session().acked_state(),
        Some(h.sched.session().local_state())
    );
}

/// Input changes faster than the link keep the latest state winning
#[test]
fn test_mid_flight_change_ships_latest_state() {
    let mut h = harness();
    h.press(0x01);

    // Change lands while the first packet is in flight
    h.sched.buttons_mut().set(0x03);
    h.flags.note_input_changed();
    h.sched.step();

    h.ack();
    assert_eq!(h.sched.session().state(), LinkState::Sending);
    h.ack();

    assert_eq!(h.sched.session().state(), LinkState::Idle);
    assert_eq!(h.sched.session().acked_state(), Some(0x03));
}

/// A button change during backoff abandons the remaining wait
#[test]
fn test_button_change_cuts_backoff_short() {
    let mut h = harness();
    h.press(0x01);
    h.nack();
    h.nack();
    h.nack();
    assert_eq!(h.sched.session().state(), LinkState::Wait);

    h.press(0x02);

    assert_eq!(h.sched.session().state(), LinkState::Sending);
    assert_eq!(h.sched.radio_mut().tx_payloads().last().unwrap(), &[0x02]);
}

/// Idle link resends its state after the heartbeat interval
#[test]
fn test_heartbeat_refreshes_idle_link() {
    let mut h = harness();
    h.press(0x02);
    h.ack();
    h.take_send();

    h.advance_ms(1000);
    assert_eq!(h.sched.radio_mut().ce_pulses(), 0);

    h.advance_ms(10);
    assert_eq!(h.sched.session().state(), LinkState::Sending);
    assert_eq!(h.sched.radio_mut().ce_pulses(), 1);
    assert_eq!(h.sched.radio_mut().tx_payloads(), [[0x02]]);
}

/// A radio IRQ that fires while asleep is drained without waking the system
#[test]
fn test_stale_radio_irq_in_sleep_is_drained() {
    let mut h = harness();
    h.take_send();

    h.flags.note_radio_irq();
    h.sched.step();

    assert_eq!(h.sched.mode(), PowerMode::Sleep);
    let radio = h.sched.radio_mut();
    assert_eq!(radio.last_write(regs::STATUS), Some(regs::STATUS_IRQ_BITS));
    assert_eq!(radio.ce_pulses(), 0);
}
