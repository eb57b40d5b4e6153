//! Core data types for the link state machine and power controller

/// Link state machine states (Awake mode only)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LinkState {
    /// Last known send succeeded and matched the local state
    Idle,
    /// A transmit is in flight, awaiting the radio IRQ
    Sending,
    /// Backing off before a retry
    Wait,
}

impl LinkState {
    /// Returns true if a radio IRQ is expected in this state
    pub const fn awaiting_radio(&self) -> bool {
        matches!(self, LinkState::Sending)
    }

    /// Returns true if a button change may start a fresh send here
    pub const fn accepts_fresh_send(&self) -> bool {
        matches!(self, LinkState::Idle | LinkState::Wait)
    }
}

/// System power modes
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PowerMode {
    /// Radio powered down, slow input polling
    Sleep,
    /// Radio powered up, low-latency transmit mode
    Awake,
}

/// Link and power-mode configuration parameters
#[derive(Copy, Clone, Debug)]
pub struct LinkConfig {
    /// Idle time before a redundant state resend, in milliseconds
    pub heartbeat_ms: u16,
    /// Consecutive failures retried immediately before backoff starts
    pub fast_retry_limit: u8,
    /// First backoff wait, in milliseconds
    pub backoff_initial_ms: u16,
    /// Backoff ceiling, in milliseconds
    pub backoff_cap_ms: u16,
    /// Sleep-mode button poll period, in milliseconds
    pub sleep_poll_ms: u16,
    /// Awake-mode hardware timer interval, in milliseconds
    pub awake_timer_ms: u16,
    /// Divider deriving the logical link tick from the awake timer
    pub awake_tick_divider: u16,
    /// Quiescent time in Awake mode before returning to Sleep, in milliseconds
    pub idle_return_ms: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            heartbeat_ms: 1000,
            fast_retry_limit: 3,
            backoff_initial_ms: 10,
            backoff_cap_ms: 1000,
            sleep_poll_ms: 250,
            awake_timer_ms: 1,
            awake_tick_divider: 10,
            idle_return_ms: 60_000,
        }
    }
}

impl LinkConfig {
    /// Create a new configuration with validation
    pub fn new(
        heartbeat_ms: u16,
        fast_retry_limit: u8,
        backoff_initial_ms: u16,
        backoff_cap_ms: u16,
    ) -> Result<Self, &'static str> {
        if heartbeat_ms == 0 {
            return Err("Heartbeat interval must be nonzero");
        }
        if fast_retry_limit == 0 {
            return Err("Fast retry limit must be nonzero");
        }
        if backoff_initial_ms == 0 || backoff_initial_ms > backoff_cap_ms {
            return Err("Initial backoff must be nonzero and within the cap");
        }

        Ok(Self {
            heartbeat_ms,
            fast_retry_limit,
            backoff_initial_ms,
            backoff_cap_ms,
            ..Self::default()
        })
    }

    /// Logical link tick period driven by the Awake-mode task table
    pub fn link_tick_ms(&self) -> u16 {
        self.awake_timer_ms.saturating_mul(self.awake_tick_divider)
    }
}
