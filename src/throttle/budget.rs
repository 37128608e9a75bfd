use std::time::Duration;

/// Default headroom added to the next request's expected cost
pub const DEFAULT_SAFETY_MARGIN: f64 = 20.0;

/// Cost fields decoded from a single response
///
/// Every field is optional: a response may report the requested cost without a
/// throttle status, or carry a malformed value that the decoder dropped. A
/// missing field leaves the matching tracker field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostObservation {
    /// Cost the server charged (or reserved) for the query
    pub requested_cost: Option<f64>,

    /// Size of the bucket
    pub maximum_available: Option<f64>,

    /// Points left in the bucket after this query
    pub currently_available: Option<f64>,

    /// Points restored per second
    pub restore_rate: Option<f64>,
}

impl CostObservation {
    /// Returns true if the observation carries no field at all
    pub fn is_empty(&self) -> bool {
        self.requested_cost.is_none()
            && self.maximum_available.is_none()
            && self.currently_available.is_none()
            && self.restore_rate.is_none()
    }
}

/// Snapshot of the tracked rate-limit state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BudgetState {
    pub maximum_available: f64,
    pub currently_available: f64,
    /// Units per second; zero means "unknown" and disables waiting
    pub restore_rate: f64,
    pub last_requested_cost: f64,
    pub has_observed: bool,
}

/// Tracks the server-reported cost budget for one pagination session
///
/// The tracker never simulates budget decay or replenishment on its own. The
/// only source of `currently_available` is the most recent server response;
/// between observations the tracker only computes how long to wait.
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    safety_margin: f64,
    state: BudgetState,
    total_cost: f64,
    observation_count: u64,
    total_sleep_seconds: f64,
}

impl BudgetTracker {
    /// Creates a tracker with the given safety margin
    pub fn new(safety_margin: f64) -> Self {
        Self {
            safety_margin: safety_margin.max(0.0),
            state: BudgetState::default(),
            total_cost: 0.0,
            observation_count: 0,
            total_sleep_seconds: 0.0,
        }
    }

    /// Applies the latest server-reported cost fields
    ///
    /// Present fields overwrite the tracked values unconditionally. The last
    /// requested cost (carried over if this observation lacks one) is added to
    /// the running total used by [`BudgetTracker::average_cost`].
    pub fn observe(&mut self, observation: &CostObservation) {
        if let Some(cost) = observation.requested_cost {
            self.state.last_requested_cost = cost;
        }
        if let Some(maximum) = observation.maximum_available {
            self.state.maximum_available = maximum;
        }
        if let Some(available) = observation.currently_available {
            self.state.currently_available = available;
        }
        if let Some(rate) = observation.restore_rate {
            self.state.restore_rate = rate;
        }

        self.total_cost += self.state.last_requested_cost;
        self.observation_count += 1;
        self.state.has_observed = true;

        tracing::trace!(
            "Budget observed: cost={}, available={}/{}, restore_rate={}",
            self.state.last_requested_cost,
            self.state.currently_available,
            self.state.maximum_available,
            self.state.restore_rate
        );
    }

    /// Whole seconds to wait before the next request is safe
    ///
    /// Returns zero before any observation, when the restore rate is unknown,
    /// or when the available budget already covers the last cost plus the
    /// safety margin. Otherwise the deficit is divided by the restore rate and
    /// rounded up.
    pub fn wait_seconds(&self) -> f64 {
        if !self.state.has_observed || self.state.restore_rate <= 0.0 {
            return 0.0;
        }

        let needed = self.state.last_requested_cost + self.safety_margin;
        if self.state.currently_available >= needed {
            return 0.0;
        }

        let deficit = needed - self.state.currently_available;
        (deficit / self.state.restore_rate).ceil().max(0.0)
    }

    /// Same as [`BudgetTracker::wait_seconds`], as a `Duration`
    ///
    /// A wait too long to represent (a vanishing restore rate, say) saturates
    /// to `Duration::MAX`.
    pub fn wait_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.wait_seconds()).unwrap_or(Duration::MAX)
    }

    /// Adds a completed wait to the cumulative sleep total
    pub fn record_sleep(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.total_sleep_seconds += seconds;
        }
    }

    /// Mean of all observed requested costs, or zero before any observation
    pub fn average_cost(&self) -> f64 {
        if self.observation_count == 0 {
            return 0.0;
        }
        self.total_cost / self.observation_count as f64
    }

    pub fn total_sleep_seconds(&self) -> f64 {
        self.total_sleep_seconds
    }

    pub fn observation_count(&self) -> u64 {
        self.observation_count
    }

    pub fn safety_margin(&self) -> f64 {
        self.safety_margin
    }

    /// Returns a copy of the current budget state
    pub fn state(&self) -> BudgetState {
        self.state
    }
}

impl Default for BudgetTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_MARGIN)
    }
}
