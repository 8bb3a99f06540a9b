//! Single-flight refresh coordination with a FIFO waiter queue.
//!
//! Every request that observes a 401 asks the [`RefreshCoordinator`] for a ticket. The
//! first caller becomes the [`RefreshLead`] and performs the refresh call; everyone who
//! arrives while it is in flight receives a [`RefreshWaiter`] backed by a one-shot channel.
//! Settling the lead clears the in-flight flag and drains the queue in enqueue order within
//! one critical section, so no waiter can leak into a later refresh cycle.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{_prelude::*, auth::AccessToken, error::RefreshFailure};

/// Outcome fanned out to every request waiting on a refresh.
pub type RefreshOutcome = Result<AccessToken, RefreshFailure>;

#[derive(Debug, Default)]
struct RefreshState {
	in_flight: bool,
	epoch: u64,
	waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Shared refresh-in-flight flag plus waiter queue.
///
/// One instance is owned by each client and shared by all of its clones. The lock is held
/// only for the check-and-set and for the drain, never across an `.await`.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
	state: Mutex<RefreshState>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Claims the refresh if none is running, otherwise joins the queue.
	pub fn begin(&self) -> RefreshTicket<'_> {
		let mut state = self.state.lock();

		if state.in_flight {
			let (tx, rx) = oneshot::channel();

			state.waiters.push_back(tx);
			self.metrics.record_queued();

			RefreshTicket::Wait(RefreshWaiter(rx))
		} else {
			state.in_flight = true;
			self.metrics.record_attempt();

			RefreshTicket::Lead(RefreshLead { coordinator: self, epoch: state.epoch, settled: false })
		}
	}

	/// Starts a new session epoch; a refresh led under an older epoch must not store its token.
	///
	/// Called on sign-out so an in-flight refresh cannot bring the session back.
	pub fn revoke(&self) {
		self.state.lock().epoch += 1;
	}

	/// Returns `true` while a refresh call is executing.
	pub fn is_in_flight(&self) -> bool {
		self.state.lock().in_flight
	}

	/// Number of requests currently suspended on the in-flight refresh.
	pub fn queued(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Counters describing refresh activity so far.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	fn settle(&self, outcome: RefreshOutcome) -> usize {
		let waiters = {
			let mut state = self.state.lock();

			state.in_flight = false;

			mem::take(&mut state.waiters)
		};
		let released = waiters.len();

		match &outcome {
			Ok(_) => self.metrics.record_success(),
			Err(_) => self.metrics.record_failure(),
		}

		for waiter in waiters {
			// A waiter whose request future was dropped has nobody left to notify.
			let _ = waiter.send(outcome.clone());
		}

		released
	}
}

/// Result of [`RefreshCoordinator::begin`].
#[derive(Debug)]
pub enum RefreshTicket<'a> {
	/// The caller must perform the refresh and settle it.
	Lead(RefreshLead<'a>),
	/// A refresh is already running; await its outcome.
	Wait(RefreshWaiter),
}

/// Exclusive right to perform the current refresh.
///
/// Dropping an unsettled lead (for example when the owning request future is cancelled)
/// settles it with [`RefreshFailure::Abandoned`], so the flag never stays stuck.
#[derive(Debug)]
pub struct RefreshLead<'a> {
	coordinator: &'a RefreshCoordinator,
	epoch: u64,
	settled: bool,
}
impl RefreshLead<'_> {
	/// Returns `false` once [`RefreshCoordinator::revoke`] ran after this lead began.
	pub fn is_current(&self) -> bool {
		self.coordinator.state.lock().epoch == self.epoch
	}

	/// Clears the in-flight flag and releases every queued waiter with `outcome`.
	///
	/// Returns the number of waiters released.
	pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
		self.settled = true;

		self.coordinator.settle(outcome)
	}
}
impl Drop for RefreshLead<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.settle(Err(RefreshFailure::Abandoned));
		}
	}
}

/// Suspended request waiting for the in-flight refresh to settle.
#[derive(Debug)]
pub struct RefreshWaiter(oneshot::Receiver<RefreshOutcome>);
impl RefreshWaiter {
	/// Resolves with the token minted by the lead, or its failure.
	pub async fn wait(self) -> RefreshOutcome {
		self.0.await.unwrap_or(Err(RefreshFailure::Abandoned))
	}
}
