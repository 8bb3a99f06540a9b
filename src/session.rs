//! Session lifecycle state and the session-expired hook.
//!
//! A terminal refresh failure clears the stored token and notifies the registered
//! [`SessionObserver`]. The client computes whether the host should navigate to the
//! sign-in entry point; performing the navigation stays with the host.

// self
use crate::{_prelude::*, error::RefreshFailure};

/// Lifecycle of the access token as seen by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
	/// No access token is stored.
	Unauthenticated,
	/// An access token is stored and no refresh is running.
	Authenticated,
	/// A refresh call is in flight; new 401s queue behind it.
	RefreshPending,
}

/// Event delivered when the session can no longer be recovered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionExpired {
	/// Why the refresh failed.
	pub failure: RefreshFailure,
	/// Sign-in location to navigate to, set only when the host was inside the protected area.
	pub redirect_to: Option<String>,
}

/// Host-side hook notified about terminal authentication failures.
pub trait SessionObserver
where
	Self: Send + Sync,
{
	/// Current navigation location (path or absolute URL), if the host has one.
	fn current_location(&self) -> Option<String> {
		None
	}

	/// Called once per failed refresh, after the stored token was cleared.
	fn session_expired(&self, event: &SessionExpired);
}

/// Observer that ignores every event; the default for headless hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSessionObserver;
impl SessionObserver for NoopSessionObserver {
	fn session_expired(&self, _: &SessionExpired) {}
}

/// Observer that records events and reports a settable location; handy for hosts that poll.
#[derive(Debug, Default)]
pub struct RecordingSessionObserver {
	location: RwLock<Option<String>>,
	events: Mutex<Vec<SessionExpired>>,
}
impl RecordingSessionObserver {
	/// Creates an observer that reports `location` as the current location.
	pub fn at(location: impl Into<String>) -> Self {
		Self { location: RwLock::new(Some(location.into())), events: Default::default() }
	}

	/// Updates the reported location.
	pub fn navigate(&self, location: impl Into<String>) {
		*self.location.write() = Some(location.into());
	}

	/// Drains the recorded events.
	pub fn take_events(&self) -> Vec<SessionExpired> {
		std::mem::take(&mut *self.events.lock())
	}
}
impl SessionObserver for RecordingSessionObserver {
	fn current_location(&self) -> Option<String> {
		self.location.read().clone()
	}

	fn session_expired(&self, event: &SessionExpired) {
		self.events.lock().push(event.clone());
	}
}
