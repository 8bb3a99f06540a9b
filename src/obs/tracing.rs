// self
use crate::{_prelude::*, obs::AuthOp};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct AuthSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AuthSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: AuthOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("leadscore_client.auth", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event when the refresh settles; only token fingerprints are logged.
pub fn refresh_settled(fingerprint: Option<&str>, released: usize) {
	#[cfg(feature = "tracing")]
	{
		match fingerprint {
			Some(token) =>
				tracing::debug!(token, released, "access token refreshed; queued requests resumed"),
			None => tracing::warn!(released, "access token refresh failed; queued requests rejected"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (fingerprint, released);
	}
}

/// Emits a warning when a stored-token operation fails on a best-effort path.
pub fn store_warning(stage: &'static str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage, error = %error, "token store operation failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, error);
	}
}
