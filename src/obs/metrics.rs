// self
use crate::obs::{AuthOp, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(op: AuthOp, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"leadscore_client_auth_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

/// Records the outcome of `result` and hands it back unchanged.
pub fn record_result<T, E>(op: AuthOp, result: Result<T, E>) -> Result<T, E> {
	match &result {
		Ok(_) => record_outcome(op, OpOutcome::Success),
		Err(_) => record_outcome(op, OpOutcome::Failure),
	}

	result
}
