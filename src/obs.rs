//! Optional observability helpers for bridge stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `auth_bridge.stage` with the `stage` (bridge
//!   stage) and `step` (call site) fields, plus warnings for absorbed soft failures.
//! - Enable `metrics` to increment the `auth_bridge_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bridge stages observed during bootstrap and sign-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
	/// Full page-load bootstrap sequence.
	Bootstrap,
	/// Provider client library provisioning.
	LibraryLoad,
	/// OAuth callback detection and consumption.
	Callback,
	/// Direct-credential sign-in exchange.
	SignIn,
	/// Session persistence to the backend.
	Persist,
}
impl StageKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageKind::Bootstrap => "bootstrap",
			StageKind::LibraryLoad => "library_load",
			StageKind::Callback => "callback",
			StageKind::SignIn => "sign_in",
			StageKind::Persist => "persist",
		}
	}
}
impl Display for StageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a bridge stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure reported or absorbed.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Logs a non-essential failure absorbed at a boundary (when tracing is enabled).
pub fn note_soft_failure(stage: StageKind, reason: &str) {
	#[cfg(feature = "tracing")]
	::tracing::warn!(stage = stage.as_str(), reason, "Absorbed a non-essential failure.");

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, reason);
	}
}
