use std::time::Duration;

use crate::{Error, Result};

/// How many times a failed matching-service request is repeated and how long to wait between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	retries: u32,
	wait: Duration,
}
impl RetryPolicy {
	pub fn new(retries: i64, wait_seconds: f64) -> Result<Self> {
		if retries < 0 {
			return Err(Error::Validation {
				message: format!("service.retries must be zero or greater, got {retries}."),
			});
		}
		if !wait_seconds.is_finite() {
			return Err(Error::Validation {
				message: "service.wait_seconds must be a finite number.".to_string(),
			});
		}
		if wait_seconds < 0.0 {
			return Err(Error::Validation {
				message: format!("service.wait_seconds must be zero or greater, got {wait_seconds}."),
			});
		}

		let retries = u32::try_from(retries).map_err(|_| Error::Validation {
			message: format!("service.retries is too large, got {retries}."),
		})?;

		let wait = Duration::try_from_secs_f64(wait_seconds).map_err(|_| Error::Validation {
			message: format!("service.wait_seconds is too large, got {wait_seconds}."),
		})?;

		Ok(Self { retries, wait })
	}

	pub fn none() -> Self {
		Self { retries: 0, wait: Duration::ZERO }
	}

	pub fn retries(&self) -> u32 {
		self.retries
	}

	/// Total number of requests issued before giving up.
	pub fn attempts(&self) -> u32 {
		self.retries.saturating_add(1)
	}

	pub fn wait(&self) -> Duration {
		self.wait
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::none()
	}
}
