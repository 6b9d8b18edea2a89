//! Job admission and orphan recovery.
//!
//! At most one job record may exist per wallet. Admission enforces this by
//! deleting any job already present (treated as an orphan from a prior
//! incomplete run, with a recovery notification) before inserting the new
//! one conditioned on absence. The delete→insert window is deliberately not
//! serialized with a lock: a concurrent admission can interleave there, and
//! the conditional insert still guarantees a single winner.

use crate::universe::{UniverseError, UniverseSource};
use orbit_ledger::{LedgerError, LedgerService, Table};
use orbit_notify::NotificationService;
use orbit_types::{unix_now, JobKind, JobRecord};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during job admission.
#[derive(Debug, Error)]
pub enum AdmissionError {
	/// The destination planet is not a member of the universe planet set.
	#[error("Planet not in universe")]
	PlanetNotInUniverse,
	/// The universe snapshot could not be fetched or decoded.
	#[error(transparent)]
	Universe(#[from] UniverseError),
	/// A job was inserted concurrently between the orphan sweep and our
	/// insert; the wallet already has a pending job.
	#[error("A job already exists for this wallet")]
	AlreadyPending,
	/// The ledger failed outright.
	#[error("Ledger error: {0}")]
	Ledger(LedgerError),
}

impl From<LedgerError> for AdmissionError {
	fn from(err: LedgerError) -> Self {
		match err {
			LedgerError::PreconditionFailed => AdmissionError::AlreadyPending,
			other => AdmissionError::Ledger(other),
		}
	}
}

/// Result of a successful admission.
#[derive(Debug)]
pub struct AdmissionOutcome {
	/// The job as inserted.
	pub job: JobRecord,
	/// The orphan that was swept before inserting, if any.
	pub orphan_removed: Option<JobRecord>,
}

/// Admits jobs into the jobs table.
pub struct JobAdmission {
	ledger: Arc<LedgerService>,
	universe: Arc<UniverseSource>,
	notifier: Arc<NotificationService>,
}

impl JobAdmission {
	pub fn new(
		ledger: Arc<LedgerService>,
		universe: Arc<UniverseSource>,
		notifier: Arc<NotificationService>,
	) -> Self {
		Self {
			ledger,
			universe,
			notifier,
		}
	}

	/// Validates and inserts a job for `wallet`.
	///
	/// Planet-destination jobs check membership against a fresh universe
	/// snapshot here and nowhere else; downstream processing trusts the
	/// admitted destination. Withdraw destinations are external wallets and
	/// skip the check.
	pub async fn admit(
		&self,
		wallet: &str,
		kind: JobKind,
		destination: &str,
	) -> Result<AdmissionOutcome, AdmissionError> {
		if kind.requires_planet_destination() {
			let universe = self.universe.snapshot().await?;
			if !universe.has_planet(destination) {
				tracing::info!(wallet, destination, "Destination planet not in universe");
				return Err(AdmissionError::PlanetNotInUniverse);
			}
		}

		let orphan_removed = match self
			.ledger
			.try_retrieve::<JobRecord>(Table::Jobs, wallet)
			.await?
		{
			Some(orphan) => {
				tracing::warn!(
					wallet,
					kind = %orphan.kind,
					"Orphaned job found, deleting before admission"
				);
				self.ledger.remove(Table::Jobs, wallet).await?;
				self.notifier
					.publish(&format!(
						"Orphaned job type {} has been deleted for {}",
						orphan.kind, wallet
					))
					.await;
				Some(orphan)
			},
			None => None,
		};

		let job = JobRecord::new(wallet.to_string(), kind, destination.to_string(), unix_now());
		self.ledger.insert(Table::Jobs, wallet, &job).await?;

		tracing::info!(wallet, kind = %kind, destination, "Job admitted");
		Ok(AdmissionOutcome {
			job,
			orphan_removed,
		})
	}
}
