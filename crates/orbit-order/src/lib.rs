//! Order processing module for the orbit custody engine.
//!
//! Three concerns live here, all upstream of transaction submission:
//! deposit validation (reconciling a claimed deposit against on-chain
//! balance deltas), job admission (the single-active-job-per-wallet
//! invariant with orphan recovery), and pipeline building (turning an
//! admitted job into the ordered instruction sequence it needs on chain).

pub mod admission;
pub mod deposit;
pub mod pipeline;
pub mod universe;

pub use admission::{AdmissionError, AdmissionOutcome, JobAdmission};
pub use deposit::{DepositRejection, DepositValidator, ValidatedDeposit};
pub use pipeline::{PipelineBuilder, PipelineError};
pub use universe::{UniverseError, UniverseSource};
