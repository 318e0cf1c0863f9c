//! Job-scoped bookkeeping shared across workers.

pub mod lifecycle;
pub mod registry;
pub mod summary;

pub use lifecycle::{JobLifecycleCoordinator, WorkerState};
pub use registry::{DEFAULT_FINALIZED_HISTORY, FinalTotals, JobSnapshot, JobStatsRegistry};
pub use summary::JobSummary;
