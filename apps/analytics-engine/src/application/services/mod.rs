//! Application Services
//!
//! Application services coordinate domain logic and infrastructure adapters.
//! They differ from use cases in that they typically run as background tasks
//! or provide long-running functionality.

mod recompute_scheduler;

pub use recompute_scheduler::{
    LatestReport, RecomputeScheduler, RecomputeSchedulerConfig, SchedulerHandle,
};
