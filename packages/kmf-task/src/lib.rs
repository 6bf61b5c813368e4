pub mod error;
pub mod mod_update;
pub mod registry;
pub mod runner;
pub mod schedule;
pub mod scheduler;
pub mod station;
pub mod task;

pub use error::TaskError;
pub use mod_update::{ModSpec, ModUpdater};
pub use registry::{default_tasks, TaskContext};
pub use runner::{RunResult, TaskRunner};
pub use schedule::Schedule;
pub use scheduler::Scheduler;
pub use station::StationClient;
pub use task::{Task, UpdateHandler, UpdateOutcome};
