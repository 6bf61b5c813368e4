use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::runner::TaskRunner;
use crate::task::Task;

/// Fires each registered task on its own schedule.
pub struct Scheduler {
    runner: Arc<TaskRunner>,
}

impl Scheduler {
    pub fn new(runner: Arc<TaskRunner>) -> Self {
        Self { runner }
    }

    /// Spawns one timer loop per task. The loops run until aborted.
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        self.runner
            .tasks()
            .iter()
            .map(|task| {
                let runner = self.runner.clone();
                let name = task.name.clone();
                tokio::spawn(async move { run_schedule(runner, name).await })
            })
            .collect()
    }
}

async fn run_schedule(runner: Arc<TaskRunner>, name: String) {
    let Some(task) = runner.get_task(&name) else {
        return;
    };
    loop {
        wait_for_next(task).await;
        runner.run_task(task).await;
    }
}

async fn wait_for_next(task: &Task) {
    let now = Utc::now();
    let next = task.schedule.next_after(now);
    info!(task = %task.name, schedule = %task.schedule, "Next run at {}", next);
    let delay = (next - now).to_std().unwrap_or_default();
    tokio::time::sleep(delay).await;
}
