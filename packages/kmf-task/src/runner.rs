use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::TaskError;
use crate::task::{Task, UpdateOutcome};

#[derive(Debug)]
pub enum RunResult {
    Finished(UpdateOutcome),
    Failed(TaskError),
    /// Another run of the same task was still in progress.
    Busy,
}

/// Runs registered tasks one at a time and turns their results into logs.
///
/// Each task owns a lock, so the scheduler and a manual trigger never run
/// the same task concurrently; the later caller is skipped.
pub struct TaskRunner {
    tasks: Vec<Task>,
    locks: HashMap<String, Mutex<()>>,
}

impl TaskRunner {
    pub fn new(tasks: Vec<Task>) -> Self {
        let locks = tasks
            .iter()
            .map(|task| (task.name.clone(), Mutex::new(())))
            .collect();
        TaskRunner { tasks, locks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name == name)
    }

    /// Runs every task in registry order, awaiting each before the next.
    pub async fn run_all(&self) -> Vec<(String, RunResult)> {
        let mut results = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let result = self.run_task(task).await;
            results.push((task.name.clone(), result));
        }
        results
    }

    pub async fn run_by_name(&self, name: &str) -> Option<RunResult> {
        let task = self.get_task(name)?;
        Some(self.run_task(task).await)
    }

    pub async fn run_task(&self, task: &Task) -> RunResult {
        let _guard = match self.locks.get(&task.name).map(Mutex::try_lock) {
            Some(Ok(guard)) => Some(guard),
            Some(Err(_)) => {
                warn!(task = %task.name, "Update already running, skipped");
                return RunResult::Busy;
            }
            None => None,
        };

        info!(task = %task.name, "Update: {}", task.name);
        match task.handler.run().await {
            Ok(outcome) => {
                info!(task = %task.name, "Update finished: {}", outcome);
                RunResult::Finished(outcome)
            }
            Err(e) => {
                error!(task = %task.name, "Update aborted: {}", e);
                RunResult::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Schedule;
    use crate::task::UpdateHandler;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    struct FixedHandler {
        calls: Arc<std::sync::Mutex<Vec<&'static str>>>,
        label: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl UpdateHandler for FixedHandler {
        async fn run(&self) -> Result<UpdateOutcome, TaskError> {
            self.calls.lock().unwrap().push(self.label);
            if self.fail {
                Err(TaskError::MissingConfig("KMF_STATION_URL_BASE"))
            } else {
                Ok(UpdateOutcome::NoAsset)
            }
        }
    }

    struct GateHandler {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl UpdateHandler for GateHandler {
        async fn run(&self) -> Result<UpdateOutcome, TaskError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(UpdateOutcome::NoAsset)
        }
    }

    #[tokio::test]
    async fn test_run_all_in_order_despite_failure() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let task = |label: &'static str, fail: bool| {
            Task::new(
                label,
                Schedule::EveryHours(6),
                Arc::new(FixedHandler {
                    calls: calls.clone(),
                    label,
                    fail,
                }),
            )
        };
        let runner = TaskRunner::new(vec![task("first", true), task("second", false)]);

        let results = runner.run_all().await;

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
        assert!(matches!(results[0], (ref name, RunResult::Failed(_)) if name == "first"));
        assert!(matches!(
            results[1],
            (ref name, RunResult::Finished(UpdateOutcome::NoAsset)) if name == "second"
        ));
    }

    #[tokio::test]
    async fn test_run_by_name_unknown() {
        let runner = TaskRunner::new(Vec::new());
        assert!(runner.run_by_name("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_run_is_skipped() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let runner = Arc::new(TaskRunner::new(vec![Task::new(
            "slow",
            Schedule::EveryHours(6),
            Arc::new(GateHandler {
                entered: entered.clone(),
                release: release.clone(),
            }),
        )]));

        let first = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_by_name("slow").await }
        });
        entered.notified().await;

        let second = runner.run_by_name("slow").await;
        assert!(matches!(second, Some(RunResult::Busy)));

        release.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(
            first,
            Some(RunResult::Finished(UpdateOutcome::NoAsset))
        ));

        // the lock is released once the run ends
        let entered_again = entered.clone();
        let third = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_by_name("slow").await }
        });
        entered_again.notified().await;
        release.notify_one();
        assert!(matches!(
            third.await.unwrap(),
            Some(RunResult::Finished(UpdateOutcome::NoAsset))
        ));
    }
}
