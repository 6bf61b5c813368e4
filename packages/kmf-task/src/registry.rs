use std::sync::Arc;

use crate::mod_update::{ModSpec, ModUpdater};
use crate::schedule::Schedule;
use crate::station::StationClient;
use crate::task::Task;
use kmf_provider::{ReleaseProvider, RepoId};
use kmf_utils::HttpClient;

pub const KORABLI_LESTA_L10N: &str = "korabli-lesta-l10n";

/// Shared collaborators handed to every registered task.
#[derive(Clone)]
pub struct TaskContext {
    pub provider: Arc<dyn ReleaseProvider>,
    pub station: StationClient,
    pub http: HttpClient,
}

pub fn korabli_lesta_l10n() -> ModSpec {
    ModSpec {
        name: KORABLI_LESTA_L10N.to_string(),
        repo: RepoId::new("LocalizedKorabli", "Korabli-LESTA-L10N"),
        asset_suffix: ".zh.mod.zip".to_string(),
        archive_extension: ".mod.zip".to_string(),
    }
}

/// Every task this service knows, in the order a manual trigger runs them.
pub fn default_tasks(context: &TaskContext) -> Vec<Task> {
    [(korabli_lesta_l10n(), Schedule::EveryHours(6))]
        .into_iter()
        .map(|(spec, schedule)| {
            let name = spec.name.clone();
            let updater = ModUpdater::new(
                spec,
                context.provider.clone(),
                context.station.clone(),
                context.http.clone(),
            );
            Task::new(name, schedule, Arc::new(updater))
        })
        .collect()
}
