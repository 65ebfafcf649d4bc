use tracing::{debug, warn};

use super::aggregate::{Harvest, aggregate};
use super::plan::{Provider, SearchTask};
use super::result::SearchResult;
use super::time::TimeFilter;
use crate::providers::{BraveClient, SerperClient};

/// Executes a single planned task.
/// Implemented by `Providers` for production; mock implementations used in tests.
pub trait SearchBackend {
    async fn execute(&self, task: &SearchTask, time: TimeFilter) -> Vec<SearchResult>;
}

/// The configured provider clients. A provider without a key contributes no rows.
#[derive(Clone, Default)]
pub struct Providers {
    pub serper: Option<SerperClient>,
    pub brave: Option<BraveClient>,
}

impl Providers {
    pub fn warn_if_unconfigured(&self) {
        if self.serper.is_none() {
            warn!("SERPER_API_KEY not set, Google tasks will return nothing");
        }
        if self.brave.is_none() {
            warn!("BRAVE_API_KEY not set, Brave tasks will return nothing");
        }
    }
}

impl SearchBackend for Providers {
    async fn execute(&self, task: &SearchTask, time: TimeFilter) -> Vec<SearchResult> {
        match (&task.provider, &self.serper, &self.brave) {
            (Provider::Serper { gl, hl }, Some(serper), _) => {
                serper.run(&task.query, gl, hl, &task.label, time).await
            }
            (Provider::Brave, _, Some(brave)) => brave.run(&task.query, &task.label, time).await,
            _ => {
                debug!(label = %task.label, "provider not configured, skipping task");
                Vec::new()
            }
        }
    }
}

/// Launch every task against `backend` and aggregate the rows.
pub async fn dispatch(
    backend: &impl SearchBackend,
    tasks: &[SearchTask],
    time: TimeFilter,
) -> Harvest {
    aggregate(tasks.iter().map(|task| backend.execute(task, time))).await
}
