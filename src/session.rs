//! One search session: translate, fan out, enrich, report.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::analyze::{self, AnalysisOptions, REPORT_FAILED};
use crate::gemini::{GeminiError, Generator};
use crate::search::{
    self, HarvestSource, SearchBackend, SearchResult, TimeFilter, build_plan, dispatch,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("a search is already in progress")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Searching,
    Processing,
    Complete,
    Error,
}

/// Progress of a session, advanced by explicit stage transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub stage: Stage,
    pub messages: Vec<String>,
    pub progress: u8,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            messages: Vec::new(),
            progress: 0,
        }
    }
}

impl SessionStatus {
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(stage = ?self.stage, progress = self.progress, "{message}");
        self.messages.push(message);
    }

    fn advance(&mut self, stage: Stage, progress: u8) {
        self.stage = stage;
        self.progress = progress;
    }

    fn set_progress(&mut self, progress: u8) {
        self.progress = progress;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub query: String,
    pub status: SessionStatus,
    pub source: HarvestSource,
    pub results: Vec<SearchResult>,
    pub report: String,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub time: TimeFilter,
    pub strict_safety: bool,
    pub analysis: AnalysisOptions,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time: TimeFilter::default(),
            strict_safety: true,
            analysis: AnalysisOptions::default(),
        }
    }
}

/// Final stage and report text once the report call has settled.
///
/// A failed report only fails the session when there is nothing else to show.
/// `Dashboard::run` always has rows (the cached dataset backs an empty
/// harvest), so there it always completes.
fn settle_report(attempt: Result<String, GeminiError>, has_results: bool) -> (Stage, String) {
    match attempt {
        Ok(report) => (Stage::Complete, report),
        Err(_) if has_results => (Stage::Complete, REPORT_FAILED.to_string()),
        Err(_) => (Stage::Error, REPORT_FAILED.to_string()),
    }
}

/// Runs sessions against a model and a search backend, one at a time.
pub struct Dashboard<G, B> {
    generator: G,
    backend: B,
    settings: SessionSettings,
    in_flight: Mutex<()>,
}

impl<G: Generator, B: SearchBackend> Dashboard<G, B> {
    pub fn new(generator: G, backend: B, settings: SessionSettings) -> Self {
        Self {
            generator,
            backend,
            settings,
            in_flight: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn generator(&self) -> &G {
        &self.generator
    }

    /// Run a full session. A second call while one is running is rejected with
    /// [`SessionError::Busy`].
    pub async fn run(&self, query: &str) -> Result<SessionOutcome, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        let _guard = self.in_flight.try_lock().map_err(|_| SessionError::Busy)?;

        let options = &self.settings.analysis;
        let mut status = SessionStatus::default();
        status.advance(Stage::Searching, 10);
        status.log("Initializing search");

        status.log(format!(
            "Translating query for {} target markets",
            search::LOCALES.len()
        ));
        let localized = search::translate(&self.generator, query).await;
        status.set_progress(25);

        let tasks = build_plan(query, &localized);
        status.log(format!("Dispatching {} searches to Google & Brave", tasks.len()));
        let harvest = dispatch(&self.backend, &tasks, self.settings.time).await;

        let mut results = match harvest.source {
            HarvestSource::Fallback => {
                status.log("Live feeds unreachable, loading cached intelligence");
                status.advance(Stage::Processing, 50);
                harvest.results
            }
            HarvestSource::Live => {
                status.log(format!(
                    "Harvested {} raw results, {} unique after dedup",
                    harvest.raw_count,
                    harvest.results.len()
                ));
                status.advance(Stage::Processing, 50);
                status.log(format!(
                    "Analyzing {} unique items for strategic relevance",
                    harvest.results.len()
                ));
                analyze::organize(&self.generator, harvest.results, options).await
            }
        };

        if self.settings.strict_safety {
            let retagged = analyze::enforce_safety(&mut results);
            if retagged > 0 {
                status.log(format!("Flagged {retagged} additional safety items"));
            }
        }
        status.set_progress(75);

        status.log("Synthesizing executive strategy report");
        let attempt =
            analyze::try_summarize(&self.generator, query, &results, None, options).await;
        let failed = attempt.is_err();
        if let Err(e) = &attempt {
            warn!(error = %e, results = results.len(), "report generation failed");
        }
        let (stage, report) = settle_report(attempt, !results.is_empty());
        match stage {
            Stage::Error => {
                status.stage = Stage::Error;
                status.log("Error: no results and no report");
            }
            _ => {
                if failed {
                    status.log("Report unavailable, showing results only");
                }
                status.advance(stage, 100);
                status.log("Session complete");
            }
        }

        Ok(SessionOutcome {
            query: query.to_string(),
            status,
            source: harvest.source,
            results,
            report,
        })
    }

    /// Regenerate the report for a finished session with emphasis on `focus`.
    pub async fn refine(&self, outcome: &SessionOutcome, focus: &str) -> String {
        analyze::summarize(
            &self.generator,
            &outcome.query,
            &outcome.results,
            Some(focus),
            &self.settings.analysis,
        )
        .await
    }
}
