use serde::Serialize;

use super::localize::LocalizedQueries;

/// Which provider executes a task, with its provider-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Provider {
    Serper { gl: String, hl: String },
    Brave,
}

/// One provider call in the session fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTask {
    #[serde(flatten)]
    pub provider: Provider,
    pub query: String,
    pub label: String,
}

impl SearchTask {
    fn serper(query: String, gl: &str, hl: &str, label: &str) -> Self {
        Self {
            provider: Provider::Serper {
                gl: gl.to_string(),
                hl: hl.to_string(),
            },
            query,
            label: label.to_string(),
        }
    }

    fn brave(query: String, label: &str) -> Self {
        Self {
            provider: Provider::Brave,
            query,
            label: label.to_string(),
        }
    }
}

/// Ordered task list for one session.
///
/// Order matters: aggregation keeps the first occurrence of a link and then
/// truncates, so the safety/crisis tasks lead the list to survive the cap.
pub fn build_plan(query: &str, localized: &LocalizedQueries) -> Vec<SearchTask> {
    let l = |locale: &str| localized.get(locale);

    vec![
        // Safety & crisis
        SearchTask::serper(
            "ArcelorMittal accident fire explosion Europe".to_string(),
            "eu",
            "en",
            "Google-Safety",
        ),
        SearchTask::serper(
            "steel plant safety incident fatality worker death Europe".to_string(),
            "eu",
            "en",
            "Google-Safety",
        ),
        // EU core, restricted to national domains
        SearchTask::serper(format!("{} site:.de", l("de")), "de", "de", "Google-Germany"),
        SearchTask::serper(format!("{} site:.fr", l("fr")), "fr", "fr", "Google-France"),
        SearchTask::serper(format!("{} site:.es", l("es")), "es", "es", "Google-Spain"),
        SearchTask::serper(format!("{} site:.it", l("it")), "it", "it", "Google-Italy"),
        SearchTask::serper(format!("{} site:.pl", l("pl")), "pl", "pl", "Google-Poland"),
        // Strategic non-EU
        SearchTask::serper(format!("{query} UK steel market"), "gb", "en", "Google-UK"),
        SearchTask::serper(
            format!("{} Turkey steel industry", l("tr")),
            "tr",
            "tr",
            "Google-Turkey",
        ),
        SearchTask::serper(format!("{} Ukraine steel", l("uk")), "ua", "uk", "Google-Ukraine"),
        // MENA; these markets publish mostly on .com, so no site: restriction
        SearchTask::serper(
            format!("{query} Saudi Arabia steel vision 2030"),
            "sa",
            "en",
            "Google-Saudi",
        ),
        SearchTask::serper(
            format!("{query} UAE Emirates Steel Arkan"),
            "ae",
            "en",
            "Google-UAE",
        ),
        SearchTask::serper(
            format!("{} Middle East steel hydrogen", l("ar")),
            "sa",
            "ar",
            "Google-MiddleEast(News)",
        ),
        SearchTask::serper(
            format!("MENA Green Steel projects {query}"),
            "sa",
            "en",
            "Google-MENA(Biz)",
        ),
        SearchTask::serper(
            format!("{query} steel market Middle East North Africa"),
            "sa",
            "en",
            "Google-MENA-Gen",
        ),
        // Competitors & tech
        SearchTask::serper(
            format!("{} Rotterdam hydrogen steel", l("nl")),
            "nl",
            "nl",
            "Google-Netherlands",
        ),
        SearchTask::serper(
            format!("{} Sweden green steel", l("sv")),
            "se",
            "sv",
            "Google-Sweden",
        ),
        // Global English
        SearchTask::brave(
            format!("{query} European steel market news"),
            "Brave-Europe(En)",
        ),
        SearchTask::brave(
            format!("ArcelorMittal strategy {query} press release"),
            "Brave-Competitors",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Vec<SearchTask> {
        build_plan("green steel", &LocalizedQueries::fallback("green steel"))
    }

    #[test]
    fn safety_tasks_lead_the_plan() {
        let tasks = plan();
        assert_eq!(tasks.len(), 19);
        assert_eq!(tasks[0].label, "Google-Safety");
        assert_eq!(tasks[1].label, "Google-Safety");
        assert!(tasks.iter().skip(2).all(|t| t.label != "Google-Safety"));
    }

    #[test]
    fn localized_queries_are_used_with_site_restriction() {
        let mut localized = LocalizedQueries::fallback("green steel");
        let tasks = build_plan("green steel", &localized);
        assert_eq!(tasks[2].query, "green steel site:.de");

        localized.overlay(&serde_json::json!({"de": "grüner Stahl", "sv": "grönt stål"}));
        let tasks = build_plan("green steel", &localized);
        assert_eq!(tasks[2].query, "grüner Stahl site:.de");
        assert_eq!(
            tasks[2].provider,
            Provider::Serper {
                gl: "de".into(),
                hl: "de".into()
            }
        );
        assert_eq!(tasks[16].query, "grönt stål Sweden green steel");
    }

    #[test]
    fn brave_tasks_close_the_plan() {
        let tasks = plan();
        let brave: Vec<_> = tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.provider == Provider::Brave)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(brave, vec![17, 18]);
        assert_eq!(tasks[17].query, "green steel European steel market news");
    }

    #[test]
    fn task_serializes_with_flattened_provider() {
        let json = serde_json::to_value(&plan()[0]).unwrap();
        assert_eq!(json["provider"], "serper");
        assert_eq!(json["gl"], "eu");
        assert_eq!(json["label"], "Google-Safety");
    }
}
