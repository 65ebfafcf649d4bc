use std::collections::HashSet;
use std::future::Future;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use super::result::{Category, SearchResult};

/// Upper bound on results carried past aggregation.
pub const MAX_RESULTS: usize = 60;

/// Where a session's result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HarvestSource {
    Live,
    Fallback,
}

/// Output of one fan-out: live rows, or the static dataset when nothing came back.
#[derive(Debug, Clone, PartialEq)]
pub struct Harvest {
    pub source: HarvestSource,
    pub results: Vec<SearchResult>,
    /// Rows returned by providers before dedup and truncation.
    pub raw_count: usize,
}

/// Run every task concurrently and merge their rows.
///
/// All tasks settle before merging; each task is expected to resolve to an
/// empty list on failure. Rows keep task order, then in-task order. The first
/// row seen for a link wins and the merged list is cut at [`MAX_RESULTS`].
pub async fn aggregate<I, F>(tasks: I) -> Harvest
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Vec<SearchResult>>,
{
    let batches = join_all(tasks).await;
    let raw_count: usize = batches.iter().map(Vec::len).sum();

    if raw_count == 0 {
        warn!("no live results from any provider, substituting cached dataset");
        return Harvest {
            source: HarvestSource::Fallback,
            results: fallback_results(),
            raw_count,
        };
    }

    let results = dedup_and_cap(batches.into_iter().flatten(), MAX_RESULTS);
    info!(raw = raw_count, unique = results.len(), "aggregation complete");
    Harvest {
        source: HarvestSource::Live,
        results,
        raw_count,
    }
}

fn dedup_and_cap(rows: impl Iterator<Item = SearchResult>, cap: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    rows.filter(|r| seen.insert(r.link.clone()))
        .take(cap)
        .collect()
}

fn cached(
    title: &str,
    link: &str,
    snippet: &str,
    source: &str,
    date: &str,
    category: Category,
    priority: u8,
) -> SearchResult {
    SearchResult {
        date: Some(date.to_string()),
        category: Some(category),
        priority: Some(priority),
        ..SearchResult::new(title, link, snippet, source)
    }
}

/// Pre-categorized dataset shown when every provider comes back empty.
pub fn fallback_results() -> Vec<SearchResult> {
    vec![
        cached(
            "Fire at ArcelorMittal Gijón plant",
            "https://www.steelorbis.com/steel-news/fire-at-arcelormittal-gijon",
            "A fire broke out at blast furnace A of ArcelorMittal's plant in Asturias, Spain. No casualties reported but production halted.",
            "Google-Spain",
            "12 hours ago",
            Category::Safety,
            1,
        ),
        cached(
            "ArcelorMittal's New Hydrogen Plant in Hamburg",
            "https://www.reuters.com/business/energy/arcelormittal-hamburg-hydrogen",
            "ArcelorMittal announces significant investment in a hydrogen-based DRI plant in Hamburg, aiming for carbon-neutral steel production by 2030.",
            "Google-Germany",
            "2 days ago",
            Category::Tech,
            1,
        ),
        cached(
            "EU CBAM Transition Period Guidelines",
            "https://ec.europa.eu/taxation_customs/carbon-border-adjustment-mechanism_en",
            "European Commission publishes detailed guidelines for the transitional phase of CBAM, affecting steel importers.",
            "Google-Belgium",
            "1 week ago",
            Category::Policy,
            1,
        ),
        cached(
            "Steel Prices in Northern Europe Stabilize",
            "https://www.metalbulletin.com/steel-prices-europe",
            "HRC prices in Northern Europe show signs of stabilization amidst fluctuating energy costs and lower demand from the automotive sector.",
            "Google-UK",
            "3 days ago",
            Category::Economy,
            2,
        ),
        cached(
            "Thyssenkrupp protest over energy prices",
            "https://www.dw.com/en/germany-steel-workers-protest/a-645321",
            "German steel workers protest against soaring electricity prices threatening the competitiveness of domestic production.",
            "Google-Germany",
            "5 days ago",
            Category::Economy,
            3,
        ),
        cached(
            "SSAB delivers first fossil-free steel to Volvo",
            "https://www.ssab.com/news/fossil-free-steel-volvo",
            "Swedish steelmaker SSAB delivers the first commercial volumes of fossil-free steel to Volvo Group.",
            "Google-Sweden",
            "1 month ago",
            Category::Strategy,
            2,
        ),
        cached(
            "Saudi Arabia's Green Steel Ambitions",
            "https://www.arabnews.com/green-steel-saudi",
            "Saudi Arabia aims to become a global hub for green steel production, leveraging low-cost renewable energy and hydrogen.",
            "Google-Saudi",
            "2 weeks ago",
            Category::Strategy,
            2,
        ),
        cached(
            "EU Environmental Regulations Tighten",
            "https://ec.europa.eu/environment",
            "New environmental standards for heavy industry approved by EU parliament.",
            "Google-France",
            "1 day ago",
            Category::Environment,
            1,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{BoxFuture, FutureExt, ready};
    use std::time::Duration;

    fn rows(prefix: &str, n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| {
                SearchResult::new(
                    format!("{prefix} {i}"),
                    format!("https://{prefix}.com/{i}"),
                    "s",
                    prefix,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn duplicate_links_keep_first_occurrence() {
        let mut first = rows("a", 2);
        let mut dup = first[1].clone();
        dup.title = "later copy".into();
        dup.source = "b".into();
        first.push(SearchResult::new("x", "https://x.com", "s", "a"));

        let harvest = aggregate([ready(first), ready(vec![dup])]).await;

        assert_eq!(harvest.source, HarvestSource::Live);
        assert_eq!(harvest.raw_count, 4);
        assert_eq!(harvest.results.len(), 3);
        let kept = harvest
            .results
            .iter()
            .find(|r| r.link == "https://a.com/1")
            .unwrap();
        assert_eq!(kept.title, "a 1");
        assert_eq!(kept.source, "a");
    }

    #[tokio::test]
    async fn cap_preserves_task_order() {
        let harvest = aggregate([
            ready(rows("a", 40)),
            ready(rows("b", 40)),
            ready(rows("c", 40)),
        ])
        .await;

        assert_eq!(harvest.results.len(), MAX_RESULTS);
        assert!(harvest.results[..40].iter().all(|r| r.source == "a"));
        assert!(harvest.results[40..].iter().all(|r| r.source == "b"));
        assert_eq!(harvest.results[40].link, "https://b.com/0");
        assert_eq!(harvest.results[59].link, "https://b.com/19");
        assert_eq!(harvest.results[0].link, "https://a.com/0");
    }

    #[tokio::test]
    async fn task_order_wins_over_completion_order() {
        let slow: BoxFuture<'static, Vec<SearchResult>> = async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            rows("slow", 1)
        }
        .boxed();
        let fast: BoxFuture<'static, Vec<SearchResult>> = ready(rows("fast", 1)).boxed();

        let harvest = aggregate(vec![slow, fast]).await;
        assert_eq!(harvest.results[0].source, "slow");
        assert_eq!(harvest.results[1].source, "fast");
    }

    #[tokio::test]
    async fn failed_tasks_do_not_block_siblings() {
        let harvest = aggregate([ready(Vec::new()), ready(rows("ok", 2)), ready(Vec::new())]).await;
        assert_eq!(harvest.source, HarvestSource::Live);
        assert_eq!(harvest.results.len(), 2);
    }

    #[tokio::test]
    async fn empty_harvest_substitutes_fallback() {
        let harvest = aggregate([ready(Vec::new()), ready(Vec::new())]).await;

        assert_eq!(harvest.source, HarvestSource::Fallback);
        assert_eq!(harvest.raw_count, 0);
        assert!(!harvest.results.is_empty());
        assert_eq!(harvest.results, fallback_results());
    }

    #[tokio::test]
    async fn no_tasks_substitutes_fallback() {
        let harvest = aggregate(Vec::<futures::future::Ready<Vec<SearchResult>>>::new()).await;
        assert_eq!(harvest.source, HarvestSource::Fallback);
    }

    #[test]
    fn fallback_dataset_is_enriched_and_unique() {
        let data = fallback_results();
        let links: HashSet<_> = data.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links.len(), data.len());
        assert!(data.iter().all(|r| r.category.is_some() && r.priority.is_some()));
        assert_eq!(data[0].category, Some(Category::Safety));
    }
}
