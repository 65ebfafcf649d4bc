use tracing::info;

use crate::search::{Category, SearchResult};

const SAFETY_WORDS: &[&str] = &[
    "accident",
    "accidents",
    "fire",
    "fires",
    "explosion",
    "explosions",
    "exploded",
    "fatal",
    "fatality",
    "fatalities",
    "death",
    "deaths",
    "dead",
    "killed",
    "injury",
    "injuries",
    "injured",
    "strike",
    "strikes",
    "collapse",
    "collapsed",
    "leak",
    "leaks",
];

fn mentions_safety_event(text: &str) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| SAFETY_WORDS.contains(&word))
}

/// Force `Safety` / priority 1 onto results whose title or snippet mentions an
/// accident, fire, fatality, injury or strike, whatever the model decided.
/// Returns how many results changed.
pub fn enforce_safety(results: &mut [SearchResult]) -> usize {
    let mut retagged = 0;
    for result in results.iter_mut() {
        if !(mentions_safety_event(&result.title) || mentions_safety_event(&result.snippet)) {
            continue;
        }
        if result.category != Some(Category::Safety) || result.priority != Some(1) {
            result.category = Some(Category::Safety);
            result.priority = Some(1);
            retagged += 1;
        }
    }
    if retagged > 0 {
        info!(retagged, "safety rule re-tagged results");
    }
    retagged
}
