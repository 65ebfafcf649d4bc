use serde::{Deserialize, Serialize};

/// Recency constraint shared by every provider call in a session.
#[derive(Debug, Deserialize, Serialize, clap::ValueEnum, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFilter {
    #[serde(rename = "all")]
    #[value(name = "all")]
    All,
    #[serde(rename = "d")]
    #[value(name = "d")]
    Day,
    #[serde(rename = "w")]
    #[value(name = "w")]
    Week,
    #[default]
    #[serde(rename = "m")]
    #[value(name = "m")]
    Month,
    #[serde(rename = "y")]
    #[value(name = "y")]
    Year,
}

impl TimeFilter {
    fn letter(self) -> Option<char> {
        match self {
            TimeFilter::All => None,
            TimeFilter::Day => Some('d'),
            TimeFilter::Week => Some('w'),
            TimeFilter::Month => Some('m'),
            TimeFilter::Year => Some('y'),
        }
    }

    /// Serper `tbs` value (`qdr:<letter>`).
    pub fn serper_tbs(self) -> Option<String> {
        self.letter().map(|l| format!("qdr:{l}"))
    }

    /// Brave `freshness` value (`p<letter>`).
    pub fn brave_freshness(self) -> Option<&'static str> {
        match self {
            TimeFilter::All => None,
            TimeFilter::Day => Some("pd"),
            TimeFilter::Week => Some("pw"),
            TimeFilter::Month => Some("pm"),
            TimeFilter::Year => Some("py"),
        }
    }
}
