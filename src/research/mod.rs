//! Research items collected from the four source kinds.
//!
//! Items are a tagged union so the matcher and exporter get per-variant field
//! access without guessing at keys. The shared projection used for matching
//! is [`ResearchItem::matchable_text`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchKind {
    Web,
    Paper,
    Tech,
    Api,
}

impl ResearchKind {
    pub const ALL: [ResearchKind; 4] = [
        ResearchKind::Web,
        ResearchKind::Paper,
        ResearchKind::Tech,
        ResearchKind::Api,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchKind::Web => "web",
            ResearchKind::Paper => "paper",
            ResearchKind::Tech => "tech",
            ResearchKind::Api => "api",
        }
    }
}

impl fmt::Display for ResearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page or report from a government, industry or community site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub source_type: String,
    pub summary: String,
    pub published_date: String,
    pub credibility_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperItem {
    pub title: String,
    pub url: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub citations: u64,
    pub venue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub source: String,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechKind {
    Repository,
    Package,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechItem {
    pub name: String,
    pub url: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub kind: TechKind,
    pub is_active: bool,
    pub popularity_score: f64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiItem {
    pub name: String,
    pub url: String,
    pub description: String,
    pub provider: String,
    pub category: String,
    pub data_format: String,
    pub usage_policy: String,
    pub commercial_use: bool,
    pub api_key_required: bool,
    pub cost: String,
    pub source: String,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResearchItem {
    Web(WebItem),
    Paper(PaperItem),
    Tech(TechItem),
    Api(ApiItem),
}

impl ResearchItem {
    pub fn kind(&self) -> ResearchKind {
        match self {
            ResearchItem::Web(_) => ResearchKind::Web,
            ResearchItem::Paper(_) => ResearchKind::Paper,
            ResearchItem::Tech(_) => ResearchKind::Tech,
            ResearchItem::Api(_) => ResearchKind::Api,
        }
    }

    /// Title for web/paper items, name for tech/api items.
    pub fn title(&self) -> &str {
        match self {
            ResearchItem::Web(w) => &w.title,
            ResearchItem::Paper(p) => &p.title,
            ResearchItem::Tech(t) => &t.name,
            ResearchItem::Api(a) => &a.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ResearchItem::Web(w) => &w.url,
            ResearchItem::Paper(p) => &p.url,
            ResearchItem::Tech(t) => &t.url,
            ResearchItem::Api(a) => &a.url,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ResearchItem::Web(w) => &w.summary,
            ResearchItem::Paper(p) => &p.abstract_text,
            ResearchItem::Tech(t) => &t.description,
            ResearchItem::Api(a) => &a.description,
        }
    }

    /// Lower-cased text keyword matching runs on. Papers match on their
    /// title only; abstracts are for display.
    pub fn matchable_text(&self) -> String {
        match self {
            ResearchItem::Paper(p) => p.title.to_lowercase(),
            _ => format!("{} {}", self.title(), self.description()).to_lowercase(),
        }
    }

    /// Per-variant relevance proxy used to rank matches.
    pub fn relevance(&self) -> f64 {
        match self {
            ResearchItem::Web(w) => w.credibility_score,
            ResearchItem::Paper(p) => p.relevance_score,
            ResearchItem::Tech(t) => t.popularity_score,
            ResearchItem::Api(a) => a.relevance_score,
        }
    }
}

/// The four named buckets of collected research. No ordering is implied
/// between buckets; within a bucket, provider order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchBundle {
    pub web: Vec<WebItem>,
    pub papers: Vec<PaperItem>,
    pub tech: Vec<TechItem>,
    pub apis: Vec<ApiItem>,
}

impl ResearchBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route items into buckets by variant.
    pub fn extend(&mut self, items: impl IntoIterator<Item = ResearchItem>) {
        for item in items {
            match item {
                ResearchItem::Web(w) => self.web.push(w),
                ResearchItem::Paper(p) => self.papers.push(p),
                ResearchItem::Tech(t) => self.tech.push(t),
                ResearchItem::Api(a) => self.apis.push(a),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.web.len() + self.papers.len() + self.tech.len() + self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: ResearchKind) -> usize {
        match kind {
            ResearchKind::Web => self.web.len(),
            ResearchKind::Paper => self.papers.len(),
            ResearchKind::Tech => self.tech.len(),
            ResearchKind::Api => self.apis.len(),
        }
    }

    /// All items as the tagged union, bucket by bucket (web, papers, tech, apis).
    pub fn items(&self) -> Vec<ResearchItem> {
        let mut items = Vec::with_capacity(self.len());
        items.extend(self.web.iter().cloned().map(ResearchItem::Web));
        items.extend(self.papers.iter().cloned().map(ResearchItem::Paper));
        items.extend(self.tech.iter().cloned().map(ResearchItem::Tech));
        items.extend(self.apis.iter().cloned().map(ResearchItem::Api));
        items
    }
}
