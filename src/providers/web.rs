use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use super::SourceProvider;
use crate::error::Result;
use crate::research::{ResearchItem, ResearchKind, WebItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceType {
    Government,
    Industry,
    Community,
}

impl SourceType {
    fn as_str(&self) -> &'static str {
        match self {
            SourceType::Government => "government",
            SourceType::Industry => "industry",
            SourceType::Community => "community",
        }
    }

    fn credibility(&self) -> f64 {
        match self {
            SourceType::Government => 0.95,
            SourceType::Industry => 0.85,
            SourceType::Community => 0.70,
        }
    }
}

struct Site {
    name: &'static str,
    url: &'static str,
    kind: SourceType,
}

const SITES: &[Site] = &[
    Site {
        name: "FEMA",
        url: "https://www.fema.gov/emergency-managers",
        kind: SourceType::Government,
    },
    Site {
        name: "OSHA",
        url: "https://www.osha.gov/emergency-preparedness",
        kind: SourceType::Government,
    },
    Site {
        name: "Ready.gov",
        url: "https://www.ready.gov/business",
        kind: SourceType::Government,
    },
    Site {
        name: "NFPA",
        url: "https://www.nfpa.org/codes-and-standards",
        kind: SourceType::Industry,
    },
    Site {
        name: "National Safety Council",
        url: "https://www.nsc.org/workplace",
        kind: SourceType::Industry,
    },
    Site {
        name: "EHS Today",
        url: "https://www.ehstoday.com",
        kind: SourceType::Community,
    },
    Site {
        name: "Safety+Health",
        url: "https://www.safetyandhealthmagazine.com",
        kind: SourceType::Community,
    },
];

/// Curated directory of government, industry and community safety sources.
/// Emits one entry per source pointing at where material on the keyword lives.
pub struct WebProvider {
    max_results: usize,
    published: Option<NaiveDate>,
}

impl WebProvider {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            published: None,
        }
    }

    /// Pin the published date instead of using today's.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.published = Some(date);
        self
    }

    fn entry(site: &Site, keyword: &str, date: &str) -> WebItem {
        let (title, summary) = match site.kind {
            SourceType::Government => (
                format!("{} - {} guidance", site.name, keyword),
                format!("Notices and guidance from {} related to {}", site.name, keyword),
            ),
            SourceType::Industry => (
                format!("{} report on {}", site.name, keyword),
                format!("Industry standards and trend analysis for {}", keyword),
            ),
            SourceType::Community => (
                format!("{} - {} articles", site.name, keyword),
                format!("Practitioner articles and discussion about {}", keyword),
            ),
        };
        WebItem {
            title,
            url: site.url.to_string(),
            source: site.name.to_string(),
            source_type: site.kind.as_str().to_string(),
            summary,
            published_date: date.to_string(),
            credibility_score: site.kind.credibility(),
        }
    }
}

#[async_trait]
impl SourceProvider for WebProvider {
    fn name(&self) -> &str {
        "web"
    }

    fn kind(&self) -> ResearchKind {
        ResearchKind::Web
    }

    async fn search(&self, keyword: &str) -> Result<Vec<ResearchItem>> {
        let date = self
            .published
            .unwrap_or_else(|| Utc::now().date_naive())
            .format("%Y-%m-%d")
            .to_string();

        let mut items: Vec<WebItem> = SITES
            .iter()
            .map(|site| Self::entry(site, keyword, &date))
            .collect();

        // Newest first; ISO dates sort lexically
        items.sort_by(|a, b| b.published_date.cmp(&a.published_date));
        items.truncate(self.max_results);

        debug!("Web directory produced {} entries for '{}'", items.len(), keyword);
        Ok(items.into_iter().map(ResearchItem::Web).collect())
    }
}
