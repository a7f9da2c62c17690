use async_trait::async_trait;
use std::time::Duration;

use super::SourceProvider;
use crate::error::{ChecklistError, Result};
use crate::research::{
    ApiItem, PaperItem, ResearchItem, ResearchKind, TechItem, TechKind, WebItem,
};

/// Offline provider for `--dry-run`: a couple of plausible items per kind,
/// all mentioning the keyword so they attach to every question.
pub struct MockProvider {
    kind: ResearchKind,
}

impl MockProvider {
    pub fn new(kind: ResearchKind) -> Self {
        Self { kind }
    }

    fn items(&self, keyword: &str) -> Vec<ResearchItem> {
        match self.kind {
            ResearchKind::Web => vec![
                ResearchItem::Web(WebItem {
                    title: format!("{} safety guidance", keyword),
                    url: "https://www.ready.gov/business".to_string(),
                    source: "Ready.gov".to_string(),
                    source_type: "government".to_string(),
                    summary: format!("Preparedness checklist for {}", keyword),
                    published_date: "2026-01-15".to_string(),
                    credibility_score: 0.95,
                }),
                ResearchItem::Web(WebItem {
                    title: format!("Lessons learned: {} incidents", keyword),
                    url: "https://www.ehstoday.com".to_string(),
                    source: "EHS Today".to_string(),
                    source_type: "community".to_string(),
                    summary: "Field reports from safety managers".to_string(),
                    published_date: "2025-11-02".to_string(),
                    credibility_score: 0.70,
                }),
            ],
            ResearchKind::Paper => vec![ResearchItem::Paper(PaperItem {
                title: format!("Risk assessment methods for {}", keyword),
                url: "https://doi.org/10.0000/mock".to_string(),
                authors: vec!["Mock Author".to_string()],
                year: Some(2024),
                abstract_text: format!("A survey of hazard identification for {}.", keyword),
                citations: 42,
                venue: "Safety Science".to_string(),
                doi: Some("10.0000/mock".to_string()),
                source: "CrossRef".to_string(),
                relevance_score: 0.8,
            })],
            ResearchKind::Tech => vec![ResearchItem::Tech(TechItem {
                name: "incident-board".to_string(),
                url: "https://github.com/example/incident-board".to_string(),
                description: format!("Open-source incident dashboard for {}", keyword),
                stars: 640,
                forks: 80,
                language: Some("TypeScript".to_string()),
                kind: TechKind::Repository,
                is_active: true,
                popularity_score: 0.62,
                source: "GitHub".to_string(),
            })],
            ResearchKind::Api => vec![ResearchItem::Api(ApiItem {
                name: "GDACS Disaster Alerts".to_string(),
                url: "https://www.gdacs.org".to_string(),
                description: format!("Global disaster alerts relevant to {}", keyword),
                provider: "European Commission JRC / UN OCHA".to_string(),
                category: "disaster".to_string(),
                data_format: "JSON, XML".to_string(),
                usage_policy: "Open Data (free)".to_string(),
                commercial_use: true,
                api_key_required: false,
                cost: "Free".to_string(),
                source: "International Open Data".to_string(),
                relevance_score: 0.3,
            })],
        }
    }
}

#[async_trait]
impl SourceProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn kind(&self) -> ResearchKind {
        self.kind
    }

    async fn search(&self, keyword: &str) -> Result<Vec<ResearchItem>> {
        Ok(self.items(keyword))
    }
}

/// Returns a fixed item list regardless of keyword, optionally after a delay.
pub struct StaticProvider {
    kind: ResearchKind,
    items: Vec<ResearchItem>,
    delay: Option<Duration>,
}

impl StaticProvider {
    pub fn new(kind: ResearchKind, items: Vec<ResearchItem>) -> Self {
        Self {
            kind,
            items,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SourceProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn kind(&self) -> ResearchKind {
        self.kind
    }

    async fn search(&self, _keyword: &str) -> Result<Vec<ResearchItem>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.items.clone())
    }
}

/// Always errors; exercises failure absorption in the generator.
pub struct FailingProvider {
    kind: ResearchKind,
}

impl FailingProvider {
    pub fn new(kind: ResearchKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl SourceProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn kind(&self) -> ResearchKind {
        self.kind
    }

    async fn search(&self, _keyword: &str) -> Result<Vec<ResearchItem>> {
        Err(ChecklistError::provider(
            self.kind.as_str(),
            "backend unavailable",
        ))
    }
}
