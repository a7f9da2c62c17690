use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::matcher::{enrich, EnrichedChecklist};
use super::selector::select;
use super::summary::{summarize, ResearchSummary};
use crate::error::{ChecklistError, Result};
use crate::providers::{ProviderSet, SourceProvider};
use crate::research::{ResearchBundle, ResearchItem};

pub const RESULT_VERSION: &str = "1.0";

/// Inputs for one generation run. Facility type, phase and focus are opaque
/// labels; only the keyword is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub keyword: String,
    pub facility_type: String,
    pub check_phase: String,
    #[serde(default)]
    pub focus_area: Option<String>,
    #[serde(default = "default_collect")]
    pub collect: bool,
}

fn default_collect() -> bool {
    true
}

impl GenerationRequest {
    pub fn new(
        keyword: impl Into<String>,
        facility_type: impl Into<String>,
        check_phase: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            facility_type: facility_type.into(),
            check_phase: check_phase.into(),
            focus_area: None,
            collect: true,
        }
    }

    pub fn with_focus(mut self, focus: Option<String>) -> Self {
        self.focus_area = focus;
        self
    }

    pub fn with_collect(mut self, collect: bool) -> Self {
        self.collect = collect;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub keyword: String,
    pub facility_type: String,
    pub check_phase: String,
    pub focus_area: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

/// The unit that is exported and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub metadata: GenerationMetadata,
    pub checklist: EnrichedChecklist,
    pub research_summary: ResearchSummary,
    pub recommendations: Vec<String>,
}

impl GenerationResult {
    pub fn question_count(&self) -> usize {
        self.checklist.values().map(|c| c.questions.len()).sum()
    }
}

pub struct ChecklistGenerator {
    providers: ProviderSet,
    provider_timeout: Duration,
}

impl ChecklistGenerator {
    pub fn new(providers: ProviderSet) -> Self {
        Self {
            providers,
            provider_timeout: Duration::from_secs(10),
        }
    }

    /// Upper bound for each provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.generate_at(request, Utc::now()).await
    }

    /// Generate with a fixed timestamp; the timestamp also anchors the
    /// recent-paper window.
    pub async fn generate_at(
        &self,
        request: &GenerationRequest,
        now: DateTime<Utc>,
    ) -> Result<GenerationResult> {
        let keyword = request.keyword.trim();
        if keyword.is_empty() {
            return Err(ChecklistError::validation("keyword must not be empty"));
        }
        let focus = request
            .focus_area
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());

        info!(
            "Generating checklist for '{}' (facility: {}, phase: {})",
            keyword, request.facility_type, request.check_phase
        );

        let skeleton = select(&request.facility_type, &request.check_phase, focus);

        let research = if request.collect {
            self.collect(keyword).await
        } else {
            debug!("Research collection skipped");
            ResearchBundle::new()
        };

        let checklist = enrich(&skeleton, &research, keyword);
        let (research_summary, recommendations) = summarize(&research, now.year());

        let result = GenerationResult {
            metadata: GenerationMetadata {
                keyword: keyword.to_string(),
                facility_type: request.facility_type.clone(),
                check_phase: request.check_phase.clone(),
                focus_area: focus.map(str::to_string),
                generated_at: now,
                version: RESULT_VERSION.to_string(),
            },
            checklist,
            research_summary,
            recommendations,
        };

        info!(
            "Checklist ready: {} questions, {} research items",
            result.question_count(),
            result.research_summary.total_resources
        );
        Ok(result)
    }

    /// Query all enabled providers concurrently. Failures and timeouts
    /// contribute nothing.
    pub async fn collect(&self, keyword: &str) -> ResearchBundle {
        let (web, papers, tech, apis) = tokio::join!(
            self.search_one(self.providers.web.as_deref(), keyword),
            self.search_one(self.providers.papers.as_deref(), keyword),
            self.search_one(self.providers.tech.as_deref(), keyword),
            self.search_one(self.providers.apis.as_deref(), keyword),
        );

        let mut bundle = ResearchBundle::new();
        bundle.extend(web);
        bundle.extend(papers);
        bundle.extend(tech);
        bundle.extend(apis);
        bundle
    }

    async fn search_one(
        &self,
        provider: Option<&dyn SourceProvider>,
        keyword: &str,
    ) -> Vec<ResearchItem> {
        let Some(provider) = provider else {
            return Vec::new();
        };

        match tokio::time::timeout(self.provider_timeout, provider.search(keyword)).await {
            Ok(Ok(items)) => {
                info!("{} provider: {} items", provider.kind(), items.len());
                items
            }
            Ok(Err(e)) => {
                warn!("{} provider ({}) failed: {}", provider.kind(), provider.name(), e);
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "{} provider ({}) timed out after {:?}",
                    provider.kind(),
                    provider.name(),
                    self.provider_timeout
                );
                Vec::new()
            }
        }
    }
}
