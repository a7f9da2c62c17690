//! Research counts, maturity heuristics and advisory recommendations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::research::{PaperItem, ResearchBundle, TechItem, TechKind};
use crate::util::round_to;

pub const THIN_COVERAGE: &str =
    "⚠️ Related research is scarce. Check the latest safety standards separately.";
pub const SUFFICIENT_RESEARCH: &str =
    "✅ There is ample research to draw on for validated safety standards.";
pub const TOOLING_AVAILABLE: &str =
    "✅ Established open-source tools exist, making a disaster management system easier to build.";

/// Papers from this many years back still count as recent.
const RECENT_YEARS: i32 = 3;
const TOP_LANGUAGES: usize = 5;
const RECOMMENDED_STACKS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaturityLevel {
    Emerging,
    Growing,
    Mature,
}

impl MaturityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLevel::Emerging => "emerging",
            MaturityLevel::Growing => "growing",
            MaturityLevel::Mature => "mature",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMaturity {
    pub maturity_level: MaturityLevel,
    pub total_papers: usize,
    pub recent_papers: usize,
    pub average_citations: f64,
    /// Paper count per publication year, newest year first
    pub year_distribution: IndexMap<i32, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedStack {
    pub name: String,
    pub url: String,
    pub stars: u64,
    pub language: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechMaturity {
    pub maturity_level: MaturityLevel,
    pub total_projects: usize,
    pub active_projects: usize,
    /// Averaged over repositories only
    pub average_stars: f64,
    pub top_languages: IndexMap<String, usize>,
    pub recommended_stacks: Vec<RecommendedStack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityAnalysis {
    pub papers: PaperMaturity,
    pub tech: TechMaturity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub web_sources: usize,
    pub papers: usize,
    pub tech_projects: usize,
    pub apis: usize,
    pub total_resources: usize,
    pub maturity_analysis: MaturityAnalysis,
}

/// Summary and recommendations for a research bundle. `current_year` anchors
/// the "recent papers" window.
pub fn summarize(research: &ResearchBundle, current_year: i32) -> (ResearchSummary, Vec<String>) {
    (research_summary(research, current_year), recommendations(research))
}

pub fn research_summary(research: &ResearchBundle, current_year: i32) -> ResearchSummary {
    ResearchSummary {
        web_sources: research.web.len(),
        papers: research.papers.len(),
        tech_projects: research.tech.len(),
        apis: research.apis.len(),
        total_resources: research.len(),
        maturity_analysis: MaturityAnalysis {
            papers: paper_maturity(&research.papers, current_year),
            tech: tech_maturity(&research.tech),
        },
    }
}

pub fn paper_maturity(papers: &[PaperItem], current_year: i32) -> PaperMaturity {
    let total = papers.len();
    let recent = papers
        .iter()
        .filter(|p| p.year.is_some_and(|y| y >= current_year - RECENT_YEARS))
        .count();
    let average_citations = if total == 0 {
        0.0
    } else {
        papers.iter().map(|p| p.citations as f64).sum::<f64>() / total as f64
    };

    // mature is checked first so it overrides the growing threshold
    let maturity_level = if total > 50 && recent > 10 {
        MaturityLevel::Mature
    } else if total > 20 {
        MaturityLevel::Growing
    } else {
        MaturityLevel::Emerging
    };

    let mut years: Vec<i32> = papers.iter().filter_map(|p| p.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    let mut year_distribution = IndexMap::new();
    for year in years {
        *year_distribution.entry(year).or_insert(0) += 1;
    }

    PaperMaturity {
        maturity_level,
        total_papers: total,
        recent_papers: recent,
        average_citations: round_to(average_citations, 2),
        year_distribution,
    }
}

pub fn tech_maturity(tech: &[TechItem]) -> TechMaturity {
    let total = tech.len();
    let repos: Vec<&TechItem> = tech
        .iter()
        .filter(|t| t.kind == TechKind::Repository)
        .collect();
    let active = repos.iter().filter(|r| r.is_active).count();
    let average_stars = if repos.is_empty() {
        0.0
    } else {
        repos.iter().map(|r| r.stars as f64).sum::<f64>() / repos.len() as f64
    };

    let maturity_level = if total > 20 && average_stars > 1000.0 {
        MaturityLevel::Mature
    } else if total > 10 && average_stars > 100.0 {
        MaturityLevel::Growing
    } else {
        MaturityLevel::Emerging
    };

    let mut language_counts: IndexMap<String, usize> = IndexMap::new();
    for repo in &repos {
        let lang = repo.language.clone().unwrap_or_else(|| "Unknown".to_string());
        *language_counts.entry(lang).or_insert(0) += 1;
    }
    // stable: equal counts keep first-seen order
    language_counts.sort_by(|_, a, _, b| b.cmp(a));
    language_counts.truncate(TOP_LANGUAGES);

    let recommended_stacks = repos
        .iter()
        .take(RECOMMENDED_STACKS)
        .map(|r| RecommendedStack {
            name: r.name.clone(),
            url: r.url.clone(),
            stars: r.stars,
            language: r.language.clone(),
            description: r.description.clone(),
        })
        .collect();

    TechMaturity {
        maturity_level,
        total_projects: total,
        active_projects: active,
        average_stars: round_to(average_stars, 2),
        top_languages: language_counts,
        recommended_stacks,
    }
}

/// Advisory text in a fixed order: paper coverage, tooling, then APIs.
pub fn recommendations(research: &ResearchBundle) -> Vec<String> {
    let mut out = Vec::new();

    let papers = research.papers.len();
    if papers < 5 {
        out.push(THIN_COVERAGE.to_string());
    } else if papers > 20 {
        out.push(SUFFICIENT_RESEARCH.to_string());
    }

    if !research.tech.is_empty() {
        let avg_stars = research.tech.iter().map(|t| t.stars as f64).sum::<f64>()
            / research.tech.len() as f64;
        if avg_stars > 500.0 {
            out.push(TOOLING_AVAILABLE.to_string());
        }
    }

    if !research.apis.is_empty() {
        out.push(format!(
            "💡 {} public APIs are available for real-time disaster information monitoring.",
            research.apis.len()
        ));
    }

    out
}
