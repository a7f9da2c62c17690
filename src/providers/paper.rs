use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{sort_desc_by, SourceProvider};
use crate::error::{ChecklistError, Result};
use crate::research::{PaperItem, ResearchItem, ResearchKind};
use crate::util::truncate_chars;

const ABSTRACT_LIMIT: usize = 500;
const CROSSREF_RELEVANCE: f64 = 0.8;
const ARXIV_RELEVANCE: f64 = 0.75;
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Academic paper search over Semantic Scholar, CrossRef and arXiv.
pub struct PaperProvider {
    semantic_scholar_url: String,
    crossref_url: String,
    arxiv_url: String,
    max_results: usize,
    client: Client,
}

// ============================================================================
// Semantic Scholar
// ============================================================================

#[derive(Debug, Deserialize)]
struct ScholarResponse {
    #[serde(default)]
    data: Vec<ScholarPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScholarPaper {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<ScholarAuthor>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(default)]
    citation_count: Option<u64>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScholarAuthor {
    #[serde(default)]
    name: Option<String>,
}

// ============================================================================
// CrossRef
// ============================================================================

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    #[serde(default)]
    message: CrossrefMessage,
}

#[derive(Debug, Default, Deserialize)]
struct CrossrefMessage {
    #[serde(default)]
    items: Vec<CrossrefWork>,
}

#[derive(Debug, Deserialize)]
struct CrossrefWork {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<CrossrefAuthor>,
    #[serde(rename = "published-print", default)]
    published_print: Option<CrossrefDate>,
    #[serde(rename = "published-online", default)]
    published_online: Option<CrossrefDate>,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(rename = "is-referenced-by-count", default)]
    referenced_by: u64,
    #[serde(rename = "container-title", default)]
    container_title: Vec<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    #[serde(default)]
    given: Option<String>,
    #[serde(default)]
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl CrossrefDate {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

// ============================================================================
// arXiv (Atom feed)
// ============================================================================

fn atom_child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name((ATOM_NS, name)))
}

fn atom_text<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    atom_child(node, name).and_then(|n| n.text())
}

/// Parse an arXiv Atom response into papers. arXiv has no citation counts.
pub fn parse_arxiv_feed(xml: &str) -> Result<Vec<PaperItem>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ChecklistError::provider("arxiv", format!("invalid Atom feed: {}", e)))?;

    let papers = doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name((ATOM_NS, "entry")))
        .map(|entry| {
            let title = atom_text(entry, "title")
                .unwrap_or_default()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let authors = entry
                .children()
                .filter(|n| n.has_tag_name((ATOM_NS, "author")))
                .filter_map(|a| atom_text(a, "name"))
                .map(|name| name.trim().to_string())
                .collect();
            let year = atom_text(entry, "published")
                .and_then(|p| p.trim().get(..4))
                .and_then(|y| y.parse().ok());
            let summary = atom_text(entry, "summary").unwrap_or_default().trim();
            PaperItem {
                title,
                url: atom_text(entry, "id").unwrap_or_default().trim().to_string(),
                authors,
                year,
                abstract_text: truncate_chars(summary, ABSTRACT_LIMIT).to_string(),
                citations: 0,
                venue: "arXiv".to_string(),
                doi: None,
                source: "arXiv".to_string(),
                relevance_score: ARXIV_RELEVANCE,
            }
        })
        .collect();
    Ok(papers)
}

/// Title hit 0.5, abstract hit 0.3, citations >100 add 0.2 (>10 add 0.1); capped at 1.
pub fn scholar_relevance(title: &str, abstract_text: &str, citations: u64, keyword: &str) -> f64 {
    let keyword = keyword.to_lowercase();
    let mut score: f64 = 0.0;
    if title.to_lowercase().contains(&keyword) {
        score += 0.5;
    }
    if abstract_text.to_lowercase().contains(&keyword) {
        score += 0.3;
    }
    if citations > 100 {
        score += 0.2;
    } else if citations > 10 {
        score += 0.1;
    }
    score.min(1.0)
}

impl PaperProvider {
    pub fn new(
        semantic_scholar_url: impl Into<String>,
        crossref_url: impl Into<String>,
        arxiv_url: impl Into<String>,
        max_results: usize,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            semantic_scholar_url: semantic_scholar_url.into().trim_end_matches('/').to_string(),
            crossref_url: crossref_url.into().trim_end_matches('/').to_string(),
            arxiv_url: arxiv_url.into(),
            max_results,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .user_agent(concat!("safecheck/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }

    async fn search_semantic_scholar(&self, keyword: &str) -> Result<Vec<PaperItem>> {
        let url = format!("{}/paper/search", self.semantic_scholar_url);
        let limit = self.max_results.min(10).to_string();
        debug!("Querying Semantic Scholar: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", keyword),
                ("limit", limit.as_str()),
                ("fields", "title,authors,year,abstract,citationCount,venue,url"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChecklistError::provider(
                "semantic_scholar",
                format!("API error {}: {}", status, text),
            ));
        }

        let body: ScholarResponse = response.json().await?;
        Ok(body
            .data
            .into_iter()
            .map(|paper| {
                let title = paper.title.unwrap_or_default();
                let abstract_full = paper.r#abstract.unwrap_or_default();
                let citations = paper.citation_count.unwrap_or(0);
                let relevance_score = scholar_relevance(&title, &abstract_full, citations, keyword);
                PaperItem {
                    title,
                    url: paper.url.unwrap_or_default(),
                    authors: paper.authors.into_iter().filter_map(|a| a.name).collect(),
                    year: paper.year,
                    abstract_text: truncate_chars(&abstract_full, ABSTRACT_LIMIT).to_string(),
                    citations,
                    venue: paper.venue.unwrap_or_default(),
                    doi: None,
                    source: "Semantic Scholar".to_string(),
                    relevance_score,
                }
            })
            .collect())
    }

    async fn search_crossref(&self, keyword: &str) -> Result<Vec<PaperItem>> {
        let url = format!("{}/works", self.crossref_url);
        let rows = self.max_results.min(10).to_string();
        debug!("Querying CrossRef: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", keyword),
                ("rows", rows.as_str()),
                ("sort", "relevance"),
                ("order", "desc"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChecklistError::provider(
                "crossref",
                format!("API error {}: {}", status, text),
            ));
        }

        let body: CrossrefResponse = response.json().await?;
        Ok(body
            .message
            .items
            .into_iter()
            .map(|work| {
                let year = work
                    .published_print
                    .as_ref()
                    .or(work.published_online.as_ref())
                    .and_then(CrossrefDate::year);
                let authors = work
                    .author
                    .iter()
                    .map(|a| {
                        format!(
                            "{} {}",
                            a.given.as_deref().unwrap_or(""),
                            a.family.as_deref().unwrap_or("")
                        )
                        .trim()
                        .to_string()
                    })
                    .filter(|name| !name.is_empty())
                    .collect();
                let abstract_full = work.r#abstract.unwrap_or_default();
                PaperItem {
                    title: work.title.into_iter().next().unwrap_or_default(),
                    url: work.url.unwrap_or_default(),
                    authors,
                    year,
                    abstract_text: truncate_chars(&abstract_full, ABSTRACT_LIMIT).to_string(),
                    citations: work.referenced_by,
                    venue: work.container_title.into_iter().next().unwrap_or_default(),
                    doi: work.doi.filter(|d| !d.is_empty()),
                    source: "CrossRef".to_string(),
                    relevance_score: CROSSREF_RELEVANCE,
                }
            })
            .collect())
    }

    async fn search_arxiv(&self, keyword: &str) -> Result<Vec<PaperItem>> {
        let query = format!("all:{}", keyword);
        let max = self.max_results.min(10).to_string();
        debug!("Querying arXiv: {}", self.arxiv_url);

        let response = self
            .client
            .get(&self.arxiv_url)
            .query(&[
                ("search_query", query.as_str()),
                ("start", "0"),
                ("max_results", max.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChecklistError::provider(
                "arxiv",
                format!("API error {}: {}", status, text),
            ));
        }

        parse_arxiv_feed(&response.text().await?)
    }
}

#[async_trait]
impl SourceProvider for PaperProvider {
    fn name(&self) -> &str {
        "papers"
    }

    fn kind(&self) -> ResearchKind {
        ResearchKind::Paper
    }

    async fn search(&self, keyword: &str) -> Result<Vec<ResearchItem>> {
        let (scholar, crossref, arxiv) = tokio::join!(
            self.search_semantic_scholar(keyword),
            self.search_crossref(keyword),
            self.search_arxiv(keyword)
        );

        let mut papers = Vec::new();
        match scholar {
            Ok(found) => papers.extend(found),
            Err(e) => warn!("Semantic Scholar search failed: {}", e),
        }
        match crossref {
            Ok(found) => papers.extend(found),
            Err(e) => warn!("CrossRef search failed: {}", e),
        }
        match arxiv {
            Ok(found) => papers.extend(found),
            Err(e) => warn!("arXiv search failed: {}", e),
        }

        // Newest first; unknown years last
        sort_desc_by(&mut papers, |p| p.year.map(f64::from).unwrap_or(f64::MIN));
        papers.truncate(self.max_results);

        debug!("Collected {} papers for '{}'", papers.len(), keyword);
        Ok(papers.into_iter().map(ResearchItem::Paper).collect())
    }
}
