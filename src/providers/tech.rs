use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{sort_desc_by, SourceProvider};
use crate::error::{ChecklistError, Result};
use crate::research::{ResearchItem, ResearchKind, TechItem, TechKind};
use crate::util::{round_to, SecretString};

const ACTIVE_WITHIN_DAYS: i64 = 180;
const RATE_LIMIT_WARN_BELOW: u64 = 10;

/// Open-source tooling search over GitHub repositories and the npm registry.
pub struct TechProvider {
    github_url: String,
    npm_url: String,
    github_token: Option<SecretString>,
    min_stars: u64,
    max_results: usize,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GithubSearchResponse {
    #[serde(default)]
    items: Vec<GithubRepo>,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    language: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct NpmSearchResponse {
    #[serde(default)]
    objects: Vec<NpmObject>,
}

#[derive(Debug, Deserialize)]
struct NpmObject {
    package: NpmPackage,
    #[serde(default)]
    score: NpmScore,
}

#[derive(Debug, Deserialize)]
struct NpmPackage {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    links: NpmLinks,
}

#[derive(Debug, Default, Deserialize)]
struct NpmLinks {
    #[serde(default)]
    npm: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NpmScore {
    #[serde(default)]
    detail: NpmScoreDetail,
}

#[derive(Debug, Default, Deserialize)]
struct NpmScoreDetail {
    #[serde(default)]
    popularity: f64,
}

/// Weighted stars/forks/watchers with a freshness bonus, log-scaled into 0..=1.
pub fn github_popularity(stars: u64, forks: u64, watchers: u64, days_since_update: i64) -> f64 {
    let mut score = stars as f64 + forks as f64 * 2.0 + watchers as f64 * 0.5;
    if days_since_update < 30 {
        score *= 1.2;
    } else if days_since_update < 90 {
        score *= 1.1;
    }
    round_to(((score + 1.0).log10() / 5.0).min(1.0), 3)
}

impl TechProvider {
    pub fn new(
        github_url: impl Into<String>,
        npm_url: impl Into<String>,
        min_stars: u64,
        max_results: usize,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            github_url: github_url.into().trim_end_matches('/').to_string(),
            npm_url: npm_url.into().trim_end_matches('/').to_string(),
            github_token: None,
            min_stars,
            max_results,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .user_agent(concat!("safecheck/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }

    pub fn with_github_token(mut self, token: Option<SecretString>) -> Self {
        self.github_token = token;
        self
    }

    async fn search_github(&self, keyword: &str) -> Result<Vec<TechItem>> {
        let url = format!("{}/search/repositories", self.github_url);
        let query = format!("{} stars:>={}", keyword, self.min_stars);
        let per_page = self.max_results.min(30).to_string();
        debug!("Querying GitHub: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        if let Some(token) = &self.github_token {
            request = request.header("Authorization", format!("token {}", token.expose()));
        }

        let response = request.send().await?;

        if let Some(remaining) = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        {
            if remaining < RATE_LIMIT_WARN_BELOW {
                warn!("GitHub API rate limit low ({} remaining)", remaining);
            }
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChecklistError::provider(
                "github",
                format!("API error {}: {}", status, text),
            ));
        }

        let body: GithubSearchResponse = response.json().await?;
        let now = Utc::now();
        Ok(body
            .items
            .into_iter()
            .map(|repo| {
                let days = (now - repo.updated_at).num_days();
                TechItem {
                    popularity_score: github_popularity(
                        repo.stargazers_count,
                        repo.forks_count,
                        repo.watchers_count,
                        days,
                    ),
                    name: repo.name,
                    url: repo.html_url,
                    description: repo.description.unwrap_or_default(),
                    stars: repo.stargazers_count,
                    forks: repo.forks_count,
                    language: repo.language,
                    kind: TechKind::Repository,
                    is_active: days < ACTIVE_WITHIN_DAYS,
                    source: "GitHub".to_string(),
                }
            })
            .collect())
    }

    async fn search_npm(&self, keyword: &str) -> Result<Vec<TechItem>> {
        let url = format!("{}/-/v1/search", self.npm_url);
        let size = self.max_results.min(20).to_string();
        debug!("Querying npm: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("text", keyword), ("size", size.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChecklistError::provider(
                "npm",
                format!("API error {}: {}", status, text),
            ));
        }

        let body: NpmSearchResponse = response.json().await?;
        Ok(body
            .objects
            .into_iter()
            .map(|obj| TechItem {
                url: obj
                    .package
                    .links
                    .npm
                    .unwrap_or_else(|| format!("https://www.npmjs.com/package/{}", obj.package.name)),
                name: obj.package.name,
                description: obj.package.description.unwrap_or_default(),
                stars: 0,
                forks: 0,
                language: None,
                kind: TechKind::Package,
                is_active: false,
                popularity_score: obj.score.detail.popularity,
                source: "npm".to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl SourceProvider for TechProvider {
    fn name(&self) -> &str {
        "tech"
    }

    fn kind(&self) -> ResearchKind {
        ResearchKind::Tech
    }

    async fn search(&self, keyword: &str) -> Result<Vec<ResearchItem>> {
        let (github, npm) = tokio::join!(self.search_github(keyword), self.search_npm(keyword));

        let mut items = Vec::new();
        match github {
            Ok(found) => items.extend(found),
            Err(e) => warn!("GitHub search failed: {}", e),
        }
        match npm {
            Ok(found) => items.extend(found),
            Err(e) => warn!("npm search failed: {}", e),
        }

        sort_desc_by(&mut items, |t| t.popularity_score);
        items.truncate(self.max_results);

        debug!("Collected {} tech items for '{}'", items.len(), keyword);
        Ok(items.into_iter().map(ResearchItem::Tech).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn tech(items: Vec<ResearchItem>) -> Vec<TechItem> {
        items
            .into_iter()
            .filter_map(|i| match i {
                ResearchItem::Tech(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn github_body(updated_at: &str) -> String {
        format!(
            r#"{{
                "total_count": 1,
                "items": [{{
                    "name": "evac-sim",
                    "full_name": "acme/evac-sim",
                    "description": "Evacuation simulator",
                    "html_url": "https://github.com/acme/evac-sim",
                    "stargazers_count": 99999,
                    "forks_count": 0,
                    "watchers_count": 0,
                    "language": "Rust",
                    "updated_at": "{}"
                }}]
            }}"#,
            updated_at
        )
    }

    const NPM_BODY: &str = r#"{
        "objects": [
            {
                "package": {
                    "name": "quake-alert",
                    "description": "Earthquake alert client",
                    "links": {"npm": "https://www.npmjs.com/package/quake-alert"}
                },
                "score": {"final": 0.4, "detail": {"popularity": 0.12}}
            }
        ]
    }"#;

    #[test]
    fn test_github_popularity_freshness_bonus() {
        let stale = github_popularity(1000, 0, 0, 365);
        let recent = github_popularity(1000, 0, 0, 60);
        let fresh = github_popularity(1000, 0, 0, 5);
        assert!(stale < recent && recent < fresh);
        // log10(1001) / 5
        assert_eq!(stale, 0.6);
    }

    #[test]
    fn test_github_popularity_capped() {
        assert_eq!(github_popularity(10_000_000, 1_000_000, 0, 0), 1.0);
        assert_eq!(github_popularity(0, 0, 0, 0), 0.0);
    }

    #[tokio::test]
    async fn test_merges_and_sorts_by_popularity() {
        let updated = (Utc::now() - chrono::Duration::days(10)).format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let mut server = Server::new_async().await;
        let gh = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::UrlEncoded("q".into(), "flood stars:>=10".into()))
            .match_header("authorization", "token ghp_abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("X-RateLimit-Remaining", "42")
            .with_body(github_body(&updated))
            .create_async()
            .await;
        let npm = server
            .mock("GET", "/-/v1/search")
            .match_query(Matcher::UrlEncoded("text".into(), "flood".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(NPM_BODY)
            .create_async()
            .await;

        let provider = TechProvider::new(server.url(), server.url(), 10, 10, 5)
            .unwrap()
            .with_github_token(Some(SecretString::from("ghp_abc".to_string())));
        let items = tech(provider.search("flood").await.unwrap());

        gh.assert_async().await;
        npm.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "evac-sim");
        assert_eq!(items[0].kind, TechKind::Repository);
        assert!(items[0].is_active);
        assert_eq!(items[0].language.as_deref(), Some("Rust"));
        assert_eq!(items[1].name, "quake-alert");
        assert_eq!(items[1].kind, TechKind::Package);
        assert_eq!(items[1].popularity_score, 0.12);
    }

    #[tokio::test]
    async fn test_stale_repo_is_inactive() {
        let mut server = Server::new_async().await;
        let _gh = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(github_body("2015-01-01T00:00:00Z"))
            .create_async()
            .await;
        let _npm = server
            .mock("GET", "/-/v1/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let provider = TechProvider::new(server.url(), server.url(), 10, 10, 5).unwrap();
        let items = tech(provider.search("flood").await.unwrap());
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_active);
    }

    #[tokio::test]
    async fn test_github_failure_keeps_npm() {
        let mut server = Server::new_async().await;
        let _gh = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;
        let _npm = server
            .mock("GET", "/-/v1/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(NPM_BODY)
            .create_async()
            .await;

        let provider = TechProvider::new(server.url(), server.url(), 10, 10, 5).unwrap();
        let items = tech(provider.search("quake").await.unwrap());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "npm");
    }
}
