use tracing::debug;

use super::{ApiProvider, MockProvider, PaperProvider, SourceProvider, TechProvider, WebProvider};
use crate::config::Config;
use crate::error::Result;
use crate::research::ResearchKind;

/// One optional provider per research bucket. `None` means the bucket is
/// disabled and stays empty.
#[derive(Default)]
pub struct ProviderSet {
    pub web: Option<Box<dyn SourceProvider>>,
    pub papers: Option<Box<dyn SourceProvider>>,
    pub tech: Option<Box<dyn SourceProvider>>,
    pub apis: Option<Box<dyn SourceProvider>>,
}

impl ProviderSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Put a provider into the slot matching its kind, replacing any previous one.
    pub fn with(mut self, provider: Box<dyn SourceProvider>) -> Self {
        match provider.kind() {
            ResearchKind::Web => self.web = Some(provider),
            ResearchKind::Paper => self.papers = Some(provider),
            ResearchKind::Tech => self.tech = Some(provider),
            ResearchKind::Api => self.apis = Some(provider),
        }
        self
    }

    /// Mock providers in every slot
    pub fn mock() -> Self {
        ResearchKind::ALL
            .into_iter()
            .fold(Self::empty(), |set, kind| set.with(Box::new(MockProvider::new(kind))))
    }

    pub fn enabled_count(&self) -> usize {
        [&self.web, &self.papers, &self.tech, &self.apis]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}

/// Build the four providers from configuration. Disabled sources get no provider.
pub fn create_providers(config: &Config, dry_run: bool) -> Result<ProviderSet> {
    if dry_run {
        debug!("Dry run: using mock providers");
        let mock = ProviderSet::mock();
        return Ok(ProviderSet {
            web: mock.web.filter(|_| config.web.enabled),
            papers: mock.papers.filter(|_| config.papers.enabled),
            tech: mock.tech.filter(|_| config.tech.enabled),
            apis: mock.apis.filter(|_| config.apis.enabled),
        });
    }

    let max = config.max_results_per_source;
    let timeout = config.provider_timeout_secs;
    let mut set = ProviderSet::empty();

    if config.web.enabled {
        set = set.with(Box::new(WebProvider::new(max)));
    }
    if config.papers.enabled {
        set = set.with(Box::new(PaperProvider::new(
            config.papers.semantic_scholar_url.clone(),
            config.papers.crossref_url.clone(),
            config.papers.arxiv_url.clone(),
            max,
            timeout,
        )?));
    }
    if config.tech.enabled {
        set = set.with(Box::new(
            TechProvider::new(
                config.tech.github_url.clone(),
                config.tech.npm_url.clone(),
                config.tech.github_min_stars,
                max,
                timeout,
            )?
            .with_github_token(config.github_token()),
        ));
    }
    if config.apis.enabled {
        set = set.with(Box::new(
            ApiProvider::new().with_public_data_key(config.public_data_key()),
        ));
    }

    debug!("Created {} source providers", set.enabled_count());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_enabled_by_default() {
        let set = create_providers(&Config::default(), false).unwrap();
        assert_eq!(set.enabled_count(), 4);
        assert_eq!(set.web.as_ref().unwrap().name(), "web");
        assert_eq!(set.papers.as_ref().unwrap().kind(), ResearchKind::Paper);
    }

    #[test]
    fn test_disabled_sources_have_no_provider() {
        let mut config = Config::default();
        config.papers.enabled = false;
        config.apis.enabled = false;
        let set = create_providers(&config, false).unwrap();
        assert_eq!(set.enabled_count(), 2);
        assert!(set.papers.is_none());
        assert!(set.apis.is_none());
    }

    #[test]
    fn test_dry_run_uses_mocks_and_honours_toggles() {
        let mut config = Config::default();
        config.tech.enabled = false;
        let set = create_providers(&config, true).unwrap();
        assert_eq!(set.enabled_count(), 3);
        assert_eq!(set.web.as_ref().unwrap().name(), "mock");
        assert!(set.tech.is_none());
    }
}
