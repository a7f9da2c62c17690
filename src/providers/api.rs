use async_trait::async_trait;
use tracing::debug;

use super::SourceProvider;
use crate::error::Result;
use crate::research::{ApiItem, ResearchItem, ResearchKind};
use crate::util::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Catalog {
    /// National public-data portal; keyed access
    Domestic,
    International,
    ThirdParty,
}

impl Catalog {
    fn source(&self) -> &'static str {
        match self {
            Catalog::Domestic => "Public Data Portal",
            Catalog::International => "International Open Data",
            Catalog::ThirdParty => "Third-party API",
        }
    }

    fn api_key_required(&self) -> bool {
        !matches!(self, Catalog::International)
    }

    fn cost(&self) -> &'static str {
        match self {
            Catalog::ThirdParty => "Free (with limits)",
            _ => "Free",
        }
    }
}

struct Entry {
    catalog: Catalog,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    provider: &'static str,
    url: &'static str,
    data_format: &'static str,
    usage_policy: &'static str,
    commercial_use: bool,
    tags: &'static [&'static str],
}

const ENTRIES: &[Entry] = &[
    Entry {
        catalog: Catalog::Domestic,
        name: "Weather Warning and Advisory Service",
        category: "weather",
        description: "Official severe weather warnings, advisories and forecasts by region",
        provider: "Meteorological Administration",
        url: "https://www.data.go.kr/data/15000415/openapi.do",
        data_format: "JSON, XML",
        usage_policy: "Open API (key required)",
        commercial_use: true,
        tags: &["weather", "typhoon", "storm", "heavy rain", "heat wave", "snow"],
    },
    Entry {
        catalog: Catalog::Domestic,
        name: "Earthquake and Tsunami Alert Service",
        category: "disaster",
        description: "Earthquake occurrence reports and tsunami warnings",
        provider: "Meteorological Administration",
        url: "https://www.data.go.kr/data/15000420/openapi.do",
        data_format: "JSON, XML",
        usage_policy: "Open API (key required)",
        commercial_use: true,
        tags: &["earthquake", "tsunami", "seismic"],
    },
    Entry {
        catalog: Catalog::Domestic,
        name: "Fire Incident Statistics",
        category: "safety",
        description: "Fire incidents by cause, location type and damage",
        provider: "National Fire Agency",
        url: "https://www.data.go.kr/data/15065174/openapi.do",
        data_format: "JSON, XML",
        usage_policy: "Open API (key required)",
        commercial_use: true,
        tags: &["fire", "firefighting", "sprinkler", "extinguisher"],
    },
    Entry {
        catalog: Catalog::Domestic,
        name: "Civil Defense Shelter Locations",
        category: "safety",
        description: "Evacuation shelters and civil defense facilities with capacity",
        provider: "Ministry of the Interior and Safety",
        url: "https://www.data.go.kr/data/15090507/openapi.do",
        data_format: "JSON, XML",
        usage_policy: "Open API (key required)",
        commercial_use: true,
        tags: &["shelter", "evacuation", "refuge"],
    },
    Entry {
        catalog: Catalog::Domestic,
        name: "Industrial Accident Statistics",
        category: "occupational safety",
        description: "Workplace injuries and fatalities by industry and accident type",
        provider: "Occupational Safety and Health Agency",
        url: "https://www.data.go.kr/data/15059466/openapi.do",
        data_format: "JSON, XML",
        usage_policy: "Open API (key required)",
        commercial_use: true,
        tags: &["construction", "industrial", "accident", "factory", "manufacturing"],
    },
    Entry {
        catalog: Catalog::International,
        name: "USGS Earthquake Catalog API",
        category: "disaster",
        description: "Real-time and historical earthquake events worldwide",
        provider: "U.S. Geological Survey",
        url: "https://earthquake.usgs.gov/fdsnws/event/1/",
        data_format: "GeoJSON, XML, CSV",
        usage_policy: "Open Data (free)",
        commercial_use: true,
        tags: &["earthquake", "seismic", "quake"],
    },
    Entry {
        catalog: Catalog::International,
        name: "GDACS Disaster Alerts",
        category: "disaster",
        description: "Global alerts for floods, cyclones, earthquakes and volcanoes",
        provider: "European Commission JRC / UN OCHA",
        url: "https://www.gdacs.org/gdacsapi/swagger/index.html",
        data_format: "JSON, XML",
        usage_policy: "Open Data (free)",
        commercial_use: true,
        tags: &["disaster", "flood", "cyclone", "volcano", "alert"],
    },
    Entry {
        catalog: Catalog::International,
        name: "ReliefWeb API",
        category: "humanitarian",
        description: "Disaster situation reports and humanitarian updates",
        provider: "UN OCHA",
        url: "https://apidoc.reliefweb.int",
        data_format: "JSON",
        usage_policy: "Open Data (free)",
        commercial_use: true,
        tags: &["disaster", "emergency", "relief", "recovery"],
    },
    Entry {
        catalog: Catalog::ThirdParty,
        name: "OpenWeatherMap API",
        category: "weather",
        description: "Current weather, forecasts and severe weather alerts",
        provider: "OpenWeatherMap",
        url: "https://openweathermap.org/api",
        data_format: "JSON, XML",
        usage_policy: "Free plan (key required)",
        commercial_use: true,
        tags: &["weather", "forecast", "storm", "heat"],
    },
    Entry {
        catalog: Catalog::ThirdParty,
        name: "Twilio Messaging API",
        category: "notification",
        description: "SMS and voice notification for emergency contact trees",
        provider: "Twilio",
        url: "https://www.twilio.com/docs/messaging",
        data_format: "JSON",
        usage_policy: "Pay as you go (key required)",
        commercial_use: true,
        tags: &["notification", "alert", "emergency contact", "sms"],
    },
];

/// Name hit 0.4, description hit 0.3, tag hit 0.3; capped at 1.
fn relevance(entry: &Entry, keyword_lower: &str) -> f64 {
    let mut score: f64 = 0.0;
    if entry.name.to_lowercase().contains(keyword_lower) {
        score += 0.4;
    }
    if entry.description.to_lowercase().contains(keyword_lower) {
        score += 0.3;
    }
    if tag_hit(entry, keyword_lower) {
        score += 0.3;
    }
    score.min(1.0)
}

/// A tag matches when it occurs inside the keyword ("construction site" hits "construction").
fn tag_hit(entry: &Entry, keyword_lower: &str) -> bool {
    entry.tags.iter().any(|tag| keyword_lower.contains(tag))
}

fn matches(entry: &Entry, keyword_lower: &str) -> bool {
    if tag_hit(entry, keyword_lower) {
        return true;
    }
    entry.catalog == Catalog::Domestic
        && (entry.name.to_lowercase().contains(keyword_lower)
            || entry.description.to_lowercase().contains(keyword_lower))
}

/// Curated catalog of public-data and third-party APIs useful for safety monitoring.
pub struct ApiProvider {
    public_data_key: Option<SecretString>,
}

impl Default for ApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiProvider {
    pub fn new() -> Self {
        Self {
            public_data_key: None,
        }
    }

    pub fn with_public_data_key(mut self, key: Option<SecretString>) -> Self {
        self.public_data_key = key;
        self
    }

    fn item(&self, entry: &Entry, keyword_lower: &str) -> ApiItem {
        // Portal entries are usable as-is once a portal key is configured
        let usage_policy = if entry.catalog == Catalog::Domestic && self.public_data_key.is_some() {
            "Open API (key configured)".to_string()
        } else {
            entry.usage_policy.to_string()
        };
        ApiItem {
            name: entry.name.to_string(),
            url: entry.url.to_string(),
            description: entry.description.to_string(),
            provider: entry.provider.to_string(),
            category: entry.category.to_string(),
            data_format: entry.data_format.to_string(),
            usage_policy,
            commercial_use: entry.commercial_use,
            api_key_required: entry.catalog.api_key_required(),
            cost: entry.catalog.cost().to_string(),
            source: entry.catalog.source().to_string(),
            relevance_score: relevance(entry, keyword_lower),
        }
    }
}

#[async_trait]
impl SourceProvider for ApiProvider {
    fn name(&self) -> &str {
        "apis"
    }

    fn kind(&self) -> ResearchKind {
        ResearchKind::Api
    }

    async fn search(&self, keyword: &str) -> Result<Vec<ResearchItem>> {
        let keyword_lower = keyword.trim().to_lowercase();
        if keyword_lower.is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<ResearchItem> = ENTRIES
            .iter()
            .filter(|entry| matches(entry, &keyword_lower))
            .map(|entry| ResearchItem::Api(self.item(entry, &keyword_lower)))
            .collect();

        debug!("API catalog matched {} entries for '{}'", items.len(), keyword);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn names(provider: &ApiProvider, keyword: &str) -> Vec<String> {
        provider
            .search(keyword)
            .await
            .unwrap()
            .iter()
            .map(|i| i.title().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_tag_inside_keyword_matches() {
        let provider = ApiProvider::new();
        let found = names(&provider, "Construction Site").await;
        assert_eq!(found, vec!["Industrial Accident Statistics"]);
    }

    #[tokio::test]
    async fn test_earthquake_hits_domestic_and_international() {
        let provider = ApiProvider::new();
        let found = names(&provider, "earthquake drill").await;
        assert_eq!(
            found,
            vec!["Earthquake and Tsunami Alert Service", "USGS Earthquake Catalog API"]
        );
    }

    #[tokio::test]
    async fn test_domestic_matches_on_description() {
        let provider = ApiProvider::new();
        // no tag is contained in "capacity", but a portal description mentions it
        let found = names(&provider, "capacity").await;
        assert_eq!(found, vec!["Civil Defense Shelter Locations"]);
    }

    #[tokio::test]
    async fn test_no_match_and_empty_keyword() {
        let provider = ApiProvider::new();
        assert!(names(&provider, "zzz").await.is_empty());
        assert!(names(&provider, "   ").await.is_empty());
    }

    #[test]
    fn test_relevance_weights() {
        let fire = ENTRIES.iter().find(|e| e.name == "Fire Incident Statistics").unwrap();
        // tag only
        assert_eq!(relevance(fire, "fire safety"), 0.3);
        // name + description + tag
        assert_eq!(relevance(fire, "fire"), 1.0);
    }

    #[tokio::test]
    async fn test_fields_per_catalog() {
        let provider = ApiProvider::new();
        let items = provider.search("flood").await.unwrap();
        let ResearchItem::Api(gdacs) = &items[0] else {
            panic!("expected api item");
        };
        assert_eq!(gdacs.source, "International Open Data");
        assert!(!gdacs.api_key_required);
        assert_eq!(gdacs.cost, "Free");
    }

    #[tokio::test]
    async fn test_configured_key_changes_portal_policy() {
        let provider =
            ApiProvider::new().with_public_data_key(Some(SecretString::from("k".to_string())));
        let items = provider.search("typhoon").await.unwrap();
        let ResearchItem::Api(weather) = &items[0] else {
            panic!("expected api item");
        };
        assert_eq!(weather.usage_policy, "Open API (key configured)");
        assert!(weather.api_key_required);
    }
}
