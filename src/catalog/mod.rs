//! Static question bank for disaster/safety inspections.
//!
//! The catalog is built once and never mutated. Anything that needs to adjust
//! a question (focus-area promotion, phase pruning) works on a clone produced
//! by [`crate::pipeline::selector`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }

    /// Numeric rank, higher is more important.
    pub fn rank(&self) -> u8 {
        match self {
            Importance::High => 2,
            Importance::Medium => 1,
            Importance::Low => 0,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Importance::High => "🔴",
            Importance::Medium => "🟡",
            Importance::Low => "🟢",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a question is answered. Options only exist for single-select questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerFormat {
    Text,
    Select { options: Vec<String> },
}

impl AnswerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerFormat::Text => "text",
            AnswerFormat::Select { .. } => "select",
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            AnswerFormat::Text => &[],
            AnswerFormat::Select { options } => options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category_id: String,
    pub prompt: String,
    pub answer: AnswerFormat,
    pub importance: Importance,
    pub required: bool,
    pub research_keywords: Vec<String>,
}

/// A category together with its questions, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTemplate {
    pub info: Category,
    pub questions: Vec<Question>,
}

#[derive(Debug)]
pub struct Catalog {
    templates: Vec<CategoryTemplate>,
}

static CATALOG: Lazy<Catalog> = Lazy::new(Catalog::build);

impl Catalog {
    /// The shared, read-only catalog.
    pub fn global() -> &'static Catalog {
        &CATALOG
    }

    pub fn templates(&self) -> &[CategoryTemplate] {
        &self.templates
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.templates.iter().map(|t| &t.info)
    }

    pub fn category_ids(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.info.id.as_str()).collect()
    }

    pub fn template(&self, category_id: &str) -> Option<&CategoryTemplate> {
        self.templates.iter().find(|t| t.info.id == category_id)
    }

    pub fn question_count(&self) -> usize {
        self.templates.iter().map(|t| t.questions.len()).sum()
    }

    /// Unique lookup keywords, for one category or the whole catalog.
    pub fn research_keywords(&self, category_id: Option<&str>) -> Vec<String> {
        let mut keywords: Vec<String> = self
            .templates
            .iter()
            .filter(|t| category_id.is_none_or(|id| t.info.id == id))
            .flat_map(|t| t.questions.iter())
            .flat_map(|q| q.research_keywords.iter().cloned())
            .collect();
        keywords.sort();
        keywords.dedup();
        keywords
    }

    fn build() -> Self {
        let templates = vec![
            CategoryTemplate {
                info: category(
                    "risk_assessment",
                    "Risk Assessment",
                    "Disaster history, geographic hazards, vulnerability analysis",
                    "⚠️",
                    10,
                ),
                questions: vec![
                    question(
                        "risk_01",
                        "risk_assessment",
                        "Which major disasters occurred in the last 5 years? (fire, flooding, earthquake, ...)",
                        AnswerFormat::Text,
                        Importance::High,
                        true,
                        &["disaster history", "past incidents", "damage records"],
                    ),
                    question(
                        "risk_02",
                        "risk_assessment",
                        "What is the regional disaster risk level? (flood, earthquake, landslide, ...)",
                        select(&["High", "Medium", "Low", "Unknown"]),
                        Importance::High,
                        true,
                        &["hazard map", "regional risk", "natural hazard"],
                    ),
                    question(
                        "risk_03",
                        "risk_assessment",
                        "Have the structural weaknesses of the facility been identified?",
                        select(&["Identified", "In progress", "Not identified"]),
                        Importance::High,
                        true,
                        &["structural safety", "seismic design", "aging building"],
                    ),
                    question(
                        "risk_04",
                        "risk_assessment",
                        "What hazards exist nearby? (hazardous material storage, gas facilities, ...)",
                        AnswerFormat::Text,
                        Importance::Medium,
                        false,
                        &["nearby hazards", "surroundings", "hazardous facility"],
                    ),
                ],
            },
            CategoryTemplate {
                info: category(
                    "disaster_prep",
                    "Disaster Preparedness",
                    "Evacuation plans, emergency supplies, education and drills",
                    "🛡️",
                    9,
                ),
                questions: vec![
                    question(
                        "prep_01",
                        "disaster_prep",
                        "Is an evacuation plan in place? (routes, shelters, signage)",
                        select(&["Complete", "In progress", "None"]),
                        Importance::High,
                        true,
                        &["evacuation plan", "evacuation route", "shelter"],
                    ),
                    question(
                        "prep_02",
                        "disaster_prep",
                        "Are emergency supplies stocked? (relief goods, emergency food, first aid)",
                        select(&["Sufficient", "Insufficient", "None"]),
                        Importance::High,
                        true,
                        &["emergency supplies", "relief goods", "disaster kit"],
                    ),
                    question(
                        "prep_03",
                        "disaster_prep",
                        "Are disaster response education and drills carried out?",
                        select(&["Regularly", "Irregularly", "Never"]),
                        Importance::High,
                        true,
                        &["drill", "safety training", "evacuation drill"],
                    ),
                    question(
                        "prep_04",
                        "disaster_prep",
                        "Does fire suppression equipment (extinguishers, sprinklers) work correctly?",
                        select(&["Working", "Partially broken", "Needs inspection"]),
                        Importance::High,
                        true,
                        &["fire", "extinguisher", "sprinkler"],
                    ),
                ],
            },
            CategoryTemplate {
                info: category(
                    "safety_check",
                    "Safety Inspection",
                    "Facility inspection, equipment management, hazardous materials",
                    "🔍",
                    9,
                ),
                questions: vec![
                    question(
                        "safety_01",
                        "safety_check",
                        "How often are buildings and structures inspected?",
                        select(&["Monthly", "Quarterly", "Yearly", "Never"]),
                        Importance::High,
                        true,
                        &["facility safety", "periodic inspection", "structure inspection"],
                    ),
                    question(
                        "safety_02",
                        "safety_check",
                        "Are electrical and gas installations inspected regularly?",
                        select(&["Regularly", "Irregularly", "Never"]),
                        Importance::High,
                        true,
                        &["electrical safety", "gas inspection", "equipment maintenance"],
                    ),
                    question(
                        "safety_03",
                        "safety_check",
                        "Are hazardous materials (chemicals, flammables) stored safely?",
                        select(&["Stored safely", "Partially lacking", "Not applicable"]),
                        Importance::High,
                        true,
                        &["hazardous materials", "chemical", "safe storage"],
                    ),
                    question(
                        "safety_04",
                        "safety_check",
                        "Do CCTV and alarm systems work correctly?",
                        select(&["Working", "Partially broken", "None"]),
                        Importance::Medium,
                        false,
                        &["cctv", "alarm system", "surveillance"],
                    ),
                ],
            },
            CategoryTemplate {
                info: category(
                    "emergency_response",
                    "Emergency Response",
                    "Emergency contacts, response organization, real-time monitoring",
                    "🚨",
                    10,
                ),
                questions: vec![
                    question(
                        "emerg_01",
                        "emergency_response",
                        "Is a 24-hour emergency contact network in place?",
                        select(&["In place", "In progress", "None"]),
                        Importance::High,
                        true,
                        &["emergency contact", "urgent communication", "24-hour response"],
                    ),
                    question(
                        "emerg_02",
                        "emergency_response",
                        "Are the response organization and roles clearly defined?",
                        select(&["Clear", "Partially unclear", "Unclear"]),
                        Importance::High,
                        true,
                        &["response organization", "role assignment", "command structure"],
                    ),
                    question(
                        "emerg_03",
                        "emergency_response",
                        "Can the disaster situation be monitored in real time?",
                        select(&["Yes", "Partially", "No"]),
                        Importance::High,
                        true,
                        &["real-time monitoring", "disaster detection", "situational awareness"],
                    ),
                    question(
                        "emerg_04",
                        "emergency_response",
                        "Is there a procedure for requesting outside help? (fire department, police, local government)",
                        select(&["In place", "Under review", "None"]),
                        Importance::Medium,
                        false,
                        &["external support", "rescue request", "cooperation procedure"],
                    ),
                ],
            },
            CategoryTemplate {
                info: category(
                    "legal_compliance",
                    "Legal & Certification",
                    "Safety regulations, mandatory certifications, periodic reporting",
                    "📋",
                    8,
                ),
                questions: vec![
                    question(
                        "legal_01",
                        "legal_compliance",
                        "Are the applicable safety laws complied with? (disaster safety act, fire code, ...)",
                        select(&["Compliant", "Partially lacking", "Non-compliant", "Unknown"]),
                        Importance::High,
                        true,
                        &["disaster safety act", "fire code", "safety regulation"],
                    ),
                    question(
                        "legal_02",
                        "legal_compliance",
                        "Have the required safety certifications been obtained? (fire, gas, electrical)",
                        select(&["Obtained", "In progress", "Not obtained", "Not applicable"]),
                        Importance::High,
                        true,
                        &["safety certification", "fire certification", "statutory certification"],
                    ),
                    question(
                        "legal_03",
                        "legal_compliance",
                        "Are periodic safety reports submitted?",
                        select(&["Submitted regularly", "Not submitted", "Not applicable"]),
                        Importance::Medium,
                        false,
                        &["safety report", "periodic report", "statutory report"],
                    ),
                ],
            },
            CategoryTemplate {
                info: category(
                    "organization",
                    "Organization & Accountability",
                    "Safety manager, role assignment, budget",
                    "👥",
                    7,
                ),
                questions: vec![
                    question(
                        "org_01",
                        "organization",
                        "Is a dedicated safety manager appointed?",
                        select(&["Appointed", "Concurrent role", "Not appointed"]),
                        Importance::High,
                        true,
                        &["safety manager", "safety officer", "responsible person"],
                    ),
                    question(
                        "org_02",
                        "organization",
                        "Is a safety budget secured?",
                        select(&["Sufficient", "Insufficient", "None"]),
                        Importance::High,
                        true,
                        &["safety budget", "disaster budget", "investment"],
                    ),
                    question(
                        "org_03",
                        "organization",
                        "Is a disaster response manual written?",
                        select(&["Written", "In progress", "Not written"]),
                        Importance::Medium,
                        false,
                        &["response manual", "action guideline", "procedure document"],
                    ),
                ],
            },
            CategoryTemplate {
                info: category(
                    "monitoring",
                    "Monitoring & Improvement",
                    "Inspection records, follow-up actions, improvement activities",
                    "📊",
                    6,
                ),
                questions: vec![
                    question(
                        "mon_01",
                        "monitoring",
                        "Is the inspection history managed systematically?",
                        select(&["Managed", "Partially managed", "Not managed"]),
                        Importance::Medium,
                        true,
                        &["inspection history", "record keeping", "traceability"],
                    ),
                    question(
                        "mon_02",
                        "monitoring",
                        "Are identified problems followed up?",
                        select(&["Immediately", "Delayed", "Not followed up"]),
                        Importance::High,
                        true,
                        &["follow-up action", "corrective action", "aftercare"],
                    ),
                    question(
                        "mon_03",
                        "monitoring",
                        "Are safety improvement activities carried out regularly?",
                        select(&["Regularly", "Irregularly", "Never"]),
                        Importance::Medium,
                        false,
                        &["improvement activity", "continuous improvement", "safety enhancement"],
                    ),
                ],
            },
            CategoryTemplate {
                info: category(
                    "cooperation",
                    "Community Cooperation",
                    "Fire and police cooperation, joint local response, information sharing",
                    "🤝",
                    5,
                ),
                questions: vec![
                    question(
                        "coop_01",
                        "cooperation",
                        "Is there a cooperation framework with the fire department and police?",
                        select(&["Established", "In progress", "None"]),
                        Importance::High,
                        true,
                        &["fire department cooperation", "police cooperation", "related agencies"],
                    ),
                    question(
                        "coop_02",
                        "cooperation",
                        "Is there a joint response arrangement with neighbouring facilities?",
                        select(&["Established", "Under discussion", "None"]),
                        Importance::Medium,
                        false,
                        &["joint response", "regional cooperation", "mutual aid"],
                    ),
                    question(
                        "coop_03",
                        "cooperation",
                        "Is disaster information shared with the local community?",
                        select(&["Shared", "Partially shared", "Not shared"]),
                        Importance::Low,
                        false,
                        &["information sharing", "community sharing", "disaster information"],
                    ),
                ],
            },
        ];

        Self { templates }
    }
}

fn category(id: &str, name: &str, description: &str, icon: &str, priority: u8) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        priority,
    }
}

fn select(options: &[&str]) -> AnswerFormat {
    AnswerFormat::Select {
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

fn question(
    id: &str,
    category_id: &str,
    prompt: &str,
    answer: AnswerFormat,
    importance: Importance,
    required: bool,
    keywords: &[&str],
) -> Question {
    Question {
        id: id.to_string(),
        category_id: category_id.to_string(),
        prompt: prompt.to_string(),
        answer,
        importance,
        required,
        research_keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

// ============================================================================
// Request labels
// ============================================================================

/// Known facility types. Generation accepts any label; these are the ones the
/// CLI and dashboard offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityType {
    LocalGovernment,
    Construction,
    Manufacturing,
    Warehouse,
    Commercial,
    Educational,
    Medical,
    Residential,
    Other,
}

impl FacilityType {
    pub const ALL: [FacilityType; 9] = [
        FacilityType::LocalGovernment,
        FacilityType::Construction,
        FacilityType::Manufacturing,
        FacilityType::Warehouse,
        FacilityType::Commercial,
        FacilityType::Educational,
        FacilityType::Medical,
        FacilityType::Residential,
        FacilityType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FacilityType::LocalGovernment => "local government",
            FacilityType::Construction => "construction",
            FacilityType::Manufacturing => "manufacturing",
            FacilityType::Warehouse => "warehouse",
            FacilityType::Commercial => "commercial",
            FacilityType::Educational => "educational",
            FacilityType::Medical => "medical",
            FacilityType::Residential => "residential",
            FacilityType::Other => "other",
        }
    }
}

/// Inspection phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    Initial,
    Regular,
    Emergency,
    Recovery,
    Annual,
}

impl CheckPhase {
    pub const ALL: [CheckPhase; 5] = [
        CheckPhase::Initial,
        CheckPhase::Regular,
        CheckPhase::Emergency,
        CheckPhase::Recovery,
        CheckPhase::Annual,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CheckPhase::Initial => "initial assessment",
            CheckPhase::Regular => "regular inspection",
            CheckPhase::Emergency => "disaster occurring",
            CheckPhase::Recovery => "post-recovery",
            CheckPhase::Annual => "annual review",
        }
    }
}

impl FromStr for CheckPhase {
    type Err = ();

    /// Exact label match only; phase labels are compared by equality.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckPhase::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or(())
    }
}

/// Optional emphasis that promotes importance inside the mapped categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Safety,
    Legal,
    Prevention,
    Response,
}

impl FocusArea {
    pub const ALL: [FocusArea; 4] = [
        FocusArea::Safety,
        FocusArea::Legal,
        FocusArea::Prevention,
        FocusArea::Response,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::Safety => "safety-focused",
            FocusArea::Legal => "legal-focused",
            FocusArea::Prevention => "prevention-focused",
            FocusArea::Response => "response-focused",
        }
    }

    /// Category ids this focus area emphasizes.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            FocusArea::Safety => &["safety_check", "disaster_prep"],
            FocusArea::Legal => &["legal_compliance"],
            FocusArea::Prevention => &["risk_assessment", "monitoring"],
            FocusArea::Response => &["emergency_response", "cooperation"],
        }
    }
}

impl FromStr for FocusArea {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FocusArea::ALL
            .into_iter()
            .find(|f| f.label() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_eight_categories_in_order() {
        let ids = Catalog::global().category_ids();
        assert_eq!(
            ids,
            vec![
                "risk_assessment",
                "disaster_prep",
                "safety_check",
                "emergency_response",
                "legal_compliance",
                "organization",
                "monitoring",
                "cooperation",
            ]
        );
    }

    #[test]
    fn test_question_ids_unique_and_owned_by_their_category() {
        let catalog = Catalog::global();
        let mut seen = HashSet::new();
        for template in catalog.templates() {
            for q in &template.questions {
                assert!(seen.insert(q.id.clone()), "duplicate id {}", q.id);
                assert_eq!(q.category_id, template.info.id);
            }
        }
        assert_eq!(seen.len(), catalog.question_count());
        assert_eq!(catalog.question_count(), 28);
    }

    #[test]
    fn test_options_present_iff_select() {
        for template in Catalog::global().templates() {
            for q in &template.questions {
                match &q.answer {
                    AnswerFormat::Text => assert!(q.answer.options().is_empty()),
                    AnswerFormat::Select { options } => assert!(!options.is_empty()),
                }
            }
        }
    }

    #[test]
    fn test_every_question_has_keywords() {
        for template in Catalog::global().templates() {
            for q in &template.questions {
                assert!(!q.research_keywords.is_empty(), "{} has no keywords", q.id);
            }
        }
    }

    #[test]
    fn test_research_keywords_per_category_and_deduped() {
        let catalog = Catalog::global();
        let prep = catalog.research_keywords(Some("disaster_prep"));
        assert!(prep.contains(&"fire".to_string()));
        assert!(!prep.contains(&"cctv".to_string()));

        let all = catalog.research_keywords(None);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
        assert!(all.len() >= prep.len());
    }

    #[test]
    fn test_phase_and_focus_labels_round_trip() {
        for phase in CheckPhase::ALL {
            assert_eq!(CheckPhase::from_str(phase.label()), Ok(phase));
        }
        for focus in FocusArea::ALL {
            assert_eq!(FocusArea::from_str(focus.label()), Ok(focus));
        }
        assert!(CheckPhase::from_str("Initial Assessment").is_err());
        assert!(FocusArea::from_str("safety").is_err());
    }

    #[test]
    fn test_focus_categories_exist_in_catalog() {
        let catalog = Catalog::global();
        for focus in FocusArea::ALL {
            for id in focus.categories() {
                assert!(catalog.template(id).is_some(), "unknown category {}", id);
            }
        }
    }

    #[test]
    fn test_importance_serde_lowercase() {
        let json = serde_json::to_string(&Importance::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        assert!(Importance::High.rank() > Importance::Medium.rank());
        assert!(Importance::Medium.rank() > Importance::Low.rank());
    }
}
