//! Integration tests for selection, enrichment, summaries and the
//! end-to-end generation path.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use safecheck::catalog::{Catalog, CheckPhase, FacilityType, FocusArea, Importance};
use safecheck::export;
use safecheck::pipeline::summary::{SUFFICIENT_RESEARCH, THIN_COVERAGE};
use safecheck::pipeline::{enrich, select, summarize, ChecklistGenerator, GenerationRequest};
use safecheck::providers::{ProviderSet, StaticProvider};
use safecheck::research::{PaperItem, ResearchBundle, ResearchItem, ResearchKind, WebItem};

fn web(title: &str, credibility: f64) -> WebItem {
    WebItem {
        title: title.to_string(),
        url: "https://example.org/page".to_string(),
        source: "Example".to_string(),
        source_type: "government".to_string(),
        summary: String::new(),
        published_date: "2026-01-01".to_string(),
        credibility_score: credibility,
    }
}

fn paper(title: &str) -> PaperItem {
    PaperItem {
        title: title.to_string(),
        url: "https://doi.org/10.1/p".to_string(),
        authors: vec!["A. Author".to_string()],
        year: Some(2025),
        abstract_text: String::new(),
        citations: 4,
        venue: "Safety Science".to_string(),
        doi: None,
        source: "CrossRef".to_string(),
        relevance_score: 0.8,
    }
}

#[test]
fn test_every_category_selected_for_all_labels() {
    let expected = Catalog::global().category_ids();
    let mut phases: Vec<&str> = CheckPhase::ALL.iter().map(|p| p.label()).collect();
    phases.push("not a phase");
    let mut facilities: Vec<&str> = FacilityType::ALL.iter().map(|f| f.label()).collect();
    facilities.push("spaceport");

    for facility in &facilities {
        for phase in &phases {
            let skeleton = select(facility, phase, None);
            let ids: Vec<&str> = skeleton.keys().map(String::as_str).collect();
            assert_eq!(ids, expected, "{} / {}", facility, phase);
        }
    }
}

#[test]
fn test_initial_assessment_drops_low_only() {
    let initial = select("other", "initial assessment", None);
    assert!(initial
        .values()
        .flat_map(|c| &c.questions)
        .all(|q| q.importance != Importance::Low));

    let catalog = Catalog::global();
    for phase in ["regular inspection", "disaster occurring", "post-recovery", "whatever"] {
        let skeleton = select("other", phase, None);
        for template in catalog.templates() {
            assert_eq!(
                skeleton[&template.info.id].questions.len(),
                template.questions.len(),
                "phase {}",
                phase
            );
        }
    }
}

#[test]
fn test_focus_only_promotes_medium_in_mapped_categories() {
    let catalog = Catalog::global();
    for area in FocusArea::ALL {
        let skeleton = select("other", "regular inspection", Some(area.label()));
        for template in catalog.templates() {
            let mapped = area.categories().contains(&template.info.id.as_str());
            let selected = &skeleton[&template.info.id].questions;
            for (before, after) in template.questions.iter().zip(selected) {
                assert!(after.importance.rank() >= before.importance.rank());
                if after.importance != before.importance {
                    assert!(mapped);
                    assert_eq!(before.importance, Importance::Medium);
                    assert_eq!(after.importance, Importance::High);
                }
            }
        }
    }
}

#[test]
fn test_focus_does_not_leak_between_runs() {
    let _ = select("other", "regular inspection", Some("safety-focused"));
    let plain = select("other", "regular inspection", None);
    for template in Catalog::global().templates() {
        assert_eq!(plain[&template.info.id].questions, template.questions);
    }
}

#[test]
fn test_enrich_empty_research_flags_everything() {
    let skeleton = select("construction", "regular inspection", None);
    let checklist = enrich(&skeleton, &ResearchBundle::new(), "Test Site");
    for category in checklist.values() {
        assert_eq!(category.total_resources, 0);
        for q in &category.questions {
            assert_eq!(q.resource_count, 0);
            assert!(q.related_resources.is_empty());
            assert!(q.needs_more_research);
        }
    }
}

#[test]
fn test_enrich_case_insensitive_and_totals_consistent() {
    let skeleton = select("construction", "regular inspection", None);
    let mut research = ResearchBundle::new();
    research.web.push(web("Fire Safety Drill", 0.9));
    research.papers.push(paper("Unrelated topic"));

    let checklist = enrich(&skeleton, &research, "zzz");

    let fire_questions: Vec<_> = checklist
        .values()
        .flat_map(|c| &c.questions)
        .filter(|q| {
            q.question
                .research_keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case("fire"))
        })
        .collect();
    assert!(!fire_questions.is_empty());
    for q in fire_questions {
        assert_eq!(q.related_resources[0].title(), "Fire Safety Drill");
    }

    for category in checklist.values() {
        let sum: usize = category.questions.iter().map(|q| q.resource_count).sum();
        assert_eq!(category.total_resources, sum);
        for q in &category.questions {
            assert!(q.resource_count <= 5);
            assert_eq!(q.resource_count, q.related_resources.len());
        }
    }
}

#[test]
fn test_enrich_is_deterministic() -> Result<()> {
    let skeleton = select("construction", "regular inspection", Some("response-focused"));
    let mut research = ResearchBundle::new();
    for i in 0..8 {
        research.web.push(web(&format!("Test Site guide {}", i), 0.7));
    }
    let a = serde_json::to_string(&enrich(&skeleton, &research, "Test Site"))?;
    let b = serde_json::to_string(&enrich(&skeleton, &research, "Test Site"))?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_recommendations_follow_paper_count() {
    let mut research = ResearchBundle::new();
    for i in 0..3 {
        research.papers.push(paper(&format!("p{}", i)));
    }
    let (_, recs) = summarize(&research, 2026);
    assert!(recs.contains(&THIN_COVERAGE.to_string()));
    assert!(!recs.contains(&SUFFICIENT_RESEARCH.to_string()));

    for i in 3..21 {
        research.papers.push(paper(&format!("p{}", i)));
    }
    let (_, recs) = summarize(&research, 2026);
    assert_eq!(recs, vec![SUFFICIENT_RESEARCH.to_string()]);
}

#[tokio::test]
async fn test_end_to_end_without_collection() -> Result<()> {
    let generator = ChecklistGenerator::new(ProviderSet::mock());
    let request =
        GenerationRequest::new("Test Site", "construction", "regular inspection").with_collect(false);
    let result = generator.generate(&request).await?;

    let ids: Vec<&str> = result.checklist.keys().map(String::as_str).collect();
    assert_eq!(ids, Catalog::global().category_ids());
    assert_eq!(result.question_count(), Catalog::global().question_count());
    for q in result.checklist.values().flat_map(|c| &c.questions) {
        assert_eq!(q.resource_count, 0);
        assert!(q.needs_more_research);
    }

    let summary = &result.research_summary;
    assert_eq!(
        (summary.web_sources, summary.papers, summary.tech_projects, summary.apis),
        (0, 0, 0, 0)
    );
    assert_eq!(summary.total_resources, 0);
    assert_eq!(result.recommendations, vec![THIN_COVERAGE.to_string()]);
    assert_eq!(result.metadata.focus_area, None);
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_with_collection_and_round_trip() -> Result<()> {
    let providers = ProviderSet::empty().with(Box::new(StaticProvider::new(
        ResearchKind::Web,
        vec![
            ResearchItem::Web(web("Test Site evacuation plan", 0.95)),
            ResearchItem::Web(web("Test Site fire inspection", 0.85)),
        ],
    )));
    let generator = ChecklistGenerator::new(providers);
    let request = GenerationRequest::new("Test Site", "construction", "initial assessment")
        .with_focus(Some("safety-focused".to_string()));
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
    let result = generator.generate_at(&request, now).await?;

    assert_eq!(result.research_summary.web_sources, 2);
    for q in result.checklist.values().flat_map(|c| &c.questions) {
        assert_eq!(q.resource_count, 2);
        assert!(q.needs_more_research);
        assert_eq!(q.related_resources[0].title(), "Test Site evacuation plan");
    }

    let json = export::to_structured(&result)?;
    assert_eq!(export::from_structured(&json)?, result);
    Ok(())
}
