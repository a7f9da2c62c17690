//! Attach research items to checklist questions by keyword containment.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::selector::ChecklistSkeleton;
use crate::catalog::{Category, Question};
use crate::research::{ResearchBundle, ResearchItem};

/// Matches kept per question.
pub const MAX_MATCHES: usize = 5;

/// Below this many matches a question is flagged for more research.
pub const MIN_MATCHES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedQuestion {
    pub question: Question,
    pub related_resources: Vec<ResearchItem>,
    pub resource_count: usize,
    pub needs_more_research: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCategory {
    pub info: Category,
    pub questions: Vec<EnrichedQuestion>,
    pub total_resources: usize,
}

pub type EnrichedChecklist = IndexMap<String, EnrichedCategory>;

/// Attach up to [`MAX_MATCHES`] research items to every question.
///
/// An item matches when its title/description text contains the primary
/// keyword or one of the question's lookup keywords, case-insensitively.
/// Matches are ranked by the item's relevance; equal scores keep bucket order
/// (web, papers, tech, apis) and provider order within a bucket.
pub fn enrich(skeleton: &ChecklistSkeleton, research: &ResearchBundle, keyword: &str) -> EnrichedChecklist {
    let candidates: Vec<(ResearchItem, String)> = research
        .items()
        .into_iter()
        .map(|item| {
            let text = item.matchable_text();
            (item, text)
        })
        .collect();
    let keyword = keyword.trim().to_lowercase();

    skeleton
        .iter()
        .map(|(id, category)| {
            let questions: Vec<EnrichedQuestion> = category
                .questions
                .iter()
                .map(|q| enrich_question(q, &candidates, &keyword))
                .collect();
            let total_resources = questions.iter().map(|q| q.resource_count).sum();
            (
                id.clone(),
                EnrichedCategory {
                    info: category.info.clone(),
                    questions,
                    total_resources,
                },
            )
        })
        .collect()
}

fn enrich_question(
    question: &Question,
    candidates: &[(ResearchItem, String)],
    keyword: &str,
) -> EnrichedQuestion {
    let terms: Vec<String> = std::iter::once(keyword.to_string())
        .chain(question.research_keywords.iter().map(|k| k.trim().to_lowercase()))
        .filter(|t| !t.is_empty())
        .collect();

    let mut matched: Vec<ResearchItem> = candidates
        .iter()
        .filter(|(_, text)| terms.iter().any(|t| text.contains(t.as_str())))
        .map(|(item, _)| item.clone())
        .collect();

    // stable: ties keep candidate order
    matched.sort_by(|a, b| b.relevance().total_cmp(&a.relevance()));
    matched.truncate(MAX_MATCHES);

    let resource_count = matched.len();
    EnrichedQuestion {
        question: question.clone(),
        related_resources: matched,
        resource_count,
        needs_more_research: resource_count < MIN_MATCHES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::selector::select;
    use crate::research::fixtures::*;

    fn question<'a>(checklist: &'a EnrichedChecklist, id: &str) -> &'a EnrichedQuestion {
        checklist
            .values()
            .flat_map(|c| c.questions.iter())
            .find(|q| q.question.id == id)
            .unwrap()
    }

    #[test]
    fn test_empty_research_flags_everything() {
        let skeleton = select("construction", "regular inspection", None);
        let checklist = enrich(&skeleton, &ResearchBundle::new(), "Test Site");
        for category in checklist.values() {
            assert_eq!(category.total_resources, 0);
            for q in &category.questions {
                assert!(q.related_resources.is_empty());
                assert_eq!(q.resource_count, 0);
                assert!(q.needs_more_research);
            }
        }
    }

    #[test]
    fn test_case_insensitive_lookup_keyword_match() {
        let skeleton = select("construction", "regular inspection", None);
        let mut bundle = ResearchBundle::new();
        bundle.web.push(web("Fire Safety Drill", 0.9));

        let checklist = enrich(&skeleton, &bundle, "unrelated keyword");
        // prep_04 carries "fire" among its lookup keywords
        let prep = question(&checklist, "prep_04");
        assert_eq!(prep.resource_count, 1);
        assert_eq!(prep.related_resources[0].title(), "Fire Safety Drill");
        assert!(prep.needs_more_research);
    }

    #[test]
    fn test_paper_abstract_does_not_match() {
        let skeleton = select("construction", "regular inspection", None);
        let mut bundle = ResearchBundle::new();
        let mut item = paper("Unrelated title", Some(2024), 3);
        item.abstract_text = "This paper covers fire drills".to_string();
        bundle.papers.push(item);

        let checklist = enrich(&skeleton, &bundle, "zzz");
        assert!(checklist.values().all(|c| c.total_resources == 0));
        assert!(question(&checklist, "prep_04").needs_more_research);
    }

    #[test]
    fn test_primary_keyword_matches_every_question() {
        let skeleton = select("warehouse", "regular inspection", None);
        let mut bundle = ResearchBundle::new();
        bundle.papers.push(paper("Cold STORAGE hazards", Some(2024), 5));

        let checklist = enrich(&skeleton, &bundle, "storage");
        assert!(checklist
            .values()
            .flat_map(|c| c.questions.iter())
            .all(|q| q.resource_count == 1));
    }

    #[test]
    fn test_top_five_sorted_with_stable_ties() {
        let skeleton = select("construction", "regular inspection", None);
        let mut bundle = ResearchBundle::new();
        bundle.web.push(web("site a", 0.70));
        bundle.web.push(web("site b", 0.95));
        bundle.web.push(web("site c", 0.70));
        bundle.papers.push(paper("site paper", None, 0)); // 0.8
        bundle.tech.push(repo("site-tool", 10, "Go")); // 0.5
        bundle.apis.push(api("site api")); // 0.3

        let checklist = enrich(&skeleton, &bundle, "site");
        let q = question(&checklist, "risk_01");
        let titles: Vec<&str> = q.related_resources.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["site b", "site paper", "site a", "site c", "site-tool"]);
        assert_eq!(q.resource_count, 5);
        assert!(!q.needs_more_research);
    }

    #[test]
    fn test_total_resources_is_sum_of_question_counts() {
        let skeleton = select("construction", "regular inspection", None);
        let mut bundle = ResearchBundle::new();
        bundle.web.push(web("Evacuation route planning", 0.9));
        bundle.web.push(web("Fire extinguisher inspection", 0.85));
        bundle.tech.push(repo("sensor-hub", 700, "Rust"));

        let checklist = enrich(&skeleton, &bundle, "nothing-matches-this");
        for category in checklist.values() {
            let sum: usize = category.questions.iter().map(|q| q.resource_count).sum();
            assert_eq!(category.total_resources, sum);
        }
    }

    #[test]
    fn test_enrich_is_deterministic() {
        let skeleton = select("medical", "initial assessment", Some("legal-focused"));
        let mut bundle = ResearchBundle::new();
        bundle.web.push(web("Hospital fire code", 0.95));
        bundle.papers.push(paper("Evacuation of patients", Some(2022), 40));
        bundle.apis.push(api("Shelter locations"));

        let first = serde_json::to_string(&enrich(&skeleton, &bundle, "hospital")).unwrap();
        let second = serde_json::to_string(&enrich(&skeleton, &bundle, "hospital")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blank_keyword_matches_nothing_by_itself() {
        let skeleton = select("other", "regular inspection", None);
        let mut bundle = ResearchBundle::new();
        bundle.web.push(web("zzz", 0.9));
        let checklist = enrich(&skeleton, &bundle, "  ");
        assert!(checklist
            .values()
            .all(|c| c.total_resources == 0));
    }
}
