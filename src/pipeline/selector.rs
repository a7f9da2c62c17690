//! Template selection: phase pruning and focus-area promotion over a cloned
//! copy of the catalog.

use indexmap::IndexMap;
use std::str::FromStr;
use tracing::debug;

use crate::catalog::{Catalog, Category, CheckPhase, FocusArea, Importance, Question};

/// One category's questions after selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonCategory {
    pub info: Category,
    pub questions: Vec<Question>,
}

/// Category id → selected questions, in catalog order.
pub type ChecklistSkeleton = IndexMap<String, SkeletonCategory>;

/// Select questions for a facility/phase/focus combination.
///
/// Every catalog category is present in the result. The facility type is
/// recorded by callers but does not filter anything. Unknown phase or focus
/// labels are accepted and leave the questions untouched.
pub fn select(facility_type: &str, phase: &str, focus: Option<&str>) -> ChecklistSkeleton {
    select_from(Catalog::global(), facility_type, phase, focus)
}

pub fn select_from(
    catalog: &Catalog,
    facility_type: &str,
    phase: &str,
    focus: Option<&str>,
) -> ChecklistSkeleton {
    let focus_area = focus.and_then(|f| FocusArea::from_str(f).ok());
    if focus.is_some() && focus_area.is_none() {
        debug!("Unknown focus area {:?}, no importance changes", focus);
    }

    let skeleton: ChecklistSkeleton = catalog
        .templates()
        .iter()
        .map(|template| {
            let mut questions = filter_by_phase(&template.questions, phase);
            if let Some(area) = focus_area {
                promote_for_focus(&mut questions, &template.info.id, area);
            }
            (
                template.info.id.clone(),
                SkeletonCategory {
                    info: template.info.clone(),
                    questions,
                },
            )
        })
        .collect();

    debug!(
        "Selected {} questions in {} categories (facility: {}, phase: {})",
        skeleton.values().map(|c| c.questions.len()).sum::<usize>(),
        skeleton.len(),
        facility_type,
        phase
    );
    skeleton
}

/// Only the initial assessment drops low-importance questions; every other
/// phase label keeps the full list.
fn filter_by_phase(questions: &[Question], phase: &str) -> Vec<Question> {
    match CheckPhase::from_str(phase) {
        Ok(CheckPhase::Initial) => questions
            .iter()
            .filter(|q| q.importance != Importance::Low)
            .cloned()
            .collect(),
        _ => questions.to_vec(),
    }
}

/// Medium becomes high inside the focus area's categories. Never demotes.
fn promote_for_focus(questions: &mut [Question], category_id: &str, area: FocusArea) {
    if !area.categories().contains(&category_id) {
        return;
    }
    for question in questions.iter_mut() {
        if question.importance == Importance::Medium {
            question.importance = Importance::High;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn importance_of(skeleton: &ChecklistSkeleton, question_id: &str) -> Importance {
        skeleton
            .values()
            .flat_map(|c| c.questions.iter())
            .find(|q| q.id == question_id)
            .map(|q| q.importance)
            .unwrap()
    }

    #[test]
    fn test_every_category_present_for_any_labels() {
        let expected = Catalog::global().category_ids();
        for phase in ["initial assessment", "regular inspection", "???", ""] {
            let skeleton = select("spaceport", phase, None);
            let ids: Vec<&str> = skeleton.keys().map(String::as_str).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_initial_assessment_drops_low() {
        let skeleton = select("construction", "initial assessment", None);
        let all: Vec<_> = skeleton.values().flat_map(|c| c.questions.iter()).collect();
        assert!(all.iter().all(|q| q.importance != Importance::Low));
        assert_eq!(all.len(), Catalog::global().question_count() - 1);
        assert!(skeleton["cooperation"].questions.iter().all(|q| q.id != "coop_03"));
    }

    #[test]
    fn test_other_phases_keep_everything() {
        let catalog = Catalog::global();
        for phase in ["regular inspection", "disaster occurring", "post-recovery", "Initial Assessment"] {
            let skeleton = select("warehouse", phase, None);
            for template in catalog.templates() {
                assert_eq!(
                    skeleton[template.info.id.as_str()].questions.len(),
                    template.questions.len()
                );
            }
        }
    }

    #[test]
    fn test_focus_promotes_medium_only_in_mapped_categories() {
        let base = select("construction", "regular inspection", None);
        let focused = select("construction", "regular inspection", Some("safety-focused"));

        assert_eq!(importance_of(&base, "safety_04"), Importance::Medium);
        assert_eq!(importance_of(&focused, "safety_04"), Importance::High);
        // outside the focus categories nothing changes
        assert_eq!(importance_of(&focused, "risk_04"), Importance::Medium);
        // low stays low
        assert_eq!(importance_of(&focused, "coop_03"), Importance::Low);
    }

    #[test]
    fn test_focus_never_demotes() {
        for area in FocusArea::ALL {
            let base = select("medical", "annual review", None);
            let focused = select("medical", "annual review", Some(area.label()));
            for (id, category) in &base {
                for (before, after) in category.questions.iter().zip(&focused[id].questions) {
                    assert!(after.importance.rank() >= before.importance.rank());
                    if after.importance != before.importance {
                        assert!(area.categories().contains(&id.as_str()));
                        assert_eq!(before.importance, Importance::Medium);
                        assert_eq!(after.importance, Importance::High);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_focus_is_ignored() {
        let base = select("other", "regular inspection", None);
        let focused = select("other", "regular inspection", Some("vibes-focused"));
        assert_eq!(base, focused);
    }

    #[test]
    fn test_selection_does_not_mutate_catalog() {
        let _ = select("construction", "regular inspection", Some("response-focused"));
        let again = select("construction", "regular inspection", None);
        assert_eq!(importance_of(&again, "emerg_04"), Importance::Medium);
        let catalog_q = Catalog::global()
            .template("emergency_response")
            .unwrap()
            .questions
            .iter()
            .find(|q| q.id == "emerg_04")
            .unwrap();
        assert_eq!(catalog_q.importance, Importance::Medium);
    }
}
