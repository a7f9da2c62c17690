//! Checklist generation: select → collect → enrich → summarize.

pub mod generator;
pub mod matcher;
pub mod selector;
pub mod summary;

pub use generator::{
    ChecklistGenerator, GenerationMetadata, GenerationRequest, GenerationResult, RESULT_VERSION,
};
pub use matcher::{enrich, EnrichedCategory, EnrichedChecklist, EnrichedQuestion};
pub use selector::{select, ChecklistSkeleton, SkeletonCategory};
pub use summary::{summarize, MaturityLevel, ResearchSummary};
