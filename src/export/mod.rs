//! Rendering of generation results: a markdown report and a lossless JSON dump.

use chrono::SecondsFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::AnswerFormat;
use crate::error::Result;
use crate::pipeline::{EnrichedQuestion, GenerationResult};
use crate::research::ResearchItem;
use crate::util::slugify;

/// Resources listed under each question in the document.
const RESOURCES_SHOWN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

/// Human-readable markdown report. Deterministic for a given result.
pub fn to_document(result: &GenerationResult) -> String {
    let mut md = String::new();
    let meta = &result.metadata;

    md.push_str(&format!("# {} - Disaster & Safety Checklist\n\n", meta.keyword));
    md.push_str(&format!("**Facility type**: {}\n\n", meta.facility_type));
    md.push_str(&format!("**Inspection phase**: {}\n\n", meta.check_phase));
    if let Some(focus) = &meta.focus_area {
        md.push_str(&format!("**Focus area**: {}\n\n", focus));
    }
    md.push_str(&format!(
        "**Generated at**: {}\n\n",
        meta.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    md.push_str("---\n\n");

    let summary = &result.research_summary;
    md.push_str("## 📊 Research Summary\n\n");
    md.push_str(&format!("- Web sources: {}\n", summary.web_sources));
    md.push_str(&format!("- Papers: {}\n", summary.papers));
    md.push_str(&format!("- Tech projects: {}\n", summary.tech_projects));
    md.push_str(&format!("- APIs: {}\n\n", summary.apis));

    if !result.recommendations.is_empty() {
        md.push_str("## 💡 Recommendations\n\n");
        for rec in &result.recommendations {
            md.push_str(&format!("- {}\n", rec));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");

    for category in result.checklist.values() {
        let info = &category.info;
        md.push_str(&format!("## {} {}\n\n", info.icon, info.name));
        md.push_str(&format!("*{}*\n\n", info.description));

        for (i, question) in category.questions.iter().enumerate() {
            render_question(&mut md, i + 1, question);
        }

        md.push_str("---\n\n");
    }

    md
}

fn render_question(md: &mut String, number: usize, enriched: &EnrichedQuestion) {
    let q = &enriched.question;
    md.push_str(&format!(
        "### {}. {} {}\n\n",
        number,
        q.prompt,
        q.importance.glyph()
    ));

    match &q.answer {
        AnswerFormat::Select { options } => {
            md.push_str("**Options:**\n\n");
            for option in options {
                md.push_str(&format!("- [ ] {}\n", option));
            }
        }
        AnswerFormat::Text => {
            md.push_str("**Answer:**\n\n");
            md.push_str("```\n\n```\n");
        }
    }

    if !enriched.related_resources.is_empty() {
        md.push_str("\n**References:**\n\n");
        for resource in enriched.related_resources.iter().take(RESOURCES_SHOWN) {
            md.push_str(&format!("{}\n", resource_line(resource)));
        }
    }

    if enriched.needs_more_research {
        md.push_str("\n⚠️ *Additional research needed.*\n");
    }

    md.push('\n');
}

fn resource_line(resource: &ResearchItem) -> String {
    match resource {
        ResearchItem::Web(w) => format!("- [{}]({}) - {}", w.title, w.url, w.source),
        ResearchItem::Paper(p) => {
            let year = p
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!("- 📄 [{}]({}) ({})", p.title, p.url, year)
        }
        ResearchItem::Tech(t) => format!("- 💻 [{}]({}) - ⭐ {}", t.name, t.url, t.stars),
        ResearchItem::Api(a) => format!("- 🔌 [{}]({}) - {}", a.name, a.url, a.provider),
    }
}

/// Pretty-printed JSON of the whole result.
pub fn to_structured(result: &GenerationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn from_structured(json: &str) -> Result<GenerationResult> {
    Ok(serde_json::from_str(json)?)
}

/// `checklist_<keyword>_<YYYYmmdd_HHMMSS>.<ext>`, stamped with the generation time.
pub fn default_file_name(result: &GenerationResult, format: ExportFormat) -> String {
    format!(
        "checklist_{}_{}.{}",
        slugify(&result.metadata.keyword),
        result.metadata.generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write the markdown report. `path` overrides the generated file name under `dir`.
pub fn export_markdown(result: &GenerationResult, dir: &Path, path: Option<&Path>) -> Result<PathBuf> {
    write_export(result, ExportFormat::Markdown, dir, path, to_document(result))
}

/// Write the JSON dump. `path` overrides the generated file name under `dir`.
pub fn export_json(result: &GenerationResult, dir: &Path, path: Option<&Path>) -> Result<PathBuf> {
    write_export(result, ExportFormat::Json, dir, path, to_structured(result)?)
}

fn write_export(
    result: &GenerationResult,
    format: ExportFormat,
    dir: &Path,
    path: Option<&Path>,
    content: String,
) -> Result<PathBuf> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => dir.join(default_file_name(result, format)),
    };
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&target, content)?;
    info!("Wrote {} export: {}", format.extension(), target.display());
    Ok(target)
}
