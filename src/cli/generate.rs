use anyhow::Result;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::export;
use crate::pipeline::{ChecklistGenerator, GenerationRequest, GenerationResult};
use crate::providers::create_providers;
use crate::store::{NewProject, ProjectStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
    Both,
}

impl OutputFormat {
    fn markdown(&self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    fn json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub keyword: String,
    pub facility_type: String,
    pub check_phase: String,
    pub focus_area: Option<String>,
    pub collect: bool,
    pub format: OutputFormat,
    pub output: Option<String>,
    pub save: bool,
    pub dry_run: bool,
}

/// Files written (and the saved project id) for one `generate` call.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub result: GenerationResult,
    pub markdown_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub project_id: Option<i64>,
}

pub async fn run(options: GenerateOptions, config_path: Option<String>) -> Result<()> {
    let config = Config::load_with_path(config_path)?;

    println!("\n{}", "=".repeat(70));
    println!("  Disaster & Safety Checklist");
    println!("{}\n", "=".repeat(70));

    let outcome = execute(&config, &options).await?;

    if let Some(path) = &outcome.markdown_path {
        println!("✅ Markdown file: {}", path.display());
    }
    if let Some(path) = &outcome.json_path {
        println!("✅ JSON file: {}", path.display());
    }
    if let Some(id) = outcome.project_id {
        println!("✅ Saved as project #{}", id);
    }

    print!("{}", render_summary(&outcome.result));
    Ok(())
}

/// Generate, export and optionally persist. Nothing is written when generation fails.
pub async fn execute(config: &Config, options: &GenerateOptions) -> Result<GenerateOutcome> {
    debug!("Dry run: {}", options.dry_run);
    let providers = create_providers(config, options.dry_run)?;
    let generator = ChecklistGenerator::new(providers)
        .with_timeout(Duration::from_secs(config.provider_timeout_secs));

    let request = GenerationRequest::new(
        options.keyword.clone(),
        options.facility_type.clone(),
        options.check_phase.clone(),
    )
    .with_focus(options.focus_area.clone())
    .with_collect(options.collect);

    let result = generator.generate(&request).await?;

    let out_dir = Path::new(&config.output_dir);
    let explicit = options.output.as_deref().map(Path::new);

    let markdown_path = if options.format.markdown() {
        Some(export::export_markdown(&result, out_dir, explicit)?)
    } else {
        None
    };
    // An explicit output path belongs to the markdown file unless JSON is the only format
    let json_path = if options.format.json() {
        let json_target = explicit.filter(|_| options.format == OutputFormat::Json);
        Some(export::export_json(&result, out_dir, json_target)?)
    } else {
        None
    };

    let project_id = if options.save {
        let store = ProjectStore::open(&config.db_path())?;
        let project = NewProject::new(result.clone(), options.collect).with_paths(
            markdown_path.as_ref().map(|p| p.display().to_string()),
            json_path.as_ref().map(|p| p.display().to_string()),
        );
        Some(store.create(&project)?)
    } else {
        None
    };

    Ok(GenerateOutcome {
        result,
        markdown_path,
        json_path,
        project_id,
    })
}

pub fn render_summary(result: &GenerationResult) -> String {
    let summary = &result.research_summary;
    let rule = "=".repeat(70);
    let mut out = String::new();

    out.push_str(&format!("\n{}\n📊 Generation Summary\n{}\n", rule, rule));
    out.push_str(&format!("- Questions: {}\n", result.question_count()));
    out.push_str(&format!("- Web sources: {}\n", summary.web_sources));
    out.push_str(&format!("- Papers: {}\n", summary.papers));
    out.push_str(&format!("- Tech projects: {}\n", summary.tech_projects));
    out.push_str(&format!("- APIs: {}\n", summary.apis));
    out.push_str(&format!("- Total resources: {}\n", summary.total_resources));

    if !result.recommendations.is_empty() {
        out.push_str("\n💡 Recommendations:\n");
        for rec in &result.recommendations {
            out.push_str(&format!("  {}\n", rec));
        }
    }
    out.push_str(&format!("\n{}\n", rule));
    out
}
