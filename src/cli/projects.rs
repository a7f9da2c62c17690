use anyhow::{bail, Result};
use clap::Subcommand;

use crate::config::Config;
use crate::export;
use crate::store::{Project, ProjectStats, ProjectStore};

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List saved projects, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Only projects whose keyword contains this text
        #[arg(short, long)]
        keyword: Option<String>,
    },
    /// Print a saved project as markdown (or JSON with --json)
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },
    /// Delete a saved project
    Delete { id: i64 },
    /// Show project statistics
    Stats,
}

pub fn run(config_path: Option<String>, command: ProjectsCommand) -> Result<()> {
    let config = Config::load_with_path(config_path)?;
    let store = ProjectStore::open(&config.db_path())?;
    print!("{}", execute(&store, command)?);
    Ok(())
}

pub fn execute(store: &ProjectStore, command: ProjectsCommand) -> Result<String> {
    match command {
        ProjectsCommand::List {
            limit,
            offset,
            keyword,
        } => {
            let projects = store.list(limit, offset, keyword.as_deref())?;
            let total = store.count(keyword.as_deref())?;
            Ok(render_list(&projects, total))
        }
        ProjectsCommand::Show { id, json } => {
            let project = store.get(id)?;
            if json {
                Ok(format!("{}\n", export::to_structured(&project.result)?))
            } else {
                Ok(export::to_document(&project.result))
            }
        }
        ProjectsCommand::Delete { id } => {
            if !store.delete(id)? {
                bail!("Project not found: {}", id);
            }
            Ok(format!("✅ Deleted project #{}\n", id))
        }
        ProjectsCommand::Stats => Ok(render_stats(&store.stats()?)),
    }
}

fn render_list(projects: &[Project], total: i64) -> String {
    let mut out = format!("Projects: showing {} of {}\n", projects.len(), total);
    for p in projects {
        out.push_str(&format!(
            "#{:<4} {}  {} | {} | {}{}\n",
            p.id,
            p.created_at.format("%Y-%m-%d %H:%M"),
            p.keyword,
            p.facility_type,
            p.check_phase,
            p.focus_area
                .as_deref()
                .map(|f| format!(" | {}", f))
                .unwrap_or_default()
        ));
    }
    out
}

fn render_stats(stats: &ProjectStats) -> String {
    let mut out = format!("Total projects: {}\n", stats.total_projects);
    out.push_str(&format!("Created in the last 7 days: {}\n", stats.recent_7days));
    out.push_str("\nBy facility type:\n");
    for (label, n) in &stats.facility_types {
        out.push_str(&format!("  - {}: {}\n", label, n));
    }
    out.push_str("\nBy inspection phase:\n");
    for (label, n) in &stats.check_phases {
        out.push_str(&format!("  - {}: {}\n", label, n));
    }
    out
}
