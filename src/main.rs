use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use safecheck::cli;
use safecheck::cli::generate::{GenerateOptions, OutputFormat};
use safecheck::cli::projects::ProjectsCommand;

#[derive(Parser)]
#[command(name = "safecheck", version)]
#[command(about = "Generate disaster & safety inspection checklists", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ./safecheck.toml or ~/.config/safecheck/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a checklist for a facility or site
    Generate {
        /// Facility or site keyword (e.g. "Riverside Plant")
        keyword: String,

        /// Facility type (local government, construction, manufacturing, ...)
        #[arg(short = 't', long = "type", default_value = "other")]
        facility_type: String,

        /// Inspection phase (initial assessment, regular inspection, ...)
        #[arg(short, long, default_value = "initial assessment")]
        stage: String,

        /// Focus area (safety-focused, legal-focused, prevention-focused, response-focused)
        #[arg(short, long)]
        focus: Option<String>,

        /// Collect research from external sources
        #[arg(short, long)]
        collect: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,

        /// Save the result to the project database
        #[arg(long)]
        save: bool,

        /// Use mock research providers
        #[arg(long)]
        dry_run: bool,
    },
    /// Show categories, facility types, phases and focus areas
    List {
        /// Show one category in detail
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show or change configuration
    Config {
        #[arg(short, long)]
        show: bool,

        /// Set a value by dotted key (e.g. --set tech.github_min_stars 50)
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
        set: Option<Vec<String>>,
    },
    /// Run the local dashboard API
    Serve {
        /// Address to bind (defaults to server.bind from config)
        #[arg(long)]
        bind: Option<String>,

        /// Use mock research providers
        #[arg(long)]
        dry_run: bool,
    },
    /// Browse saved projects
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Generate {
            keyword,
            facility_type,
            stage,
            focus,
            collect,
            format,
            output,
            save,
            dry_run,
        } => {
            let options = GenerateOptions {
                keyword,
                facility_type,
                check_phase: stage,
                focus_area: focus,
                collect,
                format,
                output,
                save,
                dry_run,
            };
            cli::generate::run(options, cli.config).await?;
        }
        Commands::List { category } => {
            cli::list::run(category)?;
        }
        Commands::Config { show, set } => {
            cli::config_cmd::run(cli.config, show, set)?;
        }
        Commands::Serve { bind, dry_run } => {
            cli::serve::run(cli.config, bind, dry_run).await?;
        }
        Commands::Projects { command } => {
            cli::projects::run(cli.config, command)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_generate_defaults() {
        let cli = Cli::try_parse_from(["safecheck", "generate", "Test Site"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Generate {
                keyword,
                facility_type,
                stage,
                focus,
                collect,
                format,
                output,
                save,
                dry_run,
            } => {
                assert_eq!(keyword, "Test Site");
                assert_eq!(facility_type, "other");
                assert_eq!(stage, "initial assessment");
                assert!(focus.is_none());
                assert!(!collect);
                assert_eq!(format, OutputFormat::Markdown);
                assert!(output.is_none());
                assert!(!save);
                assert!(!dry_run);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_generate_all_flags() {
        let cli = Cli::try_parse_from([
            "safecheck",
            "generate",
            "Plant",
            "-t",
            "manufacturing",
            "-s",
            "regular inspection",
            "-f",
            "legal-focused",
            "-c",
            "--format",
            "both",
            "-o",
            "out.md",
            "--save",
            "--dry-run",
            "--verbose",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        match cli.command {
            Commands::Generate {
                facility_type,
                focus,
                collect,
                format,
                save,
                ..
            } => {
                assert_eq!(facility_type, "manufacturing");
                assert_eq!(focus.as_deref(), Some("legal-focused"));
                assert!(collect);
                assert_eq!(format, OutputFormat::Both);
                assert!(save);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_generate_requires_keyword() {
        assert!(Cli::try_parse_from(["safecheck", "generate"]).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["safecheck", "generate", "x", "--format", "pdf"]).is_err());
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "safecheck",
            "config",
            "--set",
            "output_dir",
            "reports",
        ])
        .unwrap();
        match cli.command {
            Commands::Config { show, set } => {
                assert!(!show);
                assert_eq!(set, Some(vec!["output_dir".to_string(), "reports".to_string()]));
            }
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_parse_projects_subcommands() {
        let cli = Cli::try_parse_from(["safecheck", "projects", "show", "7", "--json"]).unwrap();
        match cli.command {
            Commands::Projects {
                command: ProjectsCommand::Show { id, json },
            } => {
                assert_eq!(id, 7);
                assert!(json);
            }
            _ => panic!("expected projects show"),
        }

        let cli = Cli::try_parse_from(["safecheck", "projects", "list", "-k", "plant"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Projects {
                command: ProjectsCommand::List { .. }
            }
        ));
    }

    #[test]
    fn test_parse_serve_bind() {
        let cli = Cli::try_parse_from(["safecheck", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve { bind, dry_run } => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0:9000"));
                assert!(!dry_run);
            }
            _ => panic!("expected serve"),
        }
    }
}
