//! IdsForge CLI - recipe parsing, lookup and rendering
//!
//! Commands: parse, lookup, render, load
//! Outputs JSON to stdout, logs to stderr (`RUST_LOG` filters)
//! Returns non-zero on a rejected recipe or failed render

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use idsforge_core::{
    render::{BlockGlyphSource, FontStack},
    Config, CraftingPipeline, RenderRequest,
};

#[derive(Parser)]
#[command(name = "idsforge-cli")]
#[command(about = "IdsForge CLI - Ideographic Description Sequences")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON config
    #[arg(short, long, default_value = "idsforge.json")]
    config: PathBuf,

    /// IDS recipe tables to load, in order
    #[arg(long)]
    ids: Vec<PathBuf>,

    /// Unihan definition tables to load
    #[arg(long)]
    meanings: Vec<PathBuf>,

    /// Draw outlined boxes for characters with no other source
    #[arg(long)]
    placeholder: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a recipe and print its canonical form
    Parse {
        recipe: String,
    },

    /// List every character a recipe makes
    Lookup {
        recipe: String,
    },

    /// Render a recipe or character
    Render {
        /// JSON payload (RenderRequest)
        #[arg(short, long)]
        payload: String,
    },

    /// Load the tables and report counts
    Load,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load config: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    let mut fonts = FontStack::new();
    if cli.placeholder {
        fonts.push(BlockGlyphSource::default());
    }
    let mut pipeline = CraftingPipeline::new(config).with_fonts(fonts);

    let mut reports = vec![];
    for path in &cli.ids {
        match pipeline.load_recipes(path) {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!(r#"{{"error": "{}"}}"#, e);
                return ExitCode::FAILURE;
            }
        }
    }
    for path in &cli.meanings {
        match pipeline.load_meanings(path) {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!(r#"{{"error": "{}"}}"#, e);
                return ExitCode::FAILURE;
            }
        }
    }
    info!(
        leaves = pipeline.registry().leaf_count(),
        recipes = pipeline.registry().recipe_count(),
        "tables loaded"
    );

    match cli.command {
        Commands::Load => {
            let output = serde_json::json!({
                "leaves": pipeline.registry().leaf_count(),
                "recipes": pipeline.registry().recipe_count(),
                "reports": reports,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Parse { recipe } => match pipeline.registry_mut().parse(&recipe) {
            Ok(tree) => {
                let output = serde_json::json!({
                    "valid": true,
                    "canonical": tree.canonical_string(),
                    "recipeKey": idsforge_core::recipe_key(&tree),
                    "operator": tree.as_composite().map(|c| c.operator().symbol),
                    "approx": tree.as_composite().is_some_and(|c| c.approx()),
                });
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
                ExitCode::SUCCESS
            }
            Err(e) => {
                let output = serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string(&output).unwrap());
                ExitCode::from(2) // Grammar failure
            }
        },

        Commands::Lookup { recipe } => match pipeline.lookup(&recipe) {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
                ExitCode::SUCCESS
            }
            Err(e) => {
                let output = serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string(&output).unwrap());
                ExitCode::from(2)
            }
        },

        Commands::Render { payload } => {
            let request: RenderRequest = match serde_json::from_str(&payload) {
                Ok(r) => r,
                Err(e) => {
                    println!(r#"{{"success": false, "error": "Invalid payload: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            match pipeline.render_recipe(&request) {
                Ok(glyph) => {
                    let output = serde_json::json!({
                        "success": true,
                        "glyph": glyph,
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    let output = serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    });
                    println!("{}", serde_json::to_string(&output).unwrap());
                    ExitCode::from(2)
                }
            }
        }
    }
}
