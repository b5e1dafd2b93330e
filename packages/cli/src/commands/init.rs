use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use vectra_editor::model::{Document, SceneObject, Shape};
use vectra_editor::EditorConfig;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Undo levels kept by the dispatcher (0 = unlimited)
    #[arg(long, default_value_t = 100)]
    pub history_limit: usize,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

const EXAMPLE_DOCUMENT: &str = "example.document.json";
const EXAMPLE_SCRIPT: &str = "example.script.json";

const EXAMPLE_SCRIPT_CONTENT: &str = r##"[
  { "step": "connect" },
  { "step": "dispatch", "op": { "kind": "object.transform", "objectId": "box", "transform": { "x": 120.0 } } },
  { "step": "ack" },
  { "step": "dispatch", "op": { "kind": "object.style", "objectId": "box", "style": { "fill": "#3366ff" } } },
  { "step": "nack", "reason": "fill locked by another user" },
  { "step": "undo" }
]
"##;

pub fn init(args: InitArgs, dir: &Path) -> Result<()> {
    let config_path = dir.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Vectra project...".bright_blue().bold());

    let document_path = dir.join(EXAMPLE_DOCUMENT);
    if !document_path.exists() {
        let json = serde_json::to_string_pretty(&example_document())?;
        fs::write(&document_path, json)?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_DOCUMENT);
    }

    let script_path = dir.join(EXAMPLE_SCRIPT);
    if !script_path.exists() {
        fs::write(&script_path, EXAMPLE_SCRIPT_CONTENT)?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_SCRIPT);
    }

    let config = Config {
        editor: EditorConfig {
            history_limit: args.history_limit,
            ..Default::default()
        },
        ..Default::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  vectra replay {} {}", EXAMPLE_DOCUMENT, EXAMPLE_SCRIPT);

    Ok(())
}

fn example_document() -> Document {
    let mut doc = Document::new("example", "Example");
    let root = doc.add_scene("main", "Main");
    doc.add_object(
        SceneObject::new(
            "box",
            "main",
            Shape::Rectangle {
                width: 80.0,
                height: 80.0,
            },
        )
        .with_parent(root),
    );
    doc
}
