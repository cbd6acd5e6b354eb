use super::{document_json, open_scene};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use inspector_dom::NodeKind;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// List editor paths instead of printing the whole document
    #[arg(long)]
    pub editors: bool,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

pub fn inspect(args: InspectArgs, config_dir: &Path) -> Result<()> {
    let adapter = open_scene(config_dir)?;
    let document = adapter.contents();

    if args.editors {
        for path in document.find_paths(|node| node.is(NodeKind::PropertyEditor)) {
            let Some(editor) = document.node_at(&path) else {
                continue;
            };
            let kind = editor
                .attribute("Type")
                .map(|value| value.display_text())
                .unwrap_or_default();
            let value = editor
                .attribute("Value")
                .map(|value| value.display_text())
                .unwrap_or_default();
            println!("{:<12} {:<10} {}", path.to_string().cyan(), kind, value);
        }
        return Ok(());
    }

    let json = document_json(document);
    let text = if args.compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    println!("{text}");
    Ok(())
}
