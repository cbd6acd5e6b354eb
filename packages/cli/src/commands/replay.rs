use super::{document_json, open_scene};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use inspector_adapter::messages::names;
use inspector_adapter::{
    AdapterEvent, AdapterMessage, KeyQuery, MessageOutcome, ReflectionAdapter, ValueChangeType, WireMessage,
};
use inspector_dom::{NodeKind, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON file holding an array of wire messages
    #[arg(short, long)]
    pub script: PathBuf,

    /// Print the final document after the last step
    #[arg(long)]
    pub print_document: bool,
}

pub fn replay(args: ReplayArgs, config_dir: &Path) -> Result<()> {
    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read script {}", args.script.display()))?;
    let steps: Vec<WireMessage> =
        serde_json::from_str(&content).with_context(|| format!("Invalid script {}", args.script.display()))?;

    let mut adapter = open_scene(config_dir)?;
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    adapter.connect(move |event: &AdapterEvent| sink.borrow_mut().push(event.clone()));

    let mut pending: Option<KeyQuery> = None;
    for (index, step) in steps.into_iter().enumerate() {
        println!("{} {} {}", format!("#{index}").dimmed(), step.name.bold(), step.origin);

        let outcome = if step.name == names::ADD_CONTAINER_KEY {
            let query = pending
                .take()
                .ok_or_else(|| anyhow!("step {index}: no container is waiting for a key"))?;
            add_key(&mut adapter, query, &step)?
        } else {
            if step.name == names::REJECT_CONTAINER_KEY {
                pending = None;
            }
            adapter.handle_wire_message(step)?
        };

        match outcome {
            MessageOutcome::Handled => {}
            MessageOutcome::Ignored => println!("  {}", "ignored".yellow()),
            MessageOutcome::KeyRequested(query) => {
                println!("  {} at {}", "key requested".cyan(), query.container_path);
                pending = Some(query);
            }
        }
        for event in events.borrow_mut().drain(..) {
            println!("  {}", serde_json::to_string(&event)?);
        }
    }

    if pending.is_some() {
        println!("{}", "warning: script ended with a key request still open".yellow());
    }
    if args.print_document {
        println!("{}", serde_json::to_string_pretty(&document_json(adapter.contents()))?);
    }
    Ok(())
}

/// Writes `args.key` into the key adapter's editor and hands the key back to
/// the step's origin, or to the requesting button when the step has none.
fn add_key(adapter: &mut ReflectionAdapter, mut query: KeyQuery, step: &WireMessage) -> Result<MessageOutcome> {
    if let Some(key) = step.args.get("key") {
        let editor = query
            .adapter
            .contents()
            .find_paths(|node| node.is(NodeKind::PropertyEditor))
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("key adapter has no editor"))?;
        query.adapter.handle_message(AdapterMessage::ValueChanged {
            origin: editor,
            value: Value::from(key.clone()),
            change_type: ValueChangeType::FinishedEdit,
        })?;
    }

    let origin = if step.origin.is_empty() {
        query.container_path
    } else {
        step.origin.clone()
    };
    Ok(adapter.handle_message(AdapterMessage::AddContainerKey {
        origin,
        key_adapter: query.adapter,
    })?)
}
