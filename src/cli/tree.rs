//! Display the pedigree of a bird.
//!
//! # Examples
//!
//! ```bash
//! # Four generations (or whatever the config says) from the lookup service
//! pedigree tree NL-2021-1234567
//!
//! # The printed card: three generations, history on the bird and its parents
//! pedigree tree NL-2021-1234567 --three-generation
//!
//! # Offline, from an exported registry, as JSON
//! pedigree tree NL-2021-1234567 --registry loft.json --format json
//!
//! # Show parents that are named on a record but not in the owner's records
//! pedigree tree NL-2021-1234567 --show-missing
//! ```
//!
//! # Output formats
//!
//! - `tree` (default): box-drawing tree with sire above dam, plus a summary line
//! - `text`: plain indented lines without colors, suitable for scripts
//! - `json`: the resolved tree and its statistics

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use super::CliConfig;
use crate::config::PedigreeConfig;
use crate::core::PedigreeError;
use crate::lookup::{BirdLookup, HttpBirdLookup, RegistryLookup};
use crate::models::{BirdRef, CompetitionResult, ParentSlot};
use crate::pedigree::{
    BuildCoordinator, BuildOutcome, BuildRequest, BuildState, LeafReason, TreeNode, find_exact,
};
use crate::utils::Spinner;

#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Ring number of the bird
    identifier: String,

    /// Generations to show above the bird
    #[arg(short = 'g', long, conflicts_with = "three_generation")]
    generations: Option<u32>,

    /// Use the print convention: three generations, history on the bird and its parents
    #[arg(long)]
    three_generation: bool,

    /// Levels that get competition history (0 = none, 1 = the bird, 2 = with parents)
    #[arg(long)]
    annotate: Option<u32>,

    /// Output format: tree, json, text
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,

    /// Show parents named on a record that are not in the owner's records
    #[arg(long)]
    show_missing: bool,

    /// Read birds from an exported registry file instead of the lookup service
    #[arg(short = 'r', long)]
    registry: Option<PathBuf>,
}

impl TreeCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        self.validate_arguments()?;

        let config = PedigreeConfig::load_with_optional(cli.config_path.clone()).await?;
        let lookup = self.open_lookup(&config).await?;
        let spinner = Spinner::start(
            format!("Resolving pedigree of {}", self.identifier.trim()),
            cli.no_progress || self.format != "tree",
        );

        let result = self.resolve(lookup, &config, &spinner).await;
        spinner.finish_and_clear();
        let (tree, generations) = result?;

        match self.format.as_str() {
            "json" => output_json(&tree, generations)?,
            "text" => print!("{}", render_text(&tree, self.show_missing)),
            _ => {
                print!("{}", render_tree(&tree, self.show_missing));
                println!();
                println!("{}", summary_line(&tree).bright_black());
            }
        }

        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "tree" | "json" | "text" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid format '{}'. Valid formats are: tree, json, text",
                    self.format
                ));
            }
        }

        if self.identifier.trim().is_empty() {
            return Err(PedigreeError::MalformedSubject {
                reason: "the ring number is empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    async fn open_lookup(&self, config: &PedigreeConfig) -> Result<Arc<dyn BirdLookup>> {
        if let Some(path) = &self.registry {
            let registry = RegistryLookup::load(path).await?;
            return Ok(Arc::new(registry));
        }

        let http = HttpBirdLookup::from_config(&config.lookup)
            .context("No lookup service available; set lookup.base_url or pass --registry")?;
        Ok(Arc::new(http))
    }

    fn request_for(&self, subject: BirdRef, config: &PedigreeConfig) -> BuildRequest {
        let request = if self.three_generation {
            BuildRequest::three_generation(subject)
        } else {
            BuildRequest::new(subject, self.generations.unwrap_or(config.pedigree.generations))
                .with_annotation_levels(config.pedigree.annotation_levels)
        };

        match self.annotate {
            Some(levels) => request.with_annotation_levels(levels),
            None => request,
        }
    }

    async fn resolve(
        &self,
        lookup: Arc<dyn BirdLookup>,
        config: &PedigreeConfig,
        spinner: &Spinner,
    ) -> Result<(Arc<TreeNode>, u32)> {
        let subject = find_exact(lookup.as_ref(), &self.identifier)
            .await
            .map_err(PedigreeError::from)?
            .ok_or_else(|| PedigreeError::BirdNotFound {
                identifier: self.identifier.trim().to_string(),
            })?;

        let request = self.request_for(subject, config);
        let generations = request.generations;
        spinner.set_message(format!(
            "Resolving {} generations of {}",
            generations,
            request.subject.identifier.trim()
        ));

        let coordinator = BuildCoordinator::new(lookup);
        match coordinator.request(request).await {
            BuildOutcome::Committed(Some(tree)) => Ok((tree, generations)),
            BuildOutcome::Committed(None) => {
                let reason = match coordinator.current() {
                    BuildState::Unavailable {
                        reason, ..
                    } => reason,
                    _ => "unknown failure".to_string(),
                };
                Err(anyhow::anyhow!("Pedigree could not be built: {reason}"))
            }
            BuildOutcome::Superseded => Err(anyhow::anyhow!("Pedigree request was superseded")),
        }
    }
}

fn output_json(tree: &TreeNode, generations: u32) -> Result<()> {
    let json = serde_json::json!({
        "subject": tree.bird.identifier,
        "generations": generations,
        "tree": tree,
        "stats": tree.stats(),
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn slot_label(slot: ParentSlot) -> &'static str {
    match slot {
        ParentSlot::Father => "sire",
        ParentSlot::Mother => "dam",
    }
}

fn leaf_marker(node: &TreeNode) -> &'static str {
    match node.leaf {
        Some(LeafReason::Cycle) => " (repeats an ancestor)",
        Some(LeafReason::Truncated) if node.is_leaf() => " ...",
        _ => "",
    }
}

fn describe_result(result: &CompetitionResult) -> String {
    let mut line = result.name.clone();
    if let Some(date) = result.date {
        let _ = write!(line, " {date}");
    }
    if let Some(distance) = result.distance_km {
        let _ = write!(line, " {distance} km");
    }
    if let Some(placement) = result.placement {
        let _ = write!(line, " #{placement}");
    }
    line
}

/// Colored box-drawing rendering, sire before dam.
pub(crate) fn render_tree(tree: &TreeNode, show_missing: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", tree.bird.label().cyan().bold(), tree.bird.gender);
    render_competitions(&mut out, &tree.competitions, "");
    render_children(&mut out, tree, "", show_missing);
    out
}

fn render_children(out: &mut String, node: &TreeNode, prefix: &str, show_missing: bool) {
    let mut entries: Vec<(ParentSlot, Option<&TreeNode>, Option<&str>)> = Vec::new();
    for slot in [ParentSlot::Father, ParentSlot::Mother] {
        if let Some(parent) = node.parent(slot) {
            entries.push((slot, Some(parent), None));
        } else if show_missing && let Some(code) = node.unresolved(slot) {
            entries.push((slot, None, Some(code)));
        }
    }

    for (i, (slot, parent, missing)) in entries.iter().enumerate() {
        let is_last = i == entries.len() - 1;
        let connector = if is_last { "└── " } else { "├── " };
        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        match (parent, missing) {
            (Some(parent), _) => {
                let _ = writeln!(
                    out,
                    "{}{}{} {} ({}){}",
                    prefix,
                    connector,
                    format!("{}:", slot_label(*slot)).bright_black(),
                    parent.bird.label().cyan(),
                    parent.bird.gender,
                    leaf_marker(parent).yellow()
                );
                render_competitions(out, &parent.competitions, &child_prefix);
                render_children(out, parent, &child_prefix, show_missing);
            }
            (None, Some(code)) => {
                let _ = writeln!(
                    out,
                    "{}{}{} {} {}",
                    prefix,
                    connector,
                    format!("{}:", slot_label(*slot)).bright_black(),
                    code,
                    "(not in records)".bright_black()
                );
            }
            (None, None) => {}
        }
    }
}

fn render_competitions(out: &mut String, results: &[CompetitionResult], prefix: &str) {
    for result in results {
        let _ = writeln!(out, "{}  {} {}", prefix, "·".green(), describe_result(result));
    }
}

/// Plain indented rendering for scripts.
pub(crate) fn render_text(tree: &TreeNode, show_missing: bool) -> String {
    let mut out = String::new();
    render_text_node(&mut out, tree, None, 0, show_missing);
    out
}

fn render_text_node(
    out: &mut String,
    node: &TreeNode,
    slot: Option<ParentSlot>,
    indent: usize,
    show_missing: bool,
) {
    let indent_str = "  ".repeat(indent);
    let role = slot.map(|s| format!("{} ", slot_label(s))).unwrap_or_default();
    let _ = writeln!(
        out,
        "{}{}{} ({}){}",
        indent_str,
        role,
        node.bird.label(),
        node.bird.gender,
        leaf_marker(node)
    );
    for result in &node.competitions {
        let _ = writeln!(out, "{}  - {}", indent_str, describe_result(result));
    }

    for parent_slot in [ParentSlot::Father, ParentSlot::Mother] {
        if let Some(parent) = node.parent(parent_slot) {
            render_text_node(out, parent, Some(parent_slot), indent + 1, show_missing);
        } else if show_missing && let Some(code) = node.unresolved(parent_slot) {
            let _ = writeln!(
                out,
                "{}  {} {} (not in records)",
                indent_str,
                slot_label(parent_slot),
                code
            );
        }
    }
}

/// One-line summary shown under the tree.
pub(crate) fn summary_line(tree: &TreeNode) -> String {
    let stats = tree.stats();
    let mut line = format!(
        "{} birds across {} generation{}",
        stats.nodes,
        stats.depth,
        if stats.depth == 1 { "" } else { "s" }
    );
    if stats.cycle_leaves > 0 {
        let _ = write!(line, ", {} repeated ancestor loop(s)", stats.cycle_leaves);
    }
    if stats.unresolved_parents > 0 {
        let _ = write!(line, ", {} parent(s) not in records", stats.unresolved_parents);
    }
    if !stats.repeated_ancestors.is_empty() {
        let _ = write!(line, ", common ancestors: {}", stats.repeated_ancestors.join(", "));
    }
    line
}
