use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use docroute::{BackendId, BackendInfo, RoutingInfo};

/// Print where `path` routes and whether that back-end can run.
pub fn render_routing(path: &Path, info: &RoutingInfo) {
    println!("\n {} v{}", "docroute".bold(), env!("CARGO_PKG_VERSION"));
    println!(" File: {}\n", path.display());

    let status = if info.installed {
        "✓ installed".green()
    } else {
        "✗ not installed".red()
    };

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "ROUTING".bold());
    println!(" │  {:<48} │", format!("Backend    : {}", info.backend));
    println!(" │  {:<48} │", format!("Confidence : {:.2}", info.confidence));
    println!(" │  {:<48} │", format!("Status     : {}", status));
    if info.ambiguous {
        let alternatives: Vec<&str> = info.alternatives.iter().map(BackendId::as_str).collect();
        println!(
            " │  {:<48} │",
            format!("{}  Ambiguous  : {}", "⚠".yellow(), alternatives.join(", "))
        );
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    if info.ambiguous {
        println!(
            " {} Pass {} to pick another back-end.\n",
            "[HINT]".yellow().bold(),
            "--hint".bold()
        );
    }
}

pub fn render_backends(backends: &[BackendInfo]) {
    println!("{}", backends_table(backends));

    let missing = backends.iter().filter(|b| !b.installed).count();
    if missing > 0 {
        println!(
            "\n {} {} of {} back-ends not installed; install an extra or set [backends.<name>] command in the config.",
            "[WARN]".yellow().bold(),
            missing,
            backends.len()
        );
    }
}

pub fn render_extensions(extensions: &BTreeMap<BackendId, BTreeSet<&'static str>>) {
    println!("{}", extensions_table(extensions));
}

fn backends_table(backends: &[BackendInfo]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Backend").add_attribute(Attribute::Bold),
            Cell::new("Provider").add_attribute(Attribute::Bold),
            Cell::new("Extensions").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for info in backends {
        let (status, color) = if info.installed {
            ("✓ installed", Color::Green)
        } else {
            ("✗ missing", Color::Red)
        };

        table.add_row(vec![
            Cell::new(info.name.to_string()),
            Cell::new(info.activation_target),
            Cell::new(info.extensions.join(" ")),
            Cell::new(status)
                .fg(color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    table
}

fn extensions_table(extensions: &BTreeMap<BackendId, BTreeSet<&'static str>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Backend").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
            Cell::new("Extensions").add_attribute(Attribute::Bold),
        ]);

    for (backend, suffixes) in extensions {
        let list: Vec<&str> = suffixes.iter().copied().collect();
        table.add_row(vec![
            Cell::new(backend.to_string()),
            Cell::new(suffixes.len()).set_alignment(CellAlignment::Right),
            Cell::new(list.join(" ")),
        ]);
    }

    table
}
