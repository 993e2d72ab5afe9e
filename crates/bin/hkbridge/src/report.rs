//! Console reports for each command.
//!
//! Everything here writes to the supplied sink; logs go to stderr through
//! `tracing`, reports go to stdout.

use std::io::{self, Write};

use hkbridge_app::services::apply_service::ApplyReport;
use hkbridge_app::services::assignment_service::GenerateReport;
use hkbridge_app::services::inspection_service::{BridgeListing, BridgeStatus};
use hkbridge_domain::bridge::{BridgeConfig, CAPACITY_CEILING};
use hkbridge_domain::capacity::CapacitySuggestion;
use hkbridge_domain::config_entry::FilterMode;
use serde::Serialize;

const RULE_WIDTH: usize = 70;

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{rule}")
}

fn status(over_limit: bool) -> &'static str {
    if over_limit { "OVER LIMIT" } else { "ok" }
}

#[derive(Serialize)]
struct BridgesSnippet {
    bridges: Vec<BridgeConfig>,
}

/// Ready-to-paste `[[bridges]]` tables for the suggested layout.
///
/// # Errors
///
/// Returns an error if TOML rendering fails.
pub fn bridges_snippet(suggestion: &CapacitySuggestion) -> Result<String, toml::ser::Error> {
    let snippet = BridgesSnippet {
        bridges: suggestion
            .bridges
            .iter()
            .map(|bridge| BridgeConfig::new(bridge.name.clone(), bridge.areas.iter().cloned()))
            .collect(),
    };
    toml::to_string_pretty(&snippet)
}

/// Print the `analyze` report.
///
/// # Errors
///
/// Returns an error if writing to `out` or rendering the snippet fails.
pub fn analyze(out: &mut impl Write, suggestion: &CapacitySuggestion) -> anyhow::Result<()> {
    heading(out, "Entity counts by area (after filtering)")?;
    for floor in &suggestion.floors {
        writeln!(out)?;
        writeln!(out, "{} ({} entities)", floor.label(), floor.total())?;
        for area in floor.areas_by_load() {
            writeln!(
                out,
                "   {}: {} ({}L, {}S)",
                area.name,
                area.total(),
                area.lights,
                area.switches
            )?;
        }
    }

    writeln!(out)?;
    heading(out, "Suggested bridge configuration")?;
    writeln!(out)?;
    writeln!(out, "Total entities: {}", suggestion.total_entities)?;
    writeln!(
        out,
        "Minimum bridges needed: {} (to stay under {CAPACITY_CEILING} each)",
        suggestion.minimum_bridges
    )?;
    writeln!(out)?;
    for bridge in &suggestion.bridges {
        writeln!(
            out,
            "[{}] {}: {} entities",
            status(bridge.is_over_limit()),
            bridge.name,
            bridge.count
        )?;
        writeln!(out, "   Areas: {}", bridge.areas.join(", "))?;
    }

    writeln!(out)?;
    heading(out, "hkbridge.toml snippet")?;
    writeln!(out)?;
    write!(out, "{}", bridges_snippet(suggestion)?)?;
    Ok(())
}

/// Print the `generate` summary.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn generate(out: &mut impl Write, report: &GenerateReport) -> io::Result<()> {
    heading(out, "Generated bridge mapping")?;
    writeln!(out)?;
    for bridge in &report.bridges {
        writeln!(
            out,
            "[{}] {}: {} entities ({} lights, {} switches)",
            status(bridge.is_over_limit()),
            bridge.name,
            bridge.total(),
            bridge.lights,
            bridge.switches
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Excluded entities: {}", report.excluded_total())?;
    for (platform, count) in &report.excluded_by_platform {
        writeln!(out, "   {platform}: {count}")?;
    }
    writeln!(
        out,
        "Unassigned entities (no matching bridge): {}",
        report.unassigned()
    )?;
    writeln!(out)?;
    writeln!(out, "Mapping written to {}", report.location.display())
}

/// Print the `apply` outcome.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn apply(out: &mut impl Write, report: &ApplyReport) -> io::Result<()> {
    let title = if report.dry_run {
        "Applying mapping (dry run)"
    } else {
        "Applying mapping"
    };
    heading(out, title)?;
    writeln!(out)?;
    for name in &report.merge.unmatched {
        writeln!(out, "[skipped] {name}: no HomeKit bridge with this title")?;
    }
    for update in &report.merge.updated {
        writeln!(
            out,
            "[{}] {}: {} entities",
            status(update.is_over_limit()),
            update.name,
            update.entities
        )?;
    }
    writeln!(out)?;
    if let Some(backup) = &report.backup {
        writeln!(out, "Backup: {}", backup.display())?;
    }
    match &report.written {
        Some(path) => writeln!(out, "Written: {}", path.display()),
        None => writeln!(out, "Dry run: nothing was written, service untouched"),
    }
}

/// Print the `validate` report.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn validate(out: &mut impl Write, statuses: &[BridgeStatus]) -> io::Result<()> {
    heading(out, "Current HomeKit bridges")?;
    writeln!(out)?;
    for bridge in statuses {
        let (count, mode) = match &bridge.mode {
            FilterMode::Include(count) => (count.to_string(), "Include"),
            FilterMode::Domain(domains) => (format!("all {}", domains.join(", ")), "Domain"),
            FilterMode::Unknown => ("?".to_string(), "Unknown"),
        };
        let flag = if bridge.is_over_limit() {
            " [OVER LIMIT]"
        } else {
            ""
        };
        writeln!(out, "  {}: {count} entities ({mode} mode){flag}", bridge.title)?;
    }
    Ok(())
}

/// Print the `list` report.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn list(out: &mut impl Write, listings: &[BridgeListing]) -> io::Result<()> {
    heading(out, "HomeKit bridges")?;
    for bridge in listings {
        writeln!(out)?;
        writeln!(out, "  {}", bridge.title)?;
        writeln!(out, "    Entry ID: {}", bridge.entry_id)?;
        writeln!(out, "    Port: {}", bridge.port.as_deref().unwrap_or("?"))?;
    }
    Ok(())
}
