use project_filter_graph::TreeEntry;
use project_filter_protocol::{FilterReport, ProjectId};
use serde::Serialize;

/// `--json` payload of the `apply` command.
#[derive(Serialize)]
pub struct ApplyOutput<'a> {
    pub solution: &'a str,
    pub report: &'a FilterReport,
    pub projects: &'a [TreeEntry],
}

pub fn render_tree(solution: &str, entries: &[TreeEntry]) -> String {
    let mut out = format!("Solution '{solution}'\n");
    for entry in entries {
        let indent = "  ".repeat(entry.depth + 1);
        if entry.kind.is_folder() {
            out.push_str(&format!("{indent}{}/\n", entry.name));
            continue;
        }
        let marker = if entry.loaded { "[x]" } else { "[ ]" };
        let shared = if entry.kind.is_shared() { " (shared)" } else { "" };
        out.push_str(&format!("{indent}{marker} {}{shared}\n", entry.name));
    }
    out
}

pub fn render_report(report: &FilterReport) -> String {
    if report.skipped {
        return "Nothing to do\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Loaded {}: {}\n",
        report.loaded.len(),
        join(&report.loaded)
    ));
    out.push_str(&format!(
        "Unloaded {}: {}\n",
        report.unloaded.len(),
        join(&report.unloaded)
    ));
    for failure in &report.failed {
        out.push_str(&format!(
            "Failed to {} {}: {}\n",
            failure.operation, failure.project, failure.message
        ));
    }
    if report.cancelled {
        out.push_str("Cancelled before all projects were processed\n");
    }
    out
}

fn join(ids: &[ProjectId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(ProjectId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
