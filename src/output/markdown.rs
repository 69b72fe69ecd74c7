//! Markdown summary generation
//!
//! Renders the run metadata, per-stage pass history, residual failures and
//! the head of the priority list into a human-readable report.

use crate::output::RunSummary;
use crate::storage::StorageResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary to `output_path`
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> StorageResult<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Gene Wiki Priority Summary\n\n");

    md.push_str("## Run Information\n\n");
    match &summary.run {
        Some(run) => {
            md.push_str(&format!("- **Run ID**: {}\n", run.id));
            md.push_str(&format!("- **Stage**: {}\n", run.stage));
            md.push_str(&format!("- **Started**: {}\n", run.started_at));
            if let Some(finished) = &run.finished_at {
                md.push_str(&format!("- **Finished**: {}\n", finished));
            }
            if let Some(duration) = summary.duration_seconds {
                md.push_str(&format!(
                    "- **Duration**: {} seconds ({:.2} minutes)\n",
                    duration,
                    duration as f64 / 60.0
                ));
            }
            md.push_str(&format!("- **Status**: {}\n", run.status.to_db_string()));
            md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));
        }
        None => md.push_str("No runs recorded.\n\n"),
    }

    md.push_str("## Tables\n\n");
    md.push_str("| Table | Rows |\n");
    md.push_str("|-------|------|\n");
    for (name, rows) in &summary.table_rows {
        match rows {
            Some(rows) => md.push_str(&format!("| {} | {} |\n", name, rows)),
            None => md.push_str(&format!("| {} | missing |\n", name)),
        }
    }
    md.push('\n');

    if !summary.passes.is_empty() {
        md.push_str("## Passes\n\n");
        md.push_str("| Stage | Pass | Attempted | Succeeded | Quarantined |\n");
        md.push_str("|-------|------|-----------|-----------|-------------|\n");
        for pass in &summary.passes {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                pass.stage, pass.pass_number, pass.attempted, pass.succeeded, pass.failed
            ));
        }
        md.push('\n');
    }

    md.push_str("## Residual Failures\n\n");
    if summary.residual_failures.iter().all(|(_, n)| *n == 0) {
        md.push_str("None.\n\n");
    } else {
        md.push_str("| List | Items |\n");
        md.push_str("|------|-------|\n");
        for (list, count) in &summary.residual_failures {
            md.push_str(&format!("| {} | {} |\n", list, count));
        }
        md.push('\n');
    }

    if !summary.top_genes.is_empty() {
        md.push_str(&format!(
            "## Top {} Genes by Priority Score\n\n",
            summary.top_genes.len()
        ));
        md.push_str("| Gene | Article | Length | Publications | Median Year | Score |\n");
        md.push_str("|------|---------|--------|--------------|-------------|-------|\n");
        for gene in &summary.top_genes {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.3} |\n",
                gene.gene_id,
                gene.title,
                gene.page_length,
                gene.pubcount,
                gene.median_pub_year,
                gene.priority_score
            ));
        }
        md.push('\n');
    }

    md
}
