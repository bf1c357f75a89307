mod telemetry;

use mr_fetcher::{ChangeSummary, ReviewBatch, ReviewConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional; CI jobs pass everything through the environment.
    let dotenv = dotenvy::dotenv();

    telemetry::init();

    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(%err, "failed to load .env");
        }
    }

    let cfg = ReviewConfig::from_env()?;

    let Some(batch) = mr_fetcher::collect_review_batch(&cfg).await? else {
        return Ok(());
    };

    print_summary(&batch);

    let documents = batch.documents();
    println!("{}", serde_json::to_string_pretty(&documents)?);

    Ok(())
}

/// Per-file overview, logged through `tracing` like the rest of the run.
fn print_summary(batch: &ReviewBatch) {
    let mr = &batch.info;
    info!("# {} !{}: {}", mr.id.project, mr.id.iid, mr.title);
    info!(
        "author: {}, branches: {} -> {}",
        mr.author_name, mr.source_branch, mr.target_branch
    );
    if let Some(latest) = batch.commits.first() {
        info!("latest commit: {} {}", latest.id, latest.title);
    }

    for c in &batch.changes {
        info!(
            "{} ({}): Add({}) / Del({})",
            c.file_path, c.status, c.added_lines, c.removed_lines
        );
    }

    info!("{}", totals_line(&batch.summary()));

    let reviewable = batch.changes.iter().filter(|c| c.is_reviewable()).count();
    if reviewable == 0 {
        warn!("no added or modified files to review");
    }
}

fn totals_line(s: &ChangeSummary) -> String {
    format!(
        "{} files: +{} / -{} (added {}, modified {}, deleted {}, renamed {}, unknown {})",
        s.files,
        s.added_lines,
        s.removed_lines,
        s.added_files,
        s.modified_files,
        s.deleted_files,
        s.renamed_files,
        s.unknown_files
    )
}
