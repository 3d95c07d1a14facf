//! Prune command - forgets old seen-item entries.

use std::time::Duration;

use crate::backend::create_backend;
use crate::cli::{BackendArgs, PruneArgs};
use crate::output::{OutputFormat, print_json};

const SECS_PER_DAY: u64 = 86_400;

/// Run the prune command
pub async fn run(
    backend_args: &BackendArgs,
    args: &PruneArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(backend_args)?;
    let mut store = backend.load().await?;

    let max_age = Duration::from_secs(args.max_age_days.saturating_mul(SECS_PER_DAY));
    let removed = store.prune_seen_ids(max_age);
    let saved = removed > 0 && !args.dry_run;
    if saved {
        backend.save(&store).await?;
    }

    match format {
        OutputFormat::Human => {
            println!(
                "Removed {removed} seen items older than {} days{}",
                args.max_age_days,
                if args.dry_run { " (dry run)" } else { "" }
            );
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "removed": removed,
                "max_age_days": args.max_age_days,
                "saved": saved,
            }))?;
        }
    }

    Ok(())
}
