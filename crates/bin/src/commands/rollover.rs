//! Rollover command - archives weekly statistics that belong to a past week.

use crate::backend::create_backend;
use crate::cli::{BackendArgs, RolloverArgs};
use crate::output::{OutputFormat, print_json};

/// Run the rollover command
pub async fn run(
    backend_args: &BackendArgs,
    args: &RolloverArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(backend_args)?;
    let mut store = backend.load().await?;

    let archived = store.rollover_weekly_stats();
    let saved = archived > 0 && !args.dry_run;
    if saved {
        backend.save(&store).await?;
    }

    match format {
        OutputFormat::Human => {
            println!(
                "Archived weekly stats for {archived} of {} users{}",
                store.len(),
                if args.dry_run { " (dry run)" } else { "" }
            );
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "archived": archived,
                "users": store.len(),
                "saved": saved,
            }))?;
        }
    }

    Ok(())
}
