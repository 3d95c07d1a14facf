//! Show command - prints a single user's record.

use chrono::DateTime;
use prefstore::store::StoreError;

use crate::backend::create_backend;
use crate::cli::{BackendArgs, ShowArgs};
use crate::output::{OutputFormat, print_json, print_table, truncate};

const NOTE_COLUMN_CHARS: usize = 40;

/// Run the show command
pub async fn run(
    backend_args: &BackendArgs,
    args: &ShowArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_backend(backend_args)?.load().await?;
    let (_, record) = store
        .records()
        .find(|(key, _)| *key == args.key)
        .ok_or_else(|| prefstore::Error::from(StoreError::UserNotFound {
            key: args.key.clone(),
        }))?;

    if format == OutputFormat::Json {
        print_json(&serde_json::json!({
            "key": args.key,
            "record": record,
            "totals": record.all_time_stats(),
        }))?;
        return Ok(());
    }

    let created = DateTime::from_timestamp(record.created_at(), 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.created_at().to_string());
    let subscriptions: Vec<&str> = record.subscriptions().collect();
    let reminders: Vec<String> = record.reminder_offsets().map(|d| d.to_string()).collect();
    let totals = record.all_time_stats();

    println!("User:         {}", args.key);
    println!("Active:       {}", record.is_active());
    println!("Created:      {created}");
    println!("Regions:      {}", subscriptions.join(", "));
    println!(
        "Digest:       {} at {:02}:00 (weekday {})",
        record.digest_mode(),
        record.digest_hour(),
        record.digest_weekday()
    );
    println!("Reminders:    {} days before", reminders.join(", "));
    println!("Seen items:   {}", record.seen_count());
    println!("Invite code:  {}", record.invite_code());
    println!("Sharing:      {}", record.shares_events());
    println!("Friends:      {}", record.friend_count());
    println!(
        "All time:     {} viewed, {} registered over {} weeks",
        totals.items_viewed, totals.items_registered, totals.weeks_tracked
    );

    let mut items: Vec<&str> = record
        .notes()
        .keys()
        .map(String::as_str)
        .chain(prefstore::record::ItemStatus::ALL.iter().flat_map(|s| record.items_with_status(*s)))
        .collect();
    items.sort_unstable();
    items.dedup();

    let rows: Vec<Vec<String>> = items
        .into_iter()
        .map(|item| {
            vec![
                item.to_string(),
                record.item_status(item).map(|s| s.to_string()).unwrap_or_default(),
                truncate(record.note(item).unwrap_or_default(), NOTE_COLUMN_CHARS),
            ]
        })
        .collect();
    if !rows.is_empty() {
        println!();
        print_table(&["ITEM", "STATUS", "NOTE"], &rows);
    }

    Ok(())
}
