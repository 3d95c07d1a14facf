//! Store info command - shows backend, encryption and user counts.

use crate::backend::{backend_label, create_backend};
use crate::cli::BackendArgs;
use crate::output::{OutputFormat, print_json};

/// Run the info command
pub async fn run(args: &BackendArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(args)?;
    let store = backend.load().await?;

    let backend_str = backend_label(args);
    let users = store.len();
    let active = store.records().filter(|(_, r)| r.is_active()).count();
    let subscribers = store.all_active_keys_with_subscriptions().len();
    let sharing = store.records().filter(|(_, r)| r.shares_events()).count();
    let encryption = if backend.is_encrypted() { "on" } else { "off" };

    match format {
        OutputFormat::Human => {
            println!("Backend:      {backend_str}");
            println!("Encryption:   {encryption}");
            println!("Users:        {users}");
            println!("Active:       {active}");
            println!("Subscribers:  {subscribers}");
            println!("Sharing:      {sharing}");
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "backend": backend_str,
                "encryption": backend.is_encrypted(),
                "users": users,
                "active": active,
                "subscribers": subscribers,
                "sharing": sharing,
            }))?;
        }
    }

    Ok(())
}
