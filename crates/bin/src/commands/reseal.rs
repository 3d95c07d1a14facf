//! Reseal command - rewrites the document under the configured encryption key.

use crate::backend::create_backend;
use crate::cli::BackendArgs;
use crate::output::{OutputFormat, print_json};

/// Run the reseal command
pub async fn run(args: &BackendArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(args)?;
    if !backend.is_encrypted() {
        return Err("reseal requires --encryption-key or PREFSTORE_ENCRYPTION_KEY".into());
    }

    let users = backend.reseal().await?;

    match format {
        OutputFormat::Human => println!("Resealed {users} user records"),
        OutputFormat::Json => print_json(&serde_json::json!({ "resealed": users }))?,
    }

    Ok(())
}
