//! Backend creation and utility functions.

use std::path::PathBuf;
use std::time::Duration;

use prefstore::{BackendConfig, DocumentBackend, FieldCipher};

use crate::cli::{Backend, BackendArgs};

/// Human-readable description of where the document lives
pub fn backend_label(args: &BackendArgs) -> String {
    match args.backend {
        Backend::Gist => format!(
            "gist:{}/{}",
            args.document_id.as_deref().unwrap_or("<unset>"),
            args.file_name
        ),
        Backend::File => format!("file:{}", document_path(args).display()),
    }
}

fn document_path(args: &BackendArgs) -> PathBuf {
    args.data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(&args.file_name)
}

/// Create the document backend described by the arguments
pub fn create_backend(args: &BackendArgs) -> Result<DocumentBackend, Box<dyn std::error::Error>> {
    let backend = match args.backend {
        Backend::Gist => {
            let document_id = args
                .document_id
                .as_ref()
                .ok_or("Gist backend requires --document-id or PREFSTORE_DOCUMENT_ID")?;
            let config = BackendConfig::new(document_id, args.token.clone().unwrap_or_default())
                .with_file_name(&args.file_name)
                .with_api_base(&args.api_base)
                .with_timeout(Duration::from_secs(args.timeout));
            tracing::info!(backend = %backend_label(args), "Using gist backend");
            DocumentBackend::gist(&config)?
        }
        Backend::File => {
            let path = document_path(args);
            tracing::info!(path = %path.display(), "Using file backend");
            DocumentBackend::file(path)
        }
    };

    match args.encryption_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(secret) => Ok(backend.with_cipher(FieldCipher::from_secret(secret)?)),
        None => {
            tracing::warn!("No encryption key configured; sensitive fields are stored in plaintext");
            Ok(backend)
        }
    }
}
