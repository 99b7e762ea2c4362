//! Shared model and service access for the notewright app and cli.

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod library;
pub mod types;
pub mod upload;

pub use crate::client::ApiClient;
pub use crate::config::ApiConfig;
pub use crate::error::{NotewrightError, ValidationError};
pub use crate::types::{Document, DocumentId, GenerateResponse};
pub use crate::upload::{AddOutcome, IncomingFile, UploadBatch, UploadEntry, UploadKind};
