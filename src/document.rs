//! Create-document payload.
//!
//! Field names follow the wire format of the document API, which mixes
//! camelCase and snake_case keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Document to be registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document body
    pub description: Description,
}

/// Header fields and line items of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// INN of the participant submitting the document
    #[serde(rename = "participantInn")]
    pub submitter_inn: String,

    pub doc_id: String,

    pub doc_status: String,

    pub doc_type: String,

    #[serde(rename = "importRequest", default)]
    pub import_request: bool,

    pub owner_inn: String,

    pub participant_inn: String,

    pub producer_inn: String,

    /// Serialized as `YYYY-MM-DD`
    pub production_date: NaiveDate,

    pub production_type: String,

    #[serde(default)]
    pub products: Vec<Product>,

    /// Assigned by the registry; absent on new documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_date: Option<String>,

    /// Assigned by the registry; absent on new documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_number: Option<String>,
}

/// A single product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_number: Option<String>,

    pub owner_inn: String,

    pub producer_inn: String,

    pub production_date: NaiveDate,

    pub tnved_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uit_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uitu_code: Option<String>,
}

/// Body of a create-document call: the document and its detached signature.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRequest<'a> {
    pub document: &'a Document,
    pub signature: &'a str,
}

impl<'a> DocumentRequest<'a> {
    pub fn new(document: &'a Document, signature: &'a str) -> Self {
        Self {
            document,
            signature,
        }
    }
}

impl Document {
    /// Load a document from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading document");

        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
