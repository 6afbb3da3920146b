use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UploadError;

/// Upload category. Each one owns a local partition and a bucket prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Images,
    Pdfs,
    Html,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Images, Category::Pdfs, Category::Html];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Pdfs => "pdfs",
            Category::Html => "html",
        }
    }

    /// Lower-case extensions accepted for this category
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &["jpg", "jpeg", "png", "gif"],
            Category::Pdfs => &["pdf"],
            Category::Html => &["html"],
        }
    }

    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions().contains(&extension)
    }

    /// Message returned to clients when an extension is rejected
    pub fn rejection_message(&self) -> &'static str {
        match self {
            Category::Images => "Invalid image file.",
            Category::Pdfs => "Only PDF files allowed.",
            Category::Html => "Only HTML files allowed.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "images" => Ok(Category::Images),
            "pdfs" => Ok(Category::Pdfs),
            "html" => Ok(Category::Html),
            other => Err(UploadError::InvalidCategory(other.to_string())),
        }
    }
}

/// How a stored file is presented by the read endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    pub fn header_value(&self, identifier: &str) -> String {
        match self {
            Disposition::Inline => "inline".to_string(),
            Disposition::Attachment => format!("attachment; filename=\"{}\"", identifier),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub uuid: String,
    pub message: String,
}

impl UploadResponse {
    pub fn new(identifier: String) -> Self {
        Self {
            uuid: identifier,
            message: "Upload successful".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
