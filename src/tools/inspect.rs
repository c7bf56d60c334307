//! Read-only operations: list stored presentations, describe one in detail.

use std::fmt;

use chrono::{DateTime, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PowerPointServerError, Result};
use crate::pptx::Presentation;
use crate::storage::{normalize_filename, sanitize_filename, PresentationStore};

// ============== List Presentations ==============

/// Parameters for listing presentations (none required).
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListPresentationsParams {}

/// One stored presentation file.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PresentationListEntry {
    /// Filename within the storage directory.
    pub filename: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub modified: DateTime<Local>,
}

/// Result of listing presentations.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ListPresentationsResult {
    /// Storage directory that was listed.
    pub directory: String,
    /// False when the storage directory has not been created yet.
    pub directory_exists: bool,
    /// Files with the presentation extension, sorted by filename.
    pub presentations: Vec<PresentationListEntry>,
}

impl fmt::Display for ListPresentationsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.directory_exists {
            return write!(
                f,
                "📁 Directory {} does not exist yet. Create a presentation first!",
                self.directory
            );
        }
        if self.presentations.is_empty() {
            return write!(
                f,
                "📁 No PowerPoint presentations found in {}",
                self.directory
            );
        }

        writeln!(f, "📊 PowerPoint Presentations in {}:", self.directory)?;
        writeln!(f)?;
        for (i, entry) in self.presentations.iter().enumerate() {
            writeln!(f, "{}. **{}**", i + 1, entry.filename)?;
            writeln!(f, "   - Size: {} bytes", group_thousands(entry.size_bytes))?;
            writeln!(
                f,
                "   - Modified: {}",
                entry.modified.format("%Y-%m-%d %H:%M:%S")
            )?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// List all presentation files in the storage directory.
pub fn list_presentations(
    store: &PresentationStore,
    _params: ListPresentationsParams,
) -> Result<ListPresentationsResult> {
    tracing::info!("Listing presentations");

    let directory = store.root_display();
    match store.list_files()? {
        None => Ok(ListPresentationsResult {
            directory,
            directory_exists: false,
            presentations: Vec::new(),
        }),
        Some(files) => Ok(ListPresentationsResult {
            directory,
            directory_exists: true,
            presentations: files
                .into_iter()
                .map(|f| PresentationListEntry {
                    filename: f.filename,
                    size_bytes: f.size_bytes,
                    modified: f.modified,
                })
                .collect(),
        }),
    }
}

// ============== Get Presentation Info ==============

/// Parameters for describing a presentation.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetPresentationInfoParams {
    /// Presentation to describe.
    #[serde(default)]
    pub filename: String,
}

/// Detailed information about one presentation.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GetPresentationInfoResult {
    /// Sanitized filename.
    pub filename: String,
    /// Full path on disk.
    pub path: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub modified: DateTime<Local>,
    /// Number of slides.
    pub slide_count: usize,
    /// Per-slide titles in slide order; `"Untitled"` when a slide has no
    /// readable title.
    pub slide_titles: Vec<String>,
}

impl fmt::Display for GetPresentationInfoResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Presentation Info: **{}**", self.filename)?;
        writeln!(f)?;
        writeln!(f, "📁 File Details:")?;
        writeln!(f, "- Size: {} bytes", group_thousands(self.size_bytes))?;
        writeln!(f, "- Modified: {}", self.modified.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "- Location: {}", self.path)?;
        writeln!(f)?;
        writeln!(f, "📄 Slide Details:")?;
        writeln!(f, "- Total slides: {}", self.slide_count)?;
        if !self.slide_titles.is_empty() {
            writeln!(f)?;
            writeln!(f, "📋 Slide Titles:")?;
            for (i, title) in self.slide_titles.iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, title)?;
            }
        }
        Ok(())
    }
}

/// Describe a presentation: file facts, slide count, per-slide titles.
pub fn get_presentation_info(
    store: &PresentationStore,
    params: GetPresentationInfoParams,
) -> Result<GetPresentationInfoResult> {
    tracing::info!("Getting info for: {}", params.filename);

    let safe = sanitize_filename(&params.filename);
    if safe.is_empty() {
        return Err(PowerPointServerError::FilenameRequired);
    }

    let filename = normalize_filename(&safe);
    let path = store.resolve(&safe);
    if !path.exists() {
        return Err(PowerPointServerError::PresentationNotFound {
            name: filename,
            dir: store.root_display(),
        });
    }

    let prs = Presentation::open(&path)?;
    let (size_bytes, modified) = store.metadata(&path)?;

    let slide_titles = prs
        .slides()
        .iter()
        .map(|s| s.title_or_untitled().to_string())
        .collect();

    Ok(GetPresentationInfoResult {
        filename,
        path: path.display().to_string(),
        size_bytes,
        modified,
        slide_count: prs.slide_count(),
        slide_titles,
    })
}

/// Format a byte count with thousands separators, e.g. `28,701`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(28701), "28,701");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_list_display_missing_directory() {
        let result = ListPresentationsResult {
            directory: "/tmp/PowerPoints".to_string(),
            directory_exists: false,
            presentations: Vec::new(),
        };
        assert_eq!(
            result.to_string(),
            "📁 Directory /tmp/PowerPoints does not exist yet. Create a presentation first!"
        );
    }

    #[test]
    fn test_list_display_no_files() {
        let result = ListPresentationsResult {
            directory: "/tmp/PowerPoints".to_string(),
            directory_exists: true,
            presentations: Vec::new(),
        };
        assert_eq!(
            result.to_string(),
            "📁 No PowerPoint presentations found in /tmp/PowerPoints"
        );
    }
}
