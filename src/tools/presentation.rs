//! Mutating operations: create a presentation, append a slide.

use std::fmt;

use chrono::Local;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PowerPointServerError, Result};
use crate::pptx::{Align, Presentation, SlideLayout};
use crate::storage::{normalize_filename, sanitize_filename, PresentationStore};

/// Font size applied to every body paragraph of an appended slide.
const BODY_FONT_SIZE_PT: u32 = 14;

// ============== Create Presentation ==============

/// Parameters for creating a presentation.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePresentationParams {
    /// Logical presentation name; sanitized into the on-disk filename.
    #[serde(default)]
    pub filename: String,
    /// Optional title; when present, a title slide is added.
    #[serde(default)]
    pub title: String,
}

/// Result of creating a presentation.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CreatePresentationResult {
    /// Sanitized filename the presentation was saved under.
    pub filename: String,
    /// Directory the file was written to.
    pub directory: String,
    /// Whether a title slide was added.
    pub title_slide: bool,
}

impl fmt::Display for CreatePresentationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✅ Success: Created presentation '{}' in {}",
            self.filename, self.directory
        )
    }
}

/// Create a new presentation file, overwriting any existing file of the
/// same name.
pub fn create_presentation(
    store: &PresentationStore,
    params: CreatePresentationParams,
) -> Result<CreatePresentationResult> {
    tracing::info!("Creating presentation: {}", params.filename);

    let safe = sanitize_filename(&params.filename);
    if safe.is_empty() {
        return Err(PowerPointServerError::FilenameRequired);
    }

    store.ensure_root()?;
    let _guard = store.write_guard()?;

    let mut prs = Presentation::new();
    let title = params.title.trim();
    if !title.is_empty() {
        let slide = prs.add_slide(SlideLayout::Title);
        slide.set_title(title);
        slide.set_body(&format!("Created on {}", Local::now().format("%B %d, %Y")));
    }

    let filename = normalize_filename(&safe);
    prs.save(&store.resolve(&safe))?;

    Ok(CreatePresentationResult {
        filename,
        directory: store.root_display(),
        title_slide: !title.is_empty(),
    })
}

// ============== Add Slide ==============

/// Parameters for appending a slide.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddSlideParams {
    /// Presentation to append to.
    #[serde(default)]
    pub filename: String,
    /// Title placeholder text for the new slide.
    #[serde(default)]
    pub slide_title: String,
    /// Body placeholder text; lines become separate paragraphs.
    #[serde(default)]
    pub slide_content: String,
}

/// Result of appending a slide.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AddSlideResult {
    /// Sanitized filename of the updated presentation.
    pub filename: String,
    /// Total slide count after the append.
    pub slide_count: usize,
}

impl fmt::Display for AddSlideResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✅ Success: Added slide to '{}'. Total slides: {}",
            self.filename, self.slide_count
        )
    }
}

/// Append a title+content slide to an existing presentation.
pub fn add_slide(store: &PresentationStore, params: AddSlideParams) -> Result<AddSlideResult> {
    tracing::info!("Adding slide to: {}", params.filename);

    let safe = sanitize_filename(&params.filename);
    if safe.is_empty() {
        return Err(PowerPointServerError::FilenameRequired);
    }

    let filename = normalize_filename(&safe);
    let path = store.resolve(&safe);
    let _guard = store.write_guard()?;

    if !path.exists() {
        return Err(PowerPointServerError::PresentationNotFound {
            name: filename,
            dir: store.root_display(),
        });
    }

    let mut prs = Presentation::open(&path)?;
    let slide = prs.add_slide(SlideLayout::TitleAndContent);

    let title = params.slide_title.trim();
    if !title.is_empty() {
        slide.set_title(title);
    }

    let content = params.slide_content.trim();
    if !content.is_empty() {
        slide.set_body(content);
        slide.format_body(BODY_FONT_SIZE_PT, Align::Left);
    }

    prs.save(&path)?;

    Ok(AddSlideResult {
        filename,
        slide_count: prs.slide_count(),
    })
}
