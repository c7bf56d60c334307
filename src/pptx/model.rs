//! In-memory presentation model.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{PowerPointServerError, Result};

use super::{reader, writer};

/// Built-in slide layout templates, positionally indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideLayout {
    /// Index 0: centered title with a subtitle below.
    Title,
    /// Index 1: title bar with a content body.
    TitleAndContent,
}

impl SlideLayout {
    /// Look up a layout by its positional index.
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Self::Title),
            1 => Ok(Self::TitleAndContent),
            other => Err(PowerPointServerError::InvalidLayout(other)),
        }
    }

    /// Positional index of this layout in the built-in template list.
    pub fn index(&self) -> usize {
        match self {
            Self::Title => 0,
            Self::TitleAndContent => 1,
        }
    }
}

/// Paragraph alignment within a text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    /// OOXML `algn` attribute code.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
        }
    }

    pub(crate) fn from_code(code: &str) -> Option<Self> {
        match code {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One paragraph of body text with its frame-level formatting.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub text: String,
    /// Font size in points, when explicitly set.
    pub size_pt: Option<u32>,
    pub align: Option<Align>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// A slide at a fixed ordinal position in a presentation.
///
/// Both built-in layouts carry a title placeholder and a body placeholder
/// (a subtitle on the title layout), so text assignment is always valid.
#[derive(Debug, Clone)]
pub struct Slide {
    layout: SlideLayout,
    title: Option<String>,
    body: Vec<Paragraph>,
}

impl Slide {
    pub(crate) fn new(layout: SlideLayout) -> Self {
        Self {
            layout,
            title: None,
            body: Vec::new(),
        }
    }

    pub(crate) fn with_content(
        layout: SlideLayout,
        title: Option<String>,
        body: Vec<Paragraph>,
    ) -> Self {
        Self {
            layout,
            title,
            body,
        }
    }

    pub fn layout(&self) -> SlideLayout {
        self.layout
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Title text for display, falling back to `"Untitled"` when the slide
    /// has no title shape or the title is empty.
    pub fn title_or_untitled(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Untitled",
        }
    }

    pub fn body(&self) -> &[Paragraph] {
        &self.body
    }

    /// Assign the title placeholder text.
    pub fn set_title(&mut self, text: &str) {
        self.title = Some(text.trim().to_string());
    }

    /// Assign the body placeholder text, one paragraph per line.
    pub fn set_body(&mut self, text: &str) {
        self.body = text.trim().split('\n').map(Paragraph::new).collect();
    }

    /// Apply a uniform font size and alignment to every body paragraph,
    /// overwriting whatever was set before.
    pub fn format_body(&mut self, size_pt: u32, align: Align) {
        for para in &mut self.body {
            para.size_pt = Some(size_pt);
            para.align = Some(align);
        }
    }
}

/// An ordered sequence of slides, identified only by its path on disk.
///
/// The handle never outlives a request: every operation reopens the file and,
/// on success, re-serializes it in full.
#[derive(Debug, Default)]
pub struct Presentation {
    slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation with zero slides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a presentation from an existing `.pptx` file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            PowerPointServerError::PackageInvalid(format!("{}: {}", path.display(), e))
        })?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| {
            PowerPointServerError::PackageInvalid(format!("{}: {}", path.display(), e))
        })?;
        reader::read_package(archive)
    }

    /// Serialize the full presentation to disk, overwriting any existing
    /// file at the path. Not atomic.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        writer::write_package(self, BufWriter::new(file))
    }

    /// Append a slide built from the given layout template.
    pub fn add_slide(&mut self, layout: SlideLayout) -> &mut Slide {
        self.slides.push(Slide::new(layout));
        self.slides.last_mut().unwrap()
    }

    pub(crate) fn push_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_index() {
        assert_eq!(SlideLayout::from_index(0).unwrap(), SlideLayout::Title);
        assert_eq!(
            SlideLayout::from_index(1).unwrap(),
            SlideLayout::TitleAndContent
        );
        assert!(SlideLayout::from_index(2).is_err());
    }

    #[test]
    fn test_new_presentation_is_empty() {
        assert_eq!(Presentation::new().slide_count(), 0);
    }

    #[test]
    fn test_add_slide_appends_in_order() {
        let mut prs = Presentation::new();
        prs.add_slide(SlideLayout::Title).set_title("First");
        prs.add_slide(SlideLayout::TitleAndContent).set_title("Second");

        assert_eq!(prs.slide_count(), 2);
        assert_eq!(prs.slides()[0].title(), Some("First"));
        assert_eq!(prs.slides()[1].title(), Some("Second"));
    }

    #[test]
    fn test_set_body_splits_paragraphs() {
        let mut slide = Slide::new(SlideLayout::TitleAndContent);
        slide.set_body("one\ntwo\nthree");
        let texts: Vec<_> = slide.body().iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_format_body_is_uniform() {
        let mut slide = Slide::new(SlideLayout::TitleAndContent);
        slide.set_body("a\nb");
        slide.body[0].size_pt = Some(32);
        slide.format_body(14, Align::Left);

        for para in slide.body() {
            assert_eq!(para.size_pt, Some(14));
            assert_eq!(para.align, Some(Align::Left));
        }
    }

    #[test]
    fn test_untitled_fallback() {
        let mut slide = Slide::new(SlideLayout::TitleAndContent);
        assert_eq!(slide.title_or_untitled(), "Untitled");
        slide.set_title("   ");
        assert_eq!(slide.title_or_untitled(), "Untitled");
        slide.set_title("Roadmap");
        assert_eq!(slide.title_or_untitled(), "Roadmap");
    }
}
