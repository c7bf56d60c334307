//! Parsing of `.pptx` packages back into the presentation model.
//!
//! Slide order comes from the presentation relationships part; per-slide
//! content comes from an event walk over the slide XML, keyed on the
//! placeholder type of each shape.

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{PowerPointServerError, Result};

use super::model::{Align, Paragraph, Presentation, Slide, SlideLayout};

const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// Parse a full package from an open archive.
pub fn read_package<R: Read + Seek>(mut archive: ZipArchive<R>) -> Result<Presentation> {
    let slide_paths = slide_order(&mut archive)?;

    let mut prs = Presentation::new();
    for slide_path in &slide_paths {
        let layout = slide_layout(&mut archive, slide_path);
        let xml = read_part(&mut archive, slide_path)?;
        prs.push_slide(parse_slide(&xml, layout)?);
    }
    Ok(prs)
}

/// Ordered list of slide part paths from the presentation relationships.
fn slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels = read_part(archive, PRESENTATION_RELS).map_err(|_| {
        PowerPointServerError::PackageInvalid("missing presentation relationships".to_string())
    })?;

    let mut slides: Vec<(String, Option<usize>)> = Vec::new();
    for rel in parse_relationships(&rels)? {
        if !rel.rel_type.ends_with("/slide") {
            continue;
        }
        let order = trailing_number(&rel.id).or_else(|| trailing_number(&rel.target));
        slides.push((resolve_part_path("ppt", &rel.target), order));
    }

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

/// Layout template for a slide, recovered from the slide's own rels part.
///
/// Anything that is not the title layout (or has no readable rels part) is
/// treated as title+content.
fn slide_layout<R: Read + Seek>(archive: &mut ZipArchive<R>, slide_path: &str) -> SlideLayout {
    let rels_path = match slide_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => return SlideLayout::TitleAndContent,
    };
    let Ok(rels) = read_part(archive, &rels_path) else {
        return SlideLayout::TitleAndContent;
    };
    let Ok(relationships) = parse_relationships(&rels) else {
        return SlideLayout::TitleAndContent;
    };

    for rel in relationships {
        if rel.rel_type.ends_with("/slideLayout") && trailing_number(&rel.target) == Some(1) {
            return SlideLayout::Title;
        }
    }
    SlideLayout::TitleAndContent
}

#[derive(Debug)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut relationships = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                };
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        _ => {}
                    }
                }
                relationships.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }
    Ok(relationships)
}

/// Which placeholder a shape fills, from its `p:ph` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderKind {
    Title,
    Body,
    Other,
}

/// Parse one slide part into the model.
fn parse_slide(xml: &str, layout: SlideLayout) -> Result<Slide> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut title: Option<String> = None;
    let mut body: Vec<Paragraph> = Vec::new();

    let mut placeholder = PlaceholderKind::Other;
    let mut paragraphs: Vec<Paragraph> = Vec::new();
    let mut current: Option<Paragraph> = None;
    let mut in_ppr = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    placeholder = PlaceholderKind::Other;
                    paragraphs.clear();
                }
                b"ph" => placeholder = classify_placeholder(e),
                b"p" => current = Some(Paragraph::default()),
                b"pPr" => {
                    read_paragraph_align(e, current.as_mut());
                    in_ppr = true;
                }
                b"defRPr" if in_ppr => read_paragraph_size(e, current.as_mut()),
                b"t" => in_text = true,
                _ => {}
            },
            // Self-closing elements have no matching End, so they must not
            // toggle the in_ppr/in_text flags.
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"ph" => placeholder = classify_placeholder(e),
                b"pPr" => read_paragraph_align(e, current.as_mut()),
                b"defRPr" if in_ppr => read_paragraph_size(e, current.as_mut()),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(para) = current.as_mut() {
                        para.text.push_str(&e.unescape()?);
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"pPr" => in_ppr = false,
                b"p" => {
                    if let Some(para) = current.take() {
                        paragraphs.push(para);
                    }
                }
                b"sp" => {
                    match placeholder {
                        PlaceholderKind::Title => {
                            let text = joined_text(&paragraphs);
                            if title.is_none() && !text.is_empty() {
                                title = Some(text);
                            }
                        }
                        PlaceholderKind::Body => {
                            if body.is_empty() && !all_empty(&paragraphs) {
                                body = std::mem::take(&mut paragraphs);
                            }
                        }
                        PlaceholderKind::Other => {}
                    }
                    placeholder = PlaceholderKind::Other;
                    paragraphs.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(Slide::with_content(layout, title, body))
}

fn read_paragraph_align(e: &quick_xml::events::BytesStart<'_>, para: Option<&mut Paragraph>) {
    if let Some(para) = para {
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"algn" {
                para.align = Align::from_code(&String::from_utf8_lossy(&attr.value));
            }
        }
    }
}

fn read_paragraph_size(e: &quick_xml::events::BytesStart<'_>, para: Option<&mut Paragraph>) {
    if let Some(para) = para {
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"sz" {
                // Stored in hundredths of a point.
                para.size_pt = String::from_utf8_lossy(&attr.value)
                    .parse::<u32>()
                    .ok()
                    .map(|sz| sz / 100);
            }
        }
    }
}

fn classify_placeholder(e: &quick_xml::events::BytesStart<'_>) -> PlaceholderKind {
    let mut ph_type: Option<String> = None;
    let mut idx: Option<String> = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"type" => ph_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
            b"idx" => idx = Some(String::from_utf8_lossy(&attr.value).to_string()),
            _ => {}
        }
    }

    match ph_type.as_deref() {
        Some("title") | Some("ctrTitle") => PlaceholderKind::Title,
        Some("body") | Some("subTitle") => PlaceholderKind::Body,
        None if idx.as_deref() == Some("1") => PlaceholderKind::Body,
        _ => PlaceholderKind::Other,
    }
}

fn joined_text(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn all_empty(paragraphs: &[Paragraph]) -> bool {
    paragraphs.iter().all(|p| p.text.trim().is_empty())
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive.by_name(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Resolve a relationship target against its base part directory.
fn resolve_part_path(base: &str, target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else {
        format!("{}/{}", base, target)
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a trailing number from strings like `rId3` or `slide2.xml`.
fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");
    let digits: String = s
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("rId1"), Some(1));
        assert_eq!(trailing_number("rId12"), Some(12));
        assert_eq!(trailing_number("slides/slide3.xml"), Some(3));
        assert_eq!(trailing_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_parse_slide_title_and_body() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
            <p:txBody><a:p><a:r><a:t>Roadmap</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
            <p:txBody>
            <a:p><a:pPr algn="l"><a:defRPr sz="1400"/></a:pPr><a:r><a:t>First point</a:t></a:r></a:p>
            <a:p><a:r><a:t>Second point</a:t></a:r></a:p>
            </p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;

        let slide = parse_slide(xml, SlideLayout::TitleAndContent).unwrap();
        assert_eq!(slide.title(), Some("Roadmap"));
        assert_eq!(slide.body().len(), 2);
        assert_eq!(slide.body()[0].text, "First point");
        assert_eq!(slide.body()[0].size_pt, Some(14));
        assert_eq!(slide.body()[0].align, Some(Align::Left));
        assert_eq!(slide.body()[1].text, "Second point");
    }

    #[test]
    fn test_parse_slide_without_title_shape() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
            <p:txBody><a:p><a:r><a:t>Body only</a:t></a:r></a:p></p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;

        let slide = parse_slide(xml, SlideLayout::TitleAndContent).unwrap();
        assert_eq!(slide.title(), None);
        assert_eq!(slide.title_or_untitled(), "Untitled");
    }
}
