//! Serialization of the presentation model into a `.pptx` package.
//!
//! Every save emits the complete package: content types, relationships, one
//! slide master, the two built-in layouts, a theme, and one part per slide.

use std::io::{Seek, Write};

use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::Result;

use super::model::{Paragraph, Presentation, Slide, SlideLayout};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_TYPE_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_TYPE_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

/// Write the full package to `out`.
pub fn write_package<W: Write + Seek>(prs: &Presentation, out: W) -> Result<()> {
    let mut zip = ZipWriter::new(out);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let part = |zip: &mut ZipWriter<W>, name: &str, body: String| -> Result<()> {
        zip.start_file(name, options)?;
        zip.write_all(XML_DECL.as_bytes())?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    part(&mut zip, "[Content_Types].xml", content_types(prs))?;
    part(&mut zip, "_rels/.rels", root_rels())?;
    part(&mut zip, "ppt/presentation.xml", presentation_xml(prs))?;
    part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        presentation_rels(prs),
    )?;
    part(
        &mut zip,
        "ppt/slideMasters/slideMaster1.xml",
        slide_master(),
    )?;
    part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        slide_master_rels(),
    )?;
    part(
        &mut zip,
        "ppt/slideLayouts/slideLayout1.xml",
        title_layout(),
    )?;
    part(
        &mut zip,
        "ppt/slideLayouts/slideLayout2.xml",
        content_layout(),
    )?;
    for i in 1..=2 {
        part(
            &mut zip,
            &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i),
            layout_rels(),
        )?;
    }
    part(&mut zip, "ppt/theme/theme1.xml", theme())?;

    for (i, slide) in prs.slides().iter().enumerate() {
        let n = i + 1;
        part(&mut zip, &format!("ppt/slides/slide{}.xml", n), slide_xml(slide))?;
        part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", n),
            slide_rels(slide.layout()),
        )?;
    }

    zip.finish()?;
    Ok(())
}

fn content_types(prs: &Presentation) -> String {
    let mut overrides = String::new();
    for i in 1..=prs.slide_count() {
        overrides.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>",
            i
        ));
    }
    format!(
        concat!(
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>",
            "<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>",
            "<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>",
            "<Override PartName=\"/ppt/slideLayouts/slideLayout2.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>",
            "<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>",
            "{overrides}",
            "</Types>"
        ),
        overrides = overrides
    )
}

fn root_rels() -> String {
    format!(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"{}\" Target=\"ppt/presentation.xml\"/>\
         </Relationships>",
        REL_TYPE_OFFICE_DOCUMENT
    )
}

fn presentation_xml(prs: &Presentation) -> String {
    let mut slide_ids = String::new();
    for i in 0..prs.slide_count() {
        slide_ids.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
            256 + i,
            2 + i
        ));
    }
    format!(
        "<p:presentation xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
         <p:sldIdLst>{ids}</p:sldIdLst>\
         <p:sldSz cx=\"9144000\" cy=\"6858000\" type=\"screen4x3\"/>\
         <p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
         </p:presentation>",
        a = NS_DRAWING,
        r = NS_RELATIONSHIPS,
        p = NS_PRESENTATION,
        ids = slide_ids
    )
}

fn presentation_rels(prs: &Presentation) -> String {
    let mut rels = format!(
        "<Relationship Id=\"rId1\" Type=\"{}\" Target=\"slideMasters/slideMaster1.xml\"/>",
        REL_TYPE_SLIDE_MASTER
    );
    for i in 0..prs.slide_count() {
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}\" Target=\"slides/slide{}.xml\"/>",
            2 + i,
            REL_TYPE_SLIDE,
            i + 1
        ));
    }
    format!(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{}</Relationships>",
        rels
    )
}

fn slide_master() -> String {
    format!(
        "<p:sldMaster xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>\
         </p:spTree></p:cSld>\
         <p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\
         <p:sldLayoutIdLst>\
         <p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/>\
         <p:sldLayoutId id=\"2147483650\" r:id=\"rId2\"/>\
         </p:sldLayoutIdLst>\
         </p:sldMaster>",
        a = NS_DRAWING,
        r = NS_RELATIONSHIPS,
        p = NS_PRESENTATION
    )
}

fn slide_master_rels() -> String {
    format!(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"{lt}\" Target=\"../slideLayouts/slideLayout1.xml\"/>\
         <Relationship Id=\"rId2\" Type=\"{lt}\" Target=\"../slideLayouts/slideLayout2.xml\"/>\
         <Relationship Id=\"rId3\" Type=\"{th}\" Target=\"../theme/theme1.xml\"/>\
         </Relationships>",
        lt = REL_TYPE_SLIDE_LAYOUT,
        th = REL_TYPE_THEME
    )
}

fn layout_rels() -> String {
    format!(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"{}\" Target=\"../slideMasters/slideMaster1.xml\"/>\
         </Relationships>",
        REL_TYPE_SLIDE_MASTER
    )
}

fn layout_xml(layout_type: &str, name: &str, title_ph: &str, body_ph: &str, body_name: &str) -> String {
    format!(
        "<p:sldLayout xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\" type=\"{ty}\" preserve=\"1\">\
         <p:cSld name=\"{name}\"><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>\
         <p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Title 1\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph type=\"{title_ph}\"/></p:nvPr></p:nvSpPr>\
         <p:spPr><a:xfrm><a:off x=\"685800\" y=\"457200\"/><a:ext cx=\"7772400\" cy=\"1143000\"/></a:xfrm></p:spPr>\
         <p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p></p:txBody></p:sp>\
         <p:sp><p:nvSpPr><p:cNvPr id=\"3\" name=\"{body_name}\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph {body_ph}/></p:nvPr></p:nvSpPr>\
         <p:spPr><a:xfrm><a:off x=\"685800\" y=\"1600200\"/><a:ext cx=\"7772400\" cy=\"4525963\"/></a:xfrm></p:spPr>\
         <p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p></p:txBody></p:sp>\
         </p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
         </p:sldLayout>",
        a = NS_DRAWING,
        r = NS_RELATIONSHIPS,
        p = NS_PRESENTATION,
        ty = layout_type,
        name = name,
        title_ph = title_ph,
        body_ph = body_ph,
        body_name = body_name
    )
}

fn title_layout() -> String {
    layout_xml(
        "title",
        "Title Slide",
        "ctrTitle",
        "type=\"subTitle\" idx=\"1\"",
        "Subtitle 2",
    )
}

fn content_layout() -> String {
    layout_xml(
        "obj",
        "Title and Content",
        "title",
        "idx=\"1\"",
        "Content Placeholder 2",
    )
}

fn theme() -> String {
    format!(
        "<a:theme xmlns:a=\"{a}\" name=\"Office Theme\"><a:themeElements>\
         <a:clrScheme name=\"Office\">\
         <a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
         <a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
         <a:dk2><a:srgbClr val=\"44546A\"/></a:dk2>\
         <a:lt2><a:srgbClr val=\"E7E6E6\"/></a:lt2>\
         <a:accent1><a:srgbClr val=\"4472C4\"/></a:accent1>\
         <a:accent2><a:srgbClr val=\"ED7D31\"/></a:accent2>\
         <a:accent3><a:srgbClr val=\"A5A5A5\"/></a:accent3>\
         <a:accent4><a:srgbClr val=\"FFC000\"/></a:accent4>\
         <a:accent5><a:srgbClr val=\"5B9BD5\"/></a:accent5>\
         <a:accent6><a:srgbClr val=\"70AD47\"/></a:accent6>\
         <a:hlink><a:srgbClr val=\"0563C1\"/></a:hlink>\
         <a:folHlink><a:srgbClr val=\"954F72\"/></a:folHlink>\
         </a:clrScheme>\
         <a:fontScheme name=\"Office\">\
         <a:majorFont><a:latin typeface=\"Calibri Light\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
         <a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
         </a:fontScheme>\
         <a:fmtScheme name=\"Office\">\
         <a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>\
         <a:lnStyleLst>\
         <a:ln w=\"6350\">{fill}</a:ln><a:ln w=\"12700\">{fill}</a:ln><a:ln w=\"19050\">{fill}</a:ln>\
         </a:lnStyleLst>\
         <a:effectStyleLst>\
         <a:effectStyle><a:effectLst/></a:effectStyle>\
         <a:effectStyle><a:effectLst/></a:effectStyle>\
         <a:effectStyle><a:effectLst/></a:effectStyle>\
         </a:effectStyleLst>\
         <a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>\
         </a:fmtScheme>\
         </a:themeElements></a:theme>",
        a = NS_DRAWING,
        fill = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>"
    )
}

fn slide_rels(layout: SlideLayout) -> String {
    format!(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"{}\" Target=\"../slideLayouts/slideLayout{}.xml\"/>\
         </Relationships>",
        REL_TYPE_SLIDE_LAYOUT,
        layout.index() + 1
    )
}

fn slide_xml(slide: &Slide) -> String {
    let (title_ph, body_ph, body_name) = match slide.layout() {
        SlideLayout::Title => ("ctrTitle", "type=\"subTitle\" idx=\"1\"", "Subtitle 2"),
        SlideLayout::TitleAndContent => ("title", "idx=\"1\"", "Content Placeholder 2"),
    };

    let title_body = match slide.title() {
        Some(t) if !t.is_empty() => paragraph_xml(&Paragraph::new(t)),
        _ => "<a:p><a:endParaRPr lang=\"en-US\"/></a:p>".to_string(),
    };

    let body_paragraphs = if slide.body().is_empty() {
        "<a:p><a:endParaRPr lang=\"en-US\"/></a:p>".to_string()
    } else {
        slide.body().iter().map(paragraph_xml).collect()
    };

    format!(
        "<p:sld xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>\
         <p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Title 1\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph type=\"{title_ph}\"/></p:nvPr></p:nvSpPr>\
         <p:spPr/>\
         <p:txBody><a:bodyPr/><a:lstStyle/>{title_body}</p:txBody></p:sp>\
         <p:sp><p:nvSpPr><p:cNvPr id=\"3\" name=\"{body_name}\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph {body_ph}/></p:nvPr></p:nvSpPr>\
         <p:spPr/>\
         <p:txBody><a:bodyPr/><a:lstStyle/>{body_paragraphs}</p:txBody></p:sp>\
         </p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
         </p:sld>",
        a = NS_DRAWING,
        r = NS_RELATIONSHIPS,
        p = NS_PRESENTATION,
        title_ph = title_ph,
        body_ph = body_ph,
        body_name = body_name,
        title_body = title_body,
        body_paragraphs = body_paragraphs
    )
}

fn paragraph_xml(para: &Paragraph) -> String {
    let mut ppr = String::new();
    if para.align.is_some() || para.size_pt.is_some() {
        ppr.push_str("<a:pPr");
        if let Some(align) = para.align {
            ppr.push_str(&format!(" algn=\"{}\"", align.code()));
        }
        if let Some(size) = para.size_pt {
            // Font sizes are stored in hundredths of a point.
            ppr.push_str(&format!("><a:defRPr sz=\"{}\"/></a:pPr>", size * 100));
        } else {
            ppr.push_str("/>");
        }
    }

    if para.text.is_empty() {
        format!("<a:p>{}<a:endParaRPr lang=\"en-US\"/></a:p>", ppr)
    } else {
        format!(
            "<a:p>{}<a:r><a:rPr lang=\"en-US\" dirty=\"0\"/><a:t>{}</a:t></a:r></a:p>",
            ppr,
            escape(&para.text)
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::super::reader::read_package;
    use super::*;
    use crate::pptx::{Align, SlideLayout};

    fn round_trip(prs: &Presentation) -> Presentation {
        let mut buf = Cursor::new(Vec::new());
        write_package(prs, &mut buf).unwrap();
        buf.set_position(0);
        read_package(zip::ZipArchive::new(buf).unwrap()).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_layouts_and_text() {
        let mut prs = Presentation::new();
        let first = prs.add_slide(SlideLayout::Title);
        first.set_title("Kickoff");
        first.set_body("Created on January 01, 2026");
        let second = prs.add_slide(SlideLayout::TitleAndContent);
        second.set_title("Agenda");
        second.set_body("alpha\nbeta");
        second.format_body(14, Align::Left);

        let reopened = round_trip(&prs);
        assert_eq!(reopened.slide_count(), 2);
        assert_eq!(reopened.slides()[0].layout(), SlideLayout::Title);
        assert_eq!(reopened.slides()[0].title(), Some("Kickoff"));
        assert_eq!(reopened.slides()[1].layout(), SlideLayout::TitleAndContent);
        assert_eq!(reopened.slides()[1].body()[1].text, "beta");
        assert_eq!(reopened.slides()[1].body()[1].size_pt, Some(14));
    }

    #[test]
    fn test_text_is_escaped() {
        let para = Paragraph::new("R&D <plan>");
        let xml = paragraph_xml(&para);
        assert!(xml.contains("R&amp;D &lt;plan&gt;"));
    }

    #[test]
    fn test_empty_presentation_round_trips() {
        let reopened = round_trip(&Presentation::new());
        assert_eq!(reopened.slide_count(), 0);
    }
}
