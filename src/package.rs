// ABOUTME: PPTX package writer for the deckhand library
// ABOUTME: Serializes a presentation model into an Office Open XML zip archive

use crate::errors::{DeckError, Result};
use crate::media::MEDIA_DEFAULTS;
use crate::presentation::Presentation;
use crate::shapes::{Paragraph, Picture, Placeholder, Shape, ShapeKind, TextBox, TextFrame};
use crate::slide::Slide;
use crate::template::{self, *};
use crate::utils::ensure_parent_directory_exists;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;
use zip::{write::FileOptions, ZipWriter};

/// Id of the first slide in `p:sldIdLst`.
pub(crate) const FIRST_SLIDE_ID: usize = 256;

/// Presentation relationships before the first slide: master, presProps,
/// viewProps, theme, tableStyles.
const FIXED_PRESENTATION_RELS: usize = 5;

/// Write a presentation package to `output_file`.
pub fn write_package(presentation: &Presentation, output_file: &Path) -> Result<()> {
    info!("Writing PPTX package to {:?}", output_file);
    ensure_parent_directory_exists(output_file)?;

    let file = fs::File::create(output_file).map_err(DeckError::FileReadError)?;
    let mut zip = ZipWriter::new(file);
    write_parts(presentation, &mut zip)?;

    debug!("Finalizing PPTX file");
    zip.finish()?;
    info!(
        "PPTX file created at {:?} with {} slides",
        output_file,
        presentation.slide_count()
    );
    Ok(())
}

fn write_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &[u8]) -> Result<()> {
    debug!("Creating PPTX part: {}", name);
    zip.start_file(name, FileOptions::default())?;
    zip.write_all(content)?;
    Ok(())
}

fn write_parts<W: Write + Seek>(presentation: &Presentation, zip: &mut ZipWriter<W>) -> Result<()> {
    let size = presentation.size();
    let layouts = presentation.layouts();
    let slides = presentation.slides();

    write_part(zip, "[Content_Types].xml", content_types_xml(presentation).as_bytes())?;

    let root_rels = relationships_xml([
        (
            "rId1".to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            "ppt/presentation.xml".to_string(),
        ),
        (
            "rId2".to_string(),
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml".to_string(),
        ),
        (
            "rId3".to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
            "docProps/app.xml".to_string(),
        ),
    ]);
    write_part(zip, "_rels/.rels", root_rels.as_bytes())?;

    write_part(zip, "docProps/app.xml", app_xml(slides.len()).as_bytes())?;
    write_part(
        zip,
        "docProps/core.xml",
        core_xml(&presentation.title, &presentation.creator).as_bytes(),
    )?;

    write_part(zip, "ppt/presentation.xml", presentation_xml(presentation).as_bytes())?;
    write_part(
        zip,
        "ppt/_rels/presentation.xml.rels",
        presentation_rels_xml(slides.len()).as_bytes(),
    )?;
    write_part(zip, "ppt/presProps.xml", pres_props_xml().as_bytes())?;
    write_part(zip, "ppt/viewProps.xml", view_props_xml().as_bytes())?;
    write_part(zip, "ppt/tableStyles.xml", table_styles_xml().as_bytes())?;
    write_part(zip, "ppt/theme/theme1.xml", theme_xml().as_bytes())?;

    write_part(
        zip,
        "ppt/slideMasters/slideMaster1.xml",
        slide_master_xml(size).as_bytes(),
    )?;
    let master_rels = (0..layouts.len())
        .map(|i| {
            (
                format!("rId{}", i + 1),
                REL_SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{}.xml", i + 1),
            )
        })
        .chain(std::iter::once((
            format!("rId{}", layouts.len() + 1),
            REL_THEME,
            "../theme/theme1.xml".to_string(),
        )));
    write_part(
        zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        relationships_xml(master_rels).as_bytes(),
    )?;

    for (i, layout) in layouts.iter().enumerate() {
        write_part(
            zip,
            &format!("ppt/slideLayouts/slideLayout{}.xml", i + 1),
            slide_layout_xml(layout, size).as_bytes(),
        )?;
        let rels = relationships_xml([(
            "rId1".to_string(),
            REL_SLIDE_MASTER,
            "../slideMasters/slideMaster1.xml".to_string(),
        )]);
        write_part(
            zip,
            &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
            rels.as_bytes(),
        )?;
    }

    for (i, slide) in slides.iter().enumerate() {
        let slide_num = i + 1;
        info!(
            "Writing slide {} ({} shapes, layout '{}')",
            slide_num,
            slide.shapes().len(),
            slide.layout_name()
        );
        let image_rels = slide_image_rels(slide);
        write_part(
            zip,
            &format!("ppt/slides/slide{}.xml", slide_num),
            slide_xml(slide, &image_rels).as_bytes(),
        )?;

        let rels = std::iter::once((
            "rId1".to_string(),
            REL_SLIDE_LAYOUT,
            format!("../slideLayouts/slideLayout{}.xml", slide.layout_index() + 1),
        ))
        .chain(image_rels.iter().map(|(media, rid)| {
            let image = &presentation.media_parts()[*media];
            (
                rid.clone(),
                REL_IMAGE,
                format!("../media/image{}.{}", media + 1, image.extension()),
            )
        }));
        write_part(
            zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            relationships_xml(rels).as_bytes(),
        )?;
    }

    for (i, image) in presentation.media_parts().iter().enumerate() {
        write_part(
            zip,
            &format!("ppt/media/image{}.{}", i + 1, image.extension()),
            image.bytes(),
        )?;
    }

    Ok(())
}

fn content_types_xml(presentation: &Presentation) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
"#
    );
    for (ext, content_type) in MEDIA_DEFAULTS {
        let _ = writeln!(
            xml,
            r#"    <Default Extension="{}" ContentType="{}"/>"#,
            ext, content_type
        );
    }

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
        ("/docProps/core.xml".to_string(), "application/vnd.openxmlformats-package.core-properties+xml"),
        ("/docProps/app.xml".to_string(), "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
        ("/ppt/presProps.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"),
        ("/ppt/viewProps.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"),
        ("/ppt/tableStyles.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"),
        ("/ppt/theme/theme1.xml".to_string(), "application/vnd.openxmlformats-officedocument.theme+xml"),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"),
    ];
    for i in 0..presentation.layouts().len() {
        overrides.push((
            format!("/ppt/slideLayouts/slideLayout{}.xml", i + 1),
            "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
        ));
    }
    for i in 0..presentation.slide_count() {
        overrides.push((
            format!("/ppt/slides/slide{}.xml", i + 1),
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
        ));
    }

    for (part, content_type) in overrides {
        let _ = writeln!(
            xml,
            r#"    <Override PartName="{}" ContentType="{}"/>"#,
            part, content_type
        );
    }
    xml.push_str("</Types>");
    xml
}

fn presentation_xml(presentation: &Presentation) -> String {
    let size = presentation.size();
    let mut xml = root_open("presentation", r#" saveSubsetFonts="1""#);
    let _ = write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="{}" r:id="rId1"/></p:sldMasterIdLst>"#,
        template::master_id()
    );

    // Slide ids are positional, so they are unique and contiguous by construction.
    if presentation.slide_count() > 0 {
        xml.push_str("<p:sldIdLst>");
        for i in 0..presentation.slide_count() {
            let _ = write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + i,
                FIXED_PRESENTATION_RELS + 1 + i
            );
        }
        xml.push_str("</p:sldIdLst>");
    }

    let _ = write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}""#,
        size.width, size.height
    );
    match size.type_name() {
        "custom" => xml.push_str("/>"),
        name => {
            let _ = write!(xml, r#" type="{}"/>"#, name);
        }
    }
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#);
    xml
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let fixed = [
        (REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        (REL_PRES_PROPS, "presProps.xml"),
        (REL_VIEW_PROPS, "viewProps.xml"),
        (REL_THEME, "theme/theme1.xml"),
        (REL_TABLE_STYLES, "tableStyles.xml"),
    ];
    let rels = fixed
        .into_iter()
        .enumerate()
        .map(|(i, (rel_type, target))| (format!("rId{}", i + 1), rel_type, target.to_string()))
        .chain((0..slide_count).map(|i| {
            (
                format!("rId{}", FIXED_PRESENTATION_RELS + 1 + i),
                REL_SLIDE,
                format!("slides/slide{}.xml", i + 1),
            )
        }));
    relationships_xml(rels)
}

/// Relationship ids for the media a slide uses, keyed by media index.
/// rId1 is always the slide layout.
fn slide_image_rels(slide: &Slide) -> BTreeMap<usize, String> {
    let mut rels = BTreeMap::new();
    for picture in slide.pictures() {
        let next = rels.len() + 2;
        rels.entry(picture.media.0)
            .or_insert_with(|| format!("rId{}", next));
    }
    rels
}

pub(crate) fn slide_xml(slide: &Slide, image_rels: &BTreeMap<usize, String>) -> String {
    let mut xml = root_open("sld", "");
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(SP_TREE_HEADER);
    for shape in slide.shapes() {
        match &shape.kind {
            ShapeKind::Placeholder(p) => write_placeholder(&mut xml, shape, p),
            ShapeKind::Picture(p) => write_picture(&mut xml, shape, p, image_rels),
            ShapeKind::TextBox(t) => write_text_box(&mut xml, shape, t),
        }
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

fn c_nv_pr(shape: &Shape, descr: Option<&str>) -> String {
    match descr {
        Some(d) if !d.is_empty() => format!(
            r#"<p:cNvPr id="{}" name="{}" descr="{}"/>"#,
            shape.id,
            escape_text(&shape.name),
            escape_text(d)
        ),
        _ => format!(
            r#"<p:cNvPr id="{}" name="{}"/>"#,
            shape.id,
            escape_text(&shape.name)
        ),
    }
}

fn write_placeholder(xml: &mut String, shape: &Shape, placeholder: &Placeholder) {
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr>{}<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/>"#,
        c_nv_pr(shape, None),
        ph_element(placeholder.kind, placeholder.idx, placeholder.vertical)
    );
    if let Some(text) = &placeholder.text {
        xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
        write_paragraphs(xml, text);
        xml.push_str("</p:txBody>");
    }
    xml.push_str("</p:sp>");
}

fn write_picture(
    xml: &mut String,
    shape: &Shape,
    picture: &Picture,
    image_rels: &BTreeMap<usize, String>,
) {
    let rid = image_rels
        .get(&picture.media.0)
        .map(String::as_str)
        .unwrap_or("rId2");
    let _ = write!(
        xml,
        r#"<p:pic><p:nvPicPr>{}<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        c_nv_pr(shape, Some(picture.description.as_str())),
        rid,
        xfrm(&picture.frame)
    );
}

fn write_text_box(xml: &mut String, shape: &Shape, text_box: &TextBox) {
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr>{}<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="none"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#,
        c_nv_pr(shape, None),
        xfrm(&text_box.frame)
    );
    write_paragraphs(xml, &text_box.text);
    xml.push_str("</p:txBody></p:sp>");
}

fn write_paragraphs(xml: &mut String, text: &TextFrame) {
    if text.paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for paragraph in &text.paragraphs {
        write_paragraph(xml, paragraph);
    }
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) {
    if paragraph.runs.is_empty() {
        xml.push_str("<a:p/>");
        return;
    }
    xml.push_str("<a:p>");
    for run in &paragraph.runs {
        xml.push_str(r#"<a:r><a:rPr lang="en-US""#);
        if let Some(sz) = run.font.size_centipoints() {
            let _ = write!(xml, r#" sz="{}""#, sz);
        }
        if let Some(b) = run.font.bold {
            let _ = write!(xml, r#" b="{}""#, b as u8);
        }
        if let Some(i) = run.font.italic {
            let _ = write!(xml, r#" i="{}""#, i as u8);
        }
        xml.push_str(r#" dirty="0""#);
        match &run.font.name {
            Some(name) => {
                let _ = write!(xml, r#"><a:latin typeface="{}"/></a:rPr>"#, escape_text(name));
            }
            None => xml.push_str("/>"),
        }
        let _ = write!(xml, "<a:t>{}</a:t></a:r>", escape_text(&run.text));
    }
    xml.push_str("</a:p>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Font;

    #[test]
    fn test_paragraph_escapes_text_and_writes_font() {
        let mut frame = TextFrame::new("a < b & c");
        frame.apply_font(&Font::new("Calibri", 10.0));
        let mut xml = String::new();
        write_paragraphs(&mut xml, &frame);
        assert_eq!(
            xml,
            r#"<a:p><a:r><a:rPr lang="en-US" sz="1000" dirty="0"><a:latin typeface="Calibri"/></a:rPr><a:t>a &lt; b &amp; c</a:t></a:r></a:p>"#
        );
    }

    #[test]
    fn test_paragraph_never_writes_raw_control_characters() {
        let mut frame = TextFrame::new("line\u{0b}break\u{1}end\tx");
        frame.apply_font(&Font::new("Cali\u{7}bri", 10.0));
        let mut xml = String::new();
        write_paragraphs(&mut xml, &frame);

        assert!(
            !xml.chars().any(|c| (c as u32) < 0x20 && c != '\t'),
            "raw control character in {:?}",
            xml
        );
        assert!(xml.contains("<a:t>line_x000B_break_x0001_end\tx</a:t>"));
        assert!(xml.contains(r#"typeface="Cali_x0007_bri""#));
    }

    #[test]
    fn test_empty_presentation_has_no_slide_list() {
        let xml = presentation_xml(&Presentation::default());
        assert!(!xml.contains("sldIdLst"));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000" type="screen4x3"/>"#));
    }
}
