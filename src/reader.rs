// ABOUTME: PPTX package reader for the deckhand library
// ABOUTME: Rebuilds a presentation model from a package written by the package writer

use crate::errors::{DeckError, Result};
use crate::layout::PlaceholderKind;
use crate::media::{ImageData, MediaId};
use crate::presentation::Presentation;
use crate::shapes::{
    Font, Paragraph, Picture, Placeholder, Run, Shape, ShapeKind, TextBox, TextFrame,
};
use crate::template::hex_escape_at;
use crate::units::{Emu, Frame, SlideSize};
use crate::utils::validate_file_exists;
use log::{debug, info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Read a `.pptx` file into a presentation.
pub fn read_package(path: &Path) -> Result<Presentation> {
    info!("Opening PPTX package {:?}", path);
    validate_file_exists(path)?;
    let file = fs::File::open(path).map_err(DeckError::FileReadError)?;
    let mut archive = ZipArchive::new(file)?;

    let pres_xml = read_part(&mut archive, "ppt/presentation.xml")?;
    let (size, slide_rids) = parse_presentation(&pres_xml)?;
    let pres_rels = parse_relationships(&read_part(&mut archive, "ppt/_rels/presentation.xml.rels")?)?;

    let mut presentation = Presentation::new(size);
    if let Ok(core) = read_part(&mut archive, "docProps/core.xml") {
        apply_core_properties(&mut presentation, &core)?;
    }

    // Media parts already loaded, keyed by part name.
    let mut media_by_part: HashMap<String, MediaId> = HashMap::new();

    for rid in &slide_rids {
        let rel = pres_rels.get(rid).ok_or_else(|| {
            DeckError::PptxError(format!("Slide relationship {} not found", rid))
        })?;
        let slide_part = resolve_target("ppt", &rel.target);
        debug!("Reading slide part {}", slide_part);

        let rels_part = rels_part_name(&slide_part);
        let slide_rels = parse_relationships(&read_part(&mut archive, &rels_part)?)?;

        let layout_index = slide_rels
            .values()
            .find(|r| r.rel_type.ends_with("/slideLayout"))
            .and_then(|r| layout_number(&r.target))
            .ok_or_else(|| {
                DeckError::PptxError(format!("Slide {} has no slide layout", slide_part))
            })?;

        // Map the slide's image relationship ids to media ids.
        let mut images: HashMap<String, MediaId> = HashMap::new();
        for (id, rel) in &slide_rels {
            if !rel.rel_type.ends_with("/image") {
                continue;
            }
            let part = resolve_target(parent_dir(&slide_part), &rel.target);
            let media = match media_by_part.get(&part) {
                Some(media) => *media,
                None => {
                    let mut bytes = Vec::new();
                    archive
                        .by_name(&part)
                        .map_err(|e| DeckError::PptxError(format!("Missing part {}: {}", part, e)))?
                        .read_to_end(&mut bytes)?;
                    let media = presentation.add_media(ImageData::from_bytes(bytes)?);
                    media_by_part.insert(part, media);
                    media
                }
            };
            images.insert(id.clone(), media);
        }

        let slide_xml = read_part(&mut archive, &slide_part)?;
        let shapes = parse_slide_shapes(&slide_xml, &images)?;
        let slide = presentation.push_empty_slide(layout_index)?;
        for shape in shapes {
            slide.push_shape(shape);
        }
    }

    info!(
        "Opened presentation with {} slides and {} media parts",
        presentation.slide_count(),
        presentation.media_parts().len()
    );
    Ok(presentation)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| DeckError::PptxError(format!("Missing part {}: {}", name, e)))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(decode_hex_escapes(&attr.unescape_value()?)));
        }
    }
    Ok(None)
}

/// Reverse the `_xHHHH_` encoding the writer uses for characters XML cannot carry.
fn decode_hex_escapes(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("_x") {
        decoded.push_str(&rest[..pos]);
        match hex_escape_at(&rest[pos..]) {
            Some(c) => {
                decoded.push(c);
                rest = &rest[pos + 7..];
            }
            None => {
                decoded.push_str("_x");
                rest = &rest[pos + 2..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

fn attr_i64(e: &BytesStart, name: &[u8]) -> Result<Option<i64>> {
    Ok(attr_value(e, name)?.and_then(|v| v.parse::<i64>().ok()))
}

fn attr_bool(e: &BytesStart, name: &[u8]) -> Result<Option<bool>> {
    Ok(attr_value(e, name)?.map(|v| v == "1" || v == "true"))
}

/// Slide size and the ordered relationship ids of the slide list.
fn parse_presentation(xml: &str) -> Result<(SlideSize, Vec<String>)> {
    let mut reader = Reader::from_str(xml);
    let mut size = SlideSize::default();
    let mut slide_rids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"sldSz" => {
                    if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx")?, attr_i64(e, b"cy")?) {
                        size = SlideSize {
                            width: Emu(cx),
                            height: Emu(cy),
                        };
                    }
                }
                b"sldId" => {
                    if let Some(rid) = r_id(e) {
                        slide_rids.push(rid);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok((size, slide_rids))
}

/// The `r:id` attribute. `p:sldId` also has a plain `id`, so match the
/// prefixed name exactly.
fn r_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"r:id")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn apply_core_properties(presentation: &mut Presentation, xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut current: Option<Vec<u8>> = None;
    loop {
        match reader.read_event()? {
            Event::Start(ref e) => current = Some(e.local_name().as_ref().to_vec()),
            Event::Text(ref t) => match current.as_deref() {
                Some(b"title") => presentation.title = decode_hex_escapes(&t.unescape()?),
                Some(b"creator") => presentation.creator = decode_hex_escapes(&t.unescape()?),
                _ => {}
            },
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Relationship {
    rel_type: String,
    target: String,
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_value(e, b"Id")?;
                let rel_type = attr_value(e, b"Type")?;
                let target = attr_value(e, b"Target")?;
                if let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) {
                    rels.insert(id, Relationship { rel_type, target });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

fn parent_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// `../slideLayouts/slideLayout3.xml` -> layout index 2
fn layout_number(target: &str) -> Option<usize> {
    let file = target.rsplit('/').next()?;
    let n = file
        .strip_prefix("slideLayout")?
        .strip_suffix(".xml")?
        .parse::<usize>()
        .ok()?;
    n.checked_sub(1)
}

#[derive(Debug, Default)]
struct PendingShape {
    is_picture: bool,
    id: Option<u32>,
    name: String,
    description: String,
    text_box: bool,
    placeholder: Option<(PlaceholderKind, u32, bool)>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    embed: Option<String>,
    text: Option<TextFrame>,
}

impl PendingShape {
    fn frame(&self) -> Frame {
        let (x, y) = self.offset.unwrap_or((0, 0));
        let (cx, cy) = self.extent.unwrap_or((0, 0));
        Frame::new(Emu(x), Emu(y), Emu(cx), Emu(cy))
    }

    fn last_run(&mut self) -> Option<&mut Run> {
        self.text
            .as_mut()
            .and_then(|t| t.paragraphs.last_mut())
            .and_then(|p| p.runs.last_mut())
    }

    fn into_shape(self, images: &HashMap<String, MediaId>, fallback_id: u32) -> Option<Shape> {
        let frame = self.frame();
        let id = self.id.unwrap_or(fallback_id);
        let kind = if self.is_picture {
            let rid = self.embed?;
            let media = match images.get(&rid) {
                Some(media) => *media,
                None => {
                    warn!("Picture '{}' references unknown image {}", self.name, rid);
                    return None;
                }
            };
            ShapeKind::Picture(Picture {
                media,
                frame,
                description: self.description,
            })
        } else if let Some((kind, idx, vertical)) = self.placeholder {
            ShapeKind::Placeholder(Placeholder {
                kind,
                idx,
                vertical,
                text: self.text,
            })
        } else {
            if !self.text_box {
                debug!("Reading plain shape '{}' as a text box", self.name);
            }
            ShapeKind::TextBox(TextBox {
                frame,
                text: self.text.unwrap_or_default(),
            })
        };
        Some(Shape {
            id,
            name: self.name,
            kind,
        })
    }
}

fn parse_slide_shapes(xml: &str, images: &HashMap<String, MediaId>) -> Result<Vec<Shape>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut current: Option<PendingShape> = None;
    let mut in_rpr = false;
    let mut in_t = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"sp" => current = Some(PendingShape::default()),
                    b"pic" => {
                        current = Some(PendingShape {
                            is_picture: true,
                            ..Default::default()
                        })
                    }
                    b"txBody" => {
                        if let Some(shape) = current.as_mut() {
                            shape.text = Some(TextFrame::default());
                        }
                    }
                    b"p" => {
                        if let Some(text) = current.as_mut().and_then(|s| s.text.as_mut()) {
                            text.paragraphs.push(Paragraph::default());
                        }
                    }
                    b"r" => {
                        if let Some(p) = current
                            .as_mut()
                            .and_then(|s| s.text.as_mut())
                            .and_then(|t| t.paragraphs.last_mut())
                        {
                            p.runs.push(Run::default());
                        }
                    }
                    b"rPr" => {
                        in_rpr = true;
                        read_run_properties(e, current.as_mut())?;
                    }
                    b"t" => in_t = true,
                    _ => read_shape_element(e, current.as_mut())?,
                }
            }
            Event::Empty(ref e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"p" => {
                        if let Some(text) = current.as_mut().and_then(|s| s.text.as_mut()) {
                            text.paragraphs.push(Paragraph::default());
                        }
                    }
                    b"rPr" => read_run_properties(e, current.as_mut())?,
                    b"latin" if in_rpr => {
                        if let Some(run) = current.as_mut().and_then(|s| s.last_run()) {
                            run.font.name = attr_value(e, b"typeface")?;
                        }
                    }
                    _ => read_shape_element(e, current.as_mut())?,
                }
            }
            Event::Text(ref t) if in_t => {
                let text = decode_hex_escapes(&t.unescape()?);
                if let Some(run) = current.as_mut().and_then(|s| s.last_run()) {
                    run.text.push_str(&text);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"rPr" => in_rpr = false,
                b"sp" | b"pic" => {
                    if let Some(pending) = current.take() {
                        let fallback = shapes.len() as u32 + 2;
                        if let Some(shape) = pending.into_shape(images, fallback) {
                            shapes.push(shape);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(shapes)
}

fn read_run_properties(e: &BytesStart, shape: Option<&mut PendingShape>) -> Result<()> {
    let Some(run) = shape.and_then(|s| s.last_run()) else {
        return Ok(());
    };
    run.font = Font {
        name: None,
        size: attr_i64(e, b"sz")?.map(|sz| sz as f64 / 100.0),
        bold: attr_bool(e, b"b")?,
        italic: attr_bool(e, b"i")?,
    };
    Ok(())
}

/// Non-visual properties and geometry of the shape being read.
fn read_shape_element(e: &BytesStart, shape: Option<&mut PendingShape>) -> Result<()> {
    let Some(shape) = shape else {
        return Ok(());
    };
    match e.local_name().as_ref() {
        b"cNvPr" => {
            shape.id = attr_i64(e, b"id")?.map(|id| id as u32);
            shape.name = attr_value(e, b"name")?.unwrap_or_default();
            shape.description = attr_value(e, b"descr")?.unwrap_or_default();
        }
        b"cNvSpPr" => shape.text_box = attr_bool(e, b"txBox")?.unwrap_or(false),
        b"ph" => {
            let kind = PlaceholderKind::from_xml_type(attr_value(e, b"type")?.as_deref());
            let idx = attr_i64(e, b"idx")?.unwrap_or(0) as u32;
            let vertical = attr_value(e, b"orient")?.as_deref() == Some("vert");
            shape.placeholder = Some((kind, idx, vertical));
        }
        b"off" => {
            if let (Some(x), Some(y)) = (attr_i64(e, b"x")?, attr_i64(e, b"y")?) {
                shape.offset = Some((x, y));
            }
        }
        b"ext" => {
            if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx")?, attr_i64(e, b"cy")?) {
                shape.extent = Some((cx, cy));
            }
        }
        b"blip" => shape.embed = attr_value(e, b"embed")?,
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(
            resolve_target("ppt/slides", "../media/image2.png"),
            "ppt/media/image2.png"
        );
        assert_eq!(resolve_target("ppt/slides", "/ppt/media/a.png"), "ppt/media/a.png");
    }

    #[test]
    fn test_decode_hex_escapes() {
        assert_eq!(decode_hex_escapes("a_x000B_b_x0001_"), "a\u{0b}b\u{1}");
        assert_eq!(decode_hex_escapes("_x005F_x0041_"), "_x0041_");
        assert_eq!(decode_hex_escapes("snake_case_x"), "snake_case_x");
    }

    #[test]
    fn test_control_characters_survive_reading_slide_text() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox 1"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="10" cy="10"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>one_x000B_two</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;
        let shapes = parse_slide_shapes(xml, &HashMap::new()).unwrap();
        let text_box = shapes[0].as_text_box().unwrap();
        assert_eq!(text_box.text.text(), "one\u{0b}two");
    }

    #[test]
    fn test_rels_part_name_and_layout_number() {
        assert_eq!(
            rels_part_name("ppt/slides/slide3.xml"),
            "ppt/slides/_rels/slide3.xml.rels"
        );
        assert_eq!(layout_number("../slideLayouts/slideLayout7.xml"), Some(6));
        assert_eq!(layout_number("../slideLayouts/other.xml"), None);
    }

    #[test]
    fn test_parse_presentation_reads_size_and_order() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst><p:sldId id="256" r:id="rId7"/><p:sldId id="257" r:id="rId6"/></p:sldIdLst><p:sldSz cx="9144000" cy="5143500"/></p:presentation>"#;
        let (size, rids) = parse_presentation(xml).unwrap();
        assert_eq!(size, SlideSize::WIDESCREEN);
        assert_eq!(rids, vec!["rId7".to_string(), "rId6".to_string()]);
    }
}
