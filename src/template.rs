// ABOUTME: Static and templated parts of a presentation package
// ABOUTME: Generates the slide master, layouts, theme, properties and document metadata XML

use crate::layout::{
    default_layouts, PlaceholderKind, PlaceholderSpec, SlideLayout, MASTER_PLACEHOLDERS,
};
use crate::units::{Frame, SlideSize};
use quick_xml::escape::escape;
use std::fmt::Write;

pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

pub(crate) const XML_DECL: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const REL_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
pub(crate) const REL_VIEW_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
pub(crate) const REL_TABLE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

/// First id of the slide layout id list; layout ids follow the master id.
const MASTER_ID: u64 = 2_147_483_648;

/// Opening tag of a PresentationML root element with the usual namespaces.
pub(crate) fn root_open(tag: &str, extra_attrs: &str) -> String {
    format!(
        r#"{XML_DECL}
<p:{tag} xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"{extra_attrs}>"#
    )
}

/// Escape text for element content or an attribute value. C0 control
/// characters other than tab, line feed and carriage return are not allowed
/// in XML 1.0 and are written as `_xHHHH_`. An underscore that would itself
/// read as such a sequence is written as `_x005F_`.
pub(crate) fn escape_text(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for (i, c) in raw.char_indices() {
        if is_restricted_char(c) || (c == '_' && hex_escape_at(&raw[i..]).is_some()) {
            let _ = write!(encoded, "_x{:04X}_", c as u32);
        } else {
            encoded.push(c);
        }
    }
    escape(encoded.as_str()).into_owned()
}

fn is_restricted_char(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}

/// The character encoded by a `_xHHHH_` sequence at the start of `s`.
pub(crate) fn hex_escape_at(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || &bytes[..2] != b"_x" || bytes[6] != b'_' {
        return None;
    }
    if !bytes[2..6].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u32::from_str_radix(&s[2..6], 16).ok().and_then(char::from_u32)
}

/// The empty group header every shape tree starts with.
pub(crate) const SP_TREE_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

pub(crate) fn xfrm(frame: &Frame) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.left, frame.top, frame.width, frame.height
    )
}

/// `<p:ph>` element for a placeholder.
pub(crate) fn ph_element(kind: PlaceholderKind, idx: u32, vertical: bool) -> String {
    let mut ph = String::from("<p:ph");
    if let Some(t) = kind.xml_type() {
        let _ = write!(ph, r#" type="{}""#, t);
    }
    if vertical {
        ph.push_str(r#" orient="vert""#);
    }
    if idx != 0 {
        let _ = write!(ph, r#" idx="{}""#, idx);
    }
    ph.push_str("/>");
    ph
}

/// A placeholder shape as declared on a layout or master, with geometry and
/// prompt text.
fn placeholder_sp(spec: &PlaceholderSpec, shape_id: u32, size: SlideSize, prompt: &str) -> String {
    let body_pr = if spec.vertical {
        r#"<a:bodyPr vert="eaVert"/>"#
    } else {
        "<a:bodyPr/>"
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name} {n}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr>{xfrm}</p:spPr><p:txBody>{body_pr}<a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{prompt}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id = shape_id,
        name = spec.kind.shape_name(),
        n = shape_id - 1,
        ph = ph_element(spec.kind, spec.idx, spec.vertical),
        xfrm = xfrm(&spec.frame(size)),
        body_pr = body_pr,
        prompt = escape_text(prompt),
    )
}

fn prompt_for(kind: PlaceholderKind) -> &'static str {
    match kind {
        PlaceholderKind::Title | PlaceholderKind::CenteredTitle => "Click to edit Master title style",
        PlaceholderKind::Subtitle => "Click to edit Master subtitle style",
        PlaceholderKind::Picture => "Click icon to add picture",
        PlaceholderKind::Body | PlaceholderKind::Object => "Click to edit Master text styles",
    }
}

const CLR_MAP: &str = r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#;

const TX_STYLES: &str = r#"<p:txStyles><p:titleStyle><a:lvl1pPr algn="ctr" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:spcBef><a:spcPct val="0"/></a:spcBef><a:buNone/><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr marL="342900" indent="-342900" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:spcBef><a:spcPct val="20000"/></a:spcBef><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="3200" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr><a:lvl2pPr marL="742950" indent="-285750" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:spcBef><a:spcPct val="20000"/></a:spcBef><a:buFont typeface="Arial"/><a:buChar char="&#8211;"/><a:defRPr sz="2800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl2pPr></p:bodyStyle><p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr><a:lvl1pPr marL="0" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:otherStyle></p:txStyles>"#;

/// `ppt/slideMasters/slideMaster1.xml`. Layouts are referenced as rId1..rId11.
pub(crate) fn slide_master_xml(size: SlideSize) -> String {
    let mut xml = root_open("sldMaster", "");
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    xml.push_str(SP_TREE_HEADER);
    for (i, spec) in MASTER_PLACEHOLDERS.iter().enumerate() {
        xml.push_str(&placeholder_sp(spec, i as u32 + 2, size, prompt_for(spec.kind)));
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(CLR_MAP);
    xml.push_str("<p:sldLayoutIdLst>");
    for i in 0..default_layouts().len() {
        let _ = write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            MASTER_ID + 1 + i as u64,
            i + 1
        );
    }
    xml.push_str("</p:sldLayoutIdLst>");
    xml.push_str(TX_STYLES);
    xml.push_str("</p:sldMaster>");
    xml
}

pub(crate) fn master_id() -> u64 {
    MASTER_ID
}

/// `ppt/slideLayouts/slideLayoutN.xml`
pub(crate) fn slide_layout_xml(layout: &SlideLayout, size: SlideSize) -> String {
    let mut xml = root_open(
        "sldLayout",
        &format!(r#" type="{}" preserve="1""#, layout.layout_type),
    );
    let _ = write!(xml, r#"<p:cSld name="{}"><p:spTree>"#, escape_text(layout.name));
    xml.push_str(SP_TREE_HEADER);
    for (i, spec) in layout.placeholders.iter().enumerate() {
        xml.push_str(&placeholder_sp(spec, i as u32 + 2, size, prompt_for(spec.kind)));
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    xml
}

/// A relationships part from `(id, type, target)` triples.
pub(crate) fn relationships_xml<'a>(
    rels: impl IntoIterator<Item = (String, &'a str, String)>,
) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
    );
    for (id, rel_type, target) in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id,
            rel_type,
            escape(target.as_str())
        );
    }
    xml.push_str("</Relationships>");
    xml
}

pub(crate) fn pres_props_xml() -> String {
    format!(
        r#"{XML_DECL}
<p:presentationPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"/>"#
    )
}

pub(crate) fn view_props_xml() -> String {
    format!(
        r#"{XML_DECL}
<p:viewPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#
    )
}

pub(crate) fn table_styles_xml() -> String {
    format!(
        r#"{XML_DECL}
<a:tblStyleLst xmlns:a="{NS_A}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#
    )
}

pub(crate) fn app_xml(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>deckhand</Application>
    <Slides>{}</Slides>
</Properties>"#,
        slide_count
    )
}

pub(crate) fn core_xml(title: &str, creator: &str) -> String {
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dc:creator>{}</dc:creator>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
    <cp:revision>1</cp:revision>
</cp:coreProperties>"#,
        escape_text(title),
        escape_text(creator),
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}

/// `ppt/theme/theme1.xml`
pub(crate) fn theme_xml() -> String {
    format!(
        r#"{XML_DECL}
<a:theme xmlns:a="{NS_A}" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:shade val="50000"/></a:schemeClr></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ph_element_attributes() {
        assert_eq!(ph_element(PlaceholderKind::Title, 0, false), r#"<p:ph type="title"/>"#);
        assert_eq!(ph_element(PlaceholderKind::Object, 1, false), r#"<p:ph idx="1"/>"#);
        assert_eq!(
            ph_element(PlaceholderKind::Body, 1, true),
            r#"<p:ph type="body" orient="vert" idx="1"/>"#
        );
    }

    #[test]
    fn test_master_lists_every_layout() {
        let xml = slide_master_xml(SlideSize::STANDARD);
        assert_eq!(xml.matches("<p:sldLayoutId ").count(), default_layouts().len());
        assert!(xml.contains(r#"r:id="rId11""#));
    }

    #[test]
    fn test_escape_text_encodes_control_characters() {
        assert_eq!(escape_text("a\u{0b}b\u{1}"), "a_x000B_b_x0001_");
        assert_eq!(escape_text("tab\tok"), "tab\tok");
        assert_eq!(escape_text("<_x0041_>"), "&lt;_x005F_x0041_&gt;");
        assert_eq!(escape_text("snake_case_x"), "snake_case_x");
    }

    #[test]
    fn test_hex_escape_at() {
        assert_eq!(hex_escape_at("_x000B_rest"), Some('\u{0b}'));
        assert_eq!(hex_escape_at("_x005f_"), Some('_'));
        assert_eq!(hex_escape_at("_x00G1_"), None);
        assert_eq!(hex_escape_at("_x00"), None);
    }

    #[test]
    fn test_layout_names_are_escaped() {
        let layout = &default_layouts()[1];
        let xml = slide_layout_xml(layout, SlideSize::STANDARD);
        assert!(xml.contains(r#"<p:cSld name="Title and Content">"#));
        assert!(xml.contains(r#"type="obj""#));
    }
}
