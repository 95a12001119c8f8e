use deckhand::{BuilderConfig, Emu, Presentation, PresentationBuilder, SlideSize};
use image::{ImageBuffer, Rgb};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

fn create_test_png(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    let img = ImageBuffer::from_fn(64, 48, |_, _| Rgb(color));
    img.save(&path).expect("Failed to save test image");
    path
}

fn read_entry(path: &Path, name: &str) -> String {
    let file = fs::File::open(path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let mut entry = archive.by_name(name).expect("Missing PPTX part");
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .expect("Failed to read PPTX part");
    content
}

fn entry_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect()
}

#[test]
fn test_create_writes_empty_presentation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let builder = PresentationBuilder::default();

    let pres = builder.create(temp_dir.path(), "empty.pptx").unwrap();

    let output_path = temp_dir.path().join("empty.pptx");
    assert!(output_path.exists(), "PPTX file was not created");
    assert_eq!(pres.path(), Some(output_path.as_path()));
    assert_eq!(pres.slide_count(), 0);

    let names = entry_names(&output_path);
    assert!(names.contains(&"[Content_Types].xml".to_string()));
    assert!(names.contains(&"ppt/presentation.xml".to_string()));
    assert!(names.contains(&"ppt/slideMasters/slideMaster1.xml".to_string()));
    assert!(names.contains(&"ppt/slideLayouts/slideLayout11.xml".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("ppt/slides/")));

    let presentation_xml = read_entry(&output_path, "ppt/presentation.xml");
    assert!(!presentation_xml.contains("<p:sldId "));
}

#[test]
fn test_create_makes_missing_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let nested = temp_dir.path().join("decks").join("2024");
    let builder = PresentationBuilder::default();

    builder.create(&nested, "deck.pptx").unwrap();

    assert!(nested.join("deck.pptx").exists());
}

#[test]
fn test_create_uses_configured_aspect_ratio() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let builder = PresentationBuilder::new(BuilderConfig {
        aspect_ratio: "16:9".to_string(),
        ..BuilderConfig::default()
    });

    let pres = builder.create(temp_dir.path(), "wide.pptx").unwrap();

    assert_eq!(pres.size(), SlideSize::WIDESCREEN);
    let xml = read_entry(&temp_dir.path().join("wide.pptx"), "ppt/presentation.xml");
    assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="5143500" type="screen16x9"/>"#));
}

#[test]
fn test_slide_ids_are_contiguous_in_slide_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let builder = PresentationBuilder::default();
    let mut pres = builder.create(temp_dir.path(), "order.pptx").unwrap();

    let a = builder.insert_slide(&mut pres, 5, 0).unwrap();
    let b = builder.insert_slide(&mut pres, 5, 0).unwrap();
    let c = builder.insert_slide(&mut pres, 5, 1).unwrap();
    for (id, title) in [(a, "A"), (b, "B"), (c, "C")] {
        builder
            .set_title(pres.slide_mut(id).unwrap(), title, None)
            .unwrap();
    }
    pres.save().unwrap();

    let path = temp_dir.path().join("order.pptx");
    let xml = read_entry(&path, "ppt/presentation.xml");
    assert!(xml.contains(
        r#"<p:sldIdLst><p:sldId id="256" r:id="rId6"/><p:sldId id="257" r:id="rId7"/><p:sldId id="258" r:id="rId8"/></p:sldIdLst>"#
    ));

    // Order is B, C, A
    assert!(read_entry(&path, "ppt/slides/slide1.xml").contains("<a:t>B</a:t>"));
    assert!(read_entry(&path, "ppt/slides/slide2.xml").contains("<a:t>C</a:t>"));
    assert!(read_entry(&path, "ppt/slides/slide3.xml").contains("<a:t>A</a:t>"));
}

#[test]
fn test_full_workflow_writes_pictures_and_text() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let red = create_test_png(temp_dir.path(), "red.png", [255, 0, 0]);
    let blue = create_test_png(temp_dir.path(), "blue.png", [0, 0, 255]);
    let builder = PresentationBuilder::default();
    let mut pres = builder.create(temp_dir.path(), "report.pptx").unwrap();

    let title = builder.insert_slide(&mut pres, 0, 0).unwrap();
    builder
        .set_title(pres.slide_mut(title).unwrap(), "Report & Summary", Some("2024"))
        .unwrap();
    let single = builder.add_image(&mut pres, 5, 1, &red).unwrap();
    builder
        .add_images(
            &mut pres,
            6,
            2,
            &[&red, &blue],
            &[(2.0, 2.0), (2.0, 2.0)],
            &[(0.5, 1.0), (-2.5, 1.0)],
        )
        .unwrap();
    builder
        .add_text_box(&mut pres, single, "Caption", [-1.0, 1.0, 2.0, 1.0])
        .unwrap();
    pres.save().unwrap();

    let path = temp_dir.path().join("report.pptx");
    let names = entry_names(&path);
    assert!(names.contains(&"ppt/slides/slide3.xml".to_string()));
    assert!(names.contains(&"ppt/media/image1.png".to_string()));
    assert!(names.contains(&"ppt/media/image2.png".to_string()));
    assert!(!names.contains(&"ppt/media/image3.png".to_string()));

    let title_xml = read_entry(&path, "ppt/slides/slide1.xml");
    assert!(title_xml.contains("<a:t>Report &amp; Summary</a:t>"));
    assert!(title_xml.contains("<a:t>2024</a:t>"));

    let image_xml = read_entry(&path, "ppt/slides/slide2.xml");
    assert_eq!(image_xml.matches("<p:pic>").count(), 1);
    assert!(image_xml.contains(r#"<a:off x="457200" y="1371600"/><a:ext cx="8229600" cy="4114800"/>"#));
    let left = (Emu(9_144_000) - Emu::from_inches(1.0)).value();
    assert!(image_xml.contains(&format!(r#"<a:off x="{}" y="914400"/>"#, left)));
    assert!(image_xml.contains(r#"sz="1000""#));
    assert!(image_xml.contains(r#"<a:latin typeface="Calibri"/>"#));

    let rels = read_entry(&path, "ppt/slides/_rels/slide2.xml.rels");
    assert!(rels.contains("../slideLayouts/slideLayout6.xml"));
    assert!(rels.contains("../media/image1.png"));

    let multi_xml = read_entry(&path, "ppt/slides/slide3.xml");
    assert_eq!(multi_xml.matches("<p:pic>").count(), 2);
}

#[test]
fn test_saved_presentation_reopens() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let img = create_test_png(temp_dir.path(), "photo.png", [10, 200, 30]);
    let builder = PresentationBuilder::default();
    let mut pres = builder.create(temp_dir.path(), "roundtrip.pptx").unwrap();

    let first = builder.insert_slide(&mut pres, 0, 0).unwrap();
    builder
        .set_title(pres.slide_mut(first).unwrap(), "Hello <World>", Some("Sub"))
        .unwrap();
    let second = builder.add_image(&mut pres, 1, 1, &img).unwrap();
    builder
        .set_title(pres.slide_mut(second).unwrap(), "Photo", None)
        .unwrap();
    builder
        .add_text_box(&mut pres, second, "line one\nline two", [-3.0, -1.0, 2.0, 0.5])
        .unwrap();
    pres.save().unwrap();

    let reopened = Presentation::open(&temp_dir.path().join("roundtrip.pptx")).unwrap();
    assert_eq!(reopened.slide_count(), 2);
    assert_eq!(reopened.size(), pres.size());

    let s1 = &reopened.slides()[0];
    assert_eq!(s1.layout_name(), "Title Slide");
    assert_eq!(s1.title().as_deref(), Some("Hello <World>"));
    assert_eq!(s1.subtitle().as_deref(), Some("Sub"));

    let s2 = &reopened.slides()[1];
    assert_eq!(s2.layout_index(), 1);
    assert_eq!(s2.title().as_deref(), Some("Photo"));
    assert_eq!(s2.subtitle(), None);
    let original = pres.slide(second).unwrap();
    let before: Vec<_> = original.pictures().map(|p| p.frame).collect();
    let after: Vec<_> = s2.pictures().map(|p| p.frame).collect();
    assert_eq!(before, after);

    let text_box = s2.text_boxes().next().expect("text box survives reopening");
    assert_eq!(text_box.text.text(), "line one\nline two");
    assert_eq!(text_box.frame, original.text_boxes().next().unwrap().frame);
    let run = text_box.text.runs().next().unwrap();
    assert_eq!(run.font.name.as_deref(), Some("Calibri"));
    assert_eq!(run.font.size, Some(10.0));

    let media = reopened.media(s2.pictures().next().unwrap().media).unwrap();
    assert_eq!(media.pixel_size(), (64, 48));
}

#[test]
fn test_reopened_presentation_accepts_more_slides() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let builder = PresentationBuilder::default();
    let mut pres = builder.create(temp_dir.path(), "grow.pptx").unwrap();
    builder.insert_slide(&mut pres, 6, 0).unwrap();
    builder.insert_slide(&mut pres, 6, 1).unwrap();
    pres.save().unwrap();

    let path = temp_dir.path().join("grow.pptx");
    let mut reopened = builder.open(&path).unwrap();
    let existing: Vec<_> = reopened.slides().iter().map(|s| s.id()).collect();
    let new_id = builder.insert_slide(&mut reopened, 5, 1).unwrap();
    assert!(!existing.contains(&new_id));
    reopened.save().unwrap();

    let again = Presentation::open(&path).unwrap();
    assert_eq!(again.slide_count(), 3);
    assert_eq!(again.slides()[1].layout_name(), "Title Only");
}

#[test]
fn test_open_rejects_non_package() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("not-a-deck.pptx");
    fs::write(&path, b"plain text").unwrap();

    assert!(Presentation::open(&path).is_err());
    assert!(Presentation::open(&temp_dir.path().join("missing.pptx")).is_err());
}

#[test]
fn test_control_characters_are_encoded_and_restored() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let builder = PresentationBuilder::default();
    let mut pres = builder.create(temp_dir.path(), "control.pptx").unwrap();

    let id = builder.insert_slide(&mut pres, 5, 0).unwrap();
    builder
        .set_title(pres.slide_mut(id).unwrap(), "Q1\u{0b}Q2", None)
        .unwrap();
    builder
        .add_text_box(&mut pres, id, "bell\u{7} and _x0041_", [1.0, 1.0, 2.0, 1.0])
        .unwrap();
    pres.save().unwrap();

    let path = temp_dir.path().join("control.pptx");
    let slide_xml = read_entry(&path, "ppt/slides/slide1.xml");
    assert!(!slide_xml
        .chars()
        .any(|c| (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')));
    assert!(slide_xml.contains("<a:t>Q1_x000B_Q2</a:t>"));

    let reopened = Presentation::open(&path).unwrap();
    let slide = &reopened.slides()[0];
    assert_eq!(slide.title().as_deref(), Some("Q1\u{0b}Q2"));
    assert_eq!(
        slide.text_boxes().next().unwrap().text.text(),
        "bell\u{7} and _x0041_"
    );
}
