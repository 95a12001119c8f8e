use deckhand::{Emu, Presentation};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn deckhand(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deckhand"))
        .args(args)
        .env_remove("DECKHAND_FONT_NAME")
        .env_remove("DECKHAND_FONT_SIZE_PT")
        .env_remove("DECKHAND_ASPECT_RATIO")
        .output()
        .expect("Failed to run deckhand")
}

fn create_deck(dir: &Path, name: &str) {
    let out = deckhand(&["create", "--dir", dir.to_str().unwrap(), "--name", name]);
    assert!(
        out.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn test_cli_builds_deck_step_by_step() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_deck(temp_dir.path(), "cli.pptx");
    let deck = temp_dir.path().join("cli.pptx");
    let deck_arg = deck.to_str().unwrap();

    let out = deckhand(&[
        "insert-slide",
        "-i",
        deck_arg,
        "--layout",
        "0",
        "--position",
        "0",
        "--title",
        "Quarterly",
        "--subtitle",
        "Numbers",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = deckhand(&[
        "add-text",
        "-i",
        deck_arg,
        "--slide",
        "0",
        "--text",
        "footnote",
        "--frame=-1,1,2,1",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let pres = Presentation::open(&deck).unwrap();
    assert_eq!(pres.slide_count(), 1);
    let slide = &pres.slides()[0];
    assert_eq!(slide.title().as_deref(), Some("Quarterly"));
    assert_eq!(slide.subtitle().as_deref(), Some("Numbers"));

    let text_box = slide.text_boxes().next().expect("text box was added");
    assert_eq!(text_box.text.text(), "footnote");
    assert_eq!(text_box.frame.left, Emu(9_144_000 - 914_400));
    assert_eq!(text_box.frame.top, Emu(914_400));
}

#[test]
fn test_cli_info_lists_slides() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_deck(temp_dir.path(), "info.pptx");
    let deck = temp_dir.path().join("info.pptx");
    let deck_arg = deck.to_str().unwrap();

    for (layout, title) in [("5", "First"), ("5", "Second")] {
        let out = deckhand(&[
            "insert-slide", "-i", deck_arg, "-l", layout, "-p", "9", "--title", title,
        ]);
        assert!(out.status.success());
    }

    let out = deckhand(&["info", "-i", deck_arg]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("2 slides"));
    assert!(stdout.contains("title=\"First\""));
    assert!(stdout.contains("title=\"Second\""));
    assert!(stdout.find("First").unwrap() < stdout.find("Second").unwrap());
}

#[test]
fn test_cli_layouts_lists_catalogue() {
    let out = deckhand(&["layouts"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(" 0  Title Slide"));
    assert!(stdout.contains(" 6  Blank"));
    assert!(stdout.contains("10  Vertical Title and Text"));
}

#[test]
fn test_cli_reports_invalid_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_deck(temp_dir.path(), "bad.pptx");
    let deck = temp_dir.path().join("bad.pptx");

    let out = deckhand(&[
        "insert-slide",
        "-i",
        deck.to_str().unwrap(),
        "-l",
        "42",
        "-p",
        "0",
    ]);
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error:"));

    let pres = Presentation::open(&deck).unwrap();
    assert_eq!(pres.slide_count(), 0);
}

#[test]
fn test_cli_add_images_rejects_mismatched_lists() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_deck(temp_dir.path(), "mismatch.pptx");
    let deck = temp_dir.path().join("mismatch.pptx");

    let out = deckhand(&[
        "add-images",
        "-i",
        deck.to_str().unwrap(),
        "-l",
        "6",
        "-p",
        "0",
        "--image",
        "a.png,b.png",
        "--dim",
        "1:1",
        "--pos",
        "0:0,1:1",
    ]);
    assert!(!out.status.success());

    let pres = Presentation::open(&deck).unwrap();
    assert_eq!(pres.slide_count(), 0);
}
