// ABOUTME: Main entry point for the deckhand program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use deckhand::{default_layouts, BuilderConfig, Presentation, PresentationBuilder, ShapeKind};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty presentation
    Create(CreateArgs),

    /// Insert a slide, optionally setting its title and subtitle
    InsertSlide(InsertSlideArgs),

    /// Insert a slide holding one full-size image
    AddImage(AddImageArgs),

    /// Insert a slide holding several positioned images
    AddImages(AddImagesArgs),

    /// Add a text box to an existing slide
    AddText(AddTextArgs),

    /// List the available slide layouts
    Layouts,

    /// Summarize the slides of a presentation
    Info(InfoArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// Directory to create the presentation in
    #[arg(short, long)]
    dir: PathBuf,

    /// File name of the presentation
    #[arg(short, long)]
    name: String,

    /// Slide aspect ratio: '4:3' or '16:9'
    #[arg(long)]
    aspect_ratio: Option<String>,

    /// Document title stored in the file properties
    #[arg(long)]
    title: Option<String>,
}

#[derive(Args)]
struct SlidePlacement {
    /// Presentation file to modify
    #[arg(short, long)]
    input: PathBuf,

    /// Layout index (see `deckhand layouts`)
    #[arg(short, long)]
    layout: usize,

    /// Zero-based position of the new slide; past the end appends
    #[arg(short, long)]
    position: usize,
}

#[derive(Args)]
struct InsertSlideArgs {
    #[command(flatten)]
    placement: SlidePlacement,

    /// Title text
    #[arg(long)]
    title: Option<String>,

    /// Subtitle text (requires --title)
    #[arg(long, requires = "title")]
    subtitle: Option<String>,
}

#[derive(Args)]
struct AddImageArgs {
    #[command(flatten)]
    placement: SlidePlacement,

    /// Image file to place
    #[arg(long)]
    image: PathBuf,
}

#[derive(Args)]
struct AddImagesArgs {
    #[command(flatten)]
    placement: SlidePlacement,

    /// Image files to place
    #[arg(long, value_delimiter = ',', required = true)]
    image: Vec<PathBuf>,

    /// Sizes as WIDTH:HEIGHT in inches, one per image
    #[arg(long, value_delimiter = ',', value_parser = parse_pair)]
    dim: Vec<(f64, f64)>,

    /// Positions as X:Y in inches, one per image; negative values count from the far edge
    #[arg(long, value_delimiter = ',', value_parser = parse_pair, allow_hyphen_values = true)]
    pos: Vec<(f64, f64)>,
}

#[derive(Args)]
struct AddTextArgs {
    /// Presentation file to modify
    #[arg(short, long)]
    input: PathBuf,

    /// Zero-based index of the slide
    #[arg(short, long)]
    slide: usize,

    /// Text to place; newlines start new paragraphs
    #[arg(short, long)]
    text: String,

    /// X,Y,WIDTH,HEIGHT in inches; negative X/Y count from the far edge
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    frame: Vec<f64>,
}

#[derive(Args)]
struct InfoArgs {
    /// Presentation file to inspect
    #[arg(short, long)]
    input: PathBuf,
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("expected A:B, got '{}'", s))?;
    let a = a.trim().parse::<f64>().map_err(|e| format!("'{}': {}", a, e))?;
    let b = b.trim().parse::<f64>().map_err(|e| format!("'{}': {}", b, e))?;
    Ok((a, b))
}

fn open(builder: &PresentationBuilder, path: &Path) -> anyhow::Result<Presentation> {
    builder
        .open(path)
        .with_context(|| format!("Failed to open presentation {:?}", path))
}

fn run(command: &Commands, builder: PresentationBuilder) -> anyhow::Result<()> {
    match command {
        Commands::Create(args) => {
            let mut config = builder.config().clone();
            if let Some(ratio) = &args.aspect_ratio {
                config.aspect_ratio = ratio.clone();
            }
            let builder = PresentationBuilder::new(config);
            let mut presentation = builder.create(&args.dir, &args.name)?;
            if let Some(title) = &args.title {
                presentation.title = title.clone();
                presentation.save()?;
            }
            println!("New presentation created: {:?}", args.dir.join(&args.name));
        }
        Commands::InsertSlide(args) => {
            let p = &args.placement;
            let mut presentation = open(&builder, &p.input)?;
            let id = builder.insert_slide(&mut presentation, p.layout, p.position)?;
            if let Some(title) = &args.title {
                let slide = presentation
                    .slide_mut(id)
                    .ok_or_else(|| anyhow!("Inserted slide disappeared"))?;
                builder.set_title(slide, title, args.subtitle.as_deref())?;
            }
            presentation.save()?;
            println!(
                "Added slide at position {}",
                presentation.position_of(id).unwrap_or_default()
            );
        }
        Commands::AddImage(args) => {
            let p = &args.placement;
            let mut presentation = open(&builder, &p.input)?;
            builder.add_image(&mut presentation, p.layout, p.position, &args.image)?;
            presentation.save()?;
            println!("Added image {:?}", args.image);
        }
        Commands::AddImages(args) => {
            let p = &args.placement;
            let mut presentation = open(&builder, &p.input)?;
            builder.add_images(
                &mut presentation,
                p.layout,
                p.position,
                &args.image,
                &args.dim,
                &args.pos,
            )?;
            presentation.save()?;
            println!("Added {} images", args.image.len());
        }
        Commands::AddText(args) => {
            let rect: [f64; 4] = args.frame.as_slice().try_into().map_err(|_| {
                anyhow!(
                    "--frame takes exactly 4 values (X,Y,WIDTH,HEIGHT), got {}",
                    args.frame.len()
                )
            })?;
            let mut presentation = open(&builder, &args.input)?;
            let slide_id = match presentation.slide_at(args.slide) {
                Some(slide) => slide.id(),
                None => bail!(
                    "Slide index {} out of range: presentation has {} slides",
                    args.slide,
                    presentation.slide_count()
                ),
            };
            builder.add_text_box(&mut presentation, slide_id, &args.text, rect)?;
            presentation.save()?;
            println!("Added text box to slide {}", args.slide);
        }
        Commands::Layouts => {
            for (i, layout) in default_layouts().iter().enumerate() {
                println!("{:>2}  {}", i, layout.name);
            }
        }
        Commands::Info(args) => {
            let presentation = open(&builder, &args.input)?;
            let size = presentation.size();
            println!(
                "{:?}: {} slides, {:.2}in x {:.2}in",
                args.input,
                presentation.slide_count(),
                size.width.inches(),
                size.height.inches()
            );
            for (i, slide) in presentation.slides().iter().enumerate() {
                let pictures = slide
                    .shapes()
                    .iter()
                    .filter(|s| matches!(s.kind, ShapeKind::Picture(_)))
                    .count();
                let text_boxes = slide.text_boxes().count();
                println!(
                    "{:>3}  {:<24} title={:?} pictures={} text_boxes={}",
                    i,
                    slide.layout_name(),
                    slide.title().unwrap_or_default(),
                    pictures,
                    text_boxes
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        println!("No command specified. Use --help for usage information.");
        return Ok(());
    };

    let config = match BuilderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    info!("Using configuration: {:?}", config);

    match run(command, PresentationBuilder::new(config)) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
