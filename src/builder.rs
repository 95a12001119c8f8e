// ABOUTME: High-level presentation building operations
// ABOUTME: Create files, insert slides at positions, set titles, and place images and text boxes

use crate::config::BuilderConfig;
use crate::errors::{DeckError, Result};
use crate::media::ImageData;
use crate::presentation::Presentation;
use crate::shapes::ShapeId;
use crate::slide::{Slide, SlideId};
use crate::units::{Emu, Frame};
use crate::utils::validate_directory_writable;
use log::{debug, info};
use std::path::Path;

/// Builds presentations one operation at a time, applying the defaults from
/// a [`BuilderConfig`].
///
/// Coordinates are given in inches. A negative `x` or `y` is measured from
/// the right or bottom edge of the slide.
#[derive(Debug, Clone, Default)]
pub struct PresentationBuilder {
    config: BuilderConfig,
}

impl PresentationBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Create an empty presentation and save it to `dir/filename` right away.
    /// The presentation remembers the path for later [`Presentation::save`] calls.
    pub fn create(&self, dir: &Path, filename: &str) -> Result<Presentation> {
        if filename.trim().is_empty() {
            return Err(DeckError::ValidationError(
                "File name must not be empty".to_string(),
            ));
        }
        validate_directory_writable(dir)?;

        let mut presentation = Presentation::new(self.config.slide_size());
        presentation.creator = self.config.creator.clone();
        let output_path = dir.join(filename);
        presentation.save_as(&output_path)?;

        info!("New presentation created: {:?}", output_path);
        Ok(presentation)
    }

    /// Open an existing presentation file.
    pub fn open(&self, path: &Path) -> Result<Presentation> {
        Presentation::open(path)
    }

    /// Add a slide with the layout at `layout_index` and move it to
    /// `position`. Positions past the end append.
    pub fn insert_slide(
        &self,
        presentation: &mut Presentation,
        layout_index: usize,
        position: usize,
    ) -> Result<SlideId> {
        let id = presentation.add_slide(layout_index)?;
        let placed = presentation.move_slide(id, position)?;
        if placed != position {
            debug!(
                "Requested position {} is past the end; slide placed at {}",
                position, placed
            );
        }
        info!(
            "Inserted slide {} with layout {} at position {}",
            id, layout_index, placed
        );
        Ok(id)
    }

    /// Set the title text and, when given, the subtitle (placeholder index 1).
    pub fn set_title(&self, slide: &mut Slide, title: &str, subtitle: Option<&str>) -> Result<()> {
        slide.set_title(title, subtitle)?;
        info!(
            "Set title{} on slide {}",
            if subtitle.is_some() { " and subtitle" } else { "" },
            slide.id()
        );
        Ok(())
    }

    /// Insert a slide holding one picture that fills the slide below the
    /// title area.
    pub fn add_image(
        &self,
        presentation: &mut Presentation,
        layout_index: usize,
        position: usize,
        image_path: &Path,
    ) -> Result<SlideId> {
        let slide_id = self.insert_slide(presentation, layout_index, position)?;

        let c = &self.config;
        let frame = Frame::new(
            Emu::from_inches(c.image_left),
            Emu::from_inches(c.image_top),
            presentation.slide_width() - Emu::from_inches(c.image_width_margin),
            presentation.slide_height() - Emu::from_inches(c.image_height_margin),
        );
        self.place_picture(presentation, slide_id, image_path, frame)?;

        info!("Added image {:?} to slide {}", image_path, slide_id);
        Ok(slide_id)
    }

    /// Insert a slide holding several pictures. `dims[i]` is the (width,
    /// height) and `positions[i]` the (x, y) of `paths[i]`, all in inches.
    ///
    /// The three lists must have the same length and every coordinate must be
    /// valid; otherwise nothing is inserted. A picture that fails to load
    /// stops the batch, leaving the slide and any pictures already placed.
    pub fn add_images<P: AsRef<Path>>(
        &self,
        presentation: &mut Presentation,
        layout_index: usize,
        position: usize,
        paths: &[P],
        dims: &[(f64, f64)],
        positions: &[(f64, f64)],
    ) -> Result<SlideId> {
        if paths.len() != dims.len() || paths.len() != positions.len() {
            return Err(DeckError::LengthMismatch {
                paths: paths.len(),
                dims: dims.len(),
                positions: positions.len(),
            });
        }

        let size = presentation.size();
        let frames = positions
            .iter()
            .zip(dims)
            .map(|(&(x, y), &(w, h))| Frame::from_inches([x, y, w, h], size))
            .collect::<Result<Vec<_>>>()?;

        let slide_id = self.insert_slide(presentation, layout_index, position)?;
        for (i, (path, frame)) in paths.iter().zip(frames).enumerate() {
            debug!(
                "Image {} -> left {} top {} width {} height {}",
                i, frame.left, frame.top, frame.width, frame.height
            );
            self.place_picture(presentation, slide_id, path.as_ref(), frame)?;
        }

        info!("Added {} images to slide {}", paths.len(), slide_id);
        Ok(slide_id)
    }

    /// Add a text box at `[x, y, width, height]` inches. Every run gets the
    /// configured default font.
    pub fn add_text_box(
        &self,
        presentation: &mut Presentation,
        slide_id: SlideId,
        text: &str,
        rect: [f64; 4],
    ) -> Result<ShapeId> {
        let frame = Frame::from_inches(rect, presentation.size())?;
        let font = self.config.default_font();

        let slide = presentation
            .slide_mut(slide_id)
            .ok_or_else(|| DeckError::UnknownSlide(slide_id.to_string()))?;
        let shape_id = slide.add_text_box(frame, text);
        if let Some(text_box) = slide.shape_mut(shape_id).and_then(|s| s.as_text_box_mut()) {
            text_box.text.apply_font(&font);
        }

        info!("Added text box {} to slide {}", shape_id, slide_id);
        Ok(shape_id)
    }

    fn place_picture(
        &self,
        presentation: &mut Presentation,
        slide_id: SlideId,
        image_path: &Path,
        frame: Frame,
    ) -> Result<ShapeId> {
        let image = ImageData::load(image_path)?;
        let shape_id = presentation.add_picture(
            slide_id,
            image,
            frame.left,
            frame.top,
            Some(frame.width),
            Some(frame.height),
        )?;

        if let Some(picture) = presentation
            .slide_mut(slide_id)
            .and_then(|s| s.shape_mut(shape_id))
            .and_then(|s| s.as_picture_mut())
        {
            picture.description = image_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
        }
        Ok(shape_id)
    }
}
