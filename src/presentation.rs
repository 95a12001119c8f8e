// ABOUTME: Presentation document model
// ABOUTME: Owns the slide order, layouts, media store and slide size, and saves/opens packages

use crate::errors::{DeckError, Result};
use crate::layout::{default_layouts, SlideLayout};
use crate::media::{ImageData, MediaId};
use crate::shapes::ShapeId;
use crate::slide::{Slide, SlideId};
use crate::units::{Emu, SlideSize};
use crate::{package, reader};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// An in-memory presentation.
///
/// Slide order is the order of the owned slide list. Package slide ids are
/// derived from that order when saving, so they stay unique and contiguous
/// no matter how slides were inserted.
#[derive(Debug, Clone)]
pub struct Presentation {
    size: SlideSize,
    slides: Vec<Slide>,
    media: Vec<ImageData>,
    next_slide_id: u32,
    path: Option<PathBuf>,
    pub title: String,
    pub creator: String,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new(SlideSize::default())
    }
}

impl Presentation {
    pub fn new(size: SlideSize) -> Self {
        Self {
            size,
            slides: Vec::new(),
            media: Vec::new(),
            next_slide_id: 1,
            path: None,
            title: "Presentation".to_string(),
            creator: "deckhand".to_string(),
        }
    }

    /// Open a package previously written by [`Presentation::save_as`].
    pub fn open(path: &Path) -> Result<Self> {
        let mut presentation = reader::read_package(path)?;
        presentation.path = Some(path.to_path_buf());
        Ok(presentation)
    }

    pub fn size(&self) -> SlideSize {
        self.size
    }

    pub fn slide_width(&self) -> Emu {
        self.size.width
    }

    pub fn slide_height(&self) -> Emu {
        self.size.height
    }

    pub fn layouts(&self) -> &'static [SlideLayout] {
        default_layouts()
    }

    pub fn layout(&self, index: usize) -> Result<&'static SlideLayout> {
        let layouts = self.layouts();
        layouts.get(index).ok_or(DeckError::InvalidLayoutIndex {
            index,
            available: layouts.len(),
        })
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, id: SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id() == id)
    }

    pub fn slide_mut(&mut self, id: SlideId) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|s| s.id() == id)
    }

    pub fn slide_at(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn position_of(&self, id: SlideId) -> Option<usize> {
        self.slides.iter().position(|s| s.id() == id)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn allocate_slide_id(&mut self) -> SlideId {
        let id = SlideId(self.next_slide_id);
        self.next_slide_id += 1;
        id
    }

    /// Append a slide built from the layout at `layout_index`.
    pub fn add_slide(&mut self, layout_index: usize) -> Result<SlideId> {
        let layout = self.layout(layout_index)?;
        let id = self.allocate_slide_id();
        self.slides.push(Slide::from_layout(id, layout_index, layout));
        debug!(
            "Appended slide {} with layout '{}' ({} slides)",
            id,
            layout.name,
            self.slides.len()
        );
        Ok(id)
    }

    /// Used by the package reader, which rebuilds shapes itself.
    pub(crate) fn push_empty_slide(&mut self, layout_index: usize) -> Result<&mut Slide> {
        let layout = self.layout(layout_index)?;
        let id = self.allocate_slide_id();
        self.slides.push(Slide::empty(id, layout_index, layout));
        let last = self.slides.len() - 1;
        Ok(&mut self.slides[last])
    }

    /// Move a slide to `position`, clamped to the end of the slide list.
    /// Returns the position the slide ended up at.
    pub fn move_slide(&mut self, id: SlideId, position: usize) -> Result<usize> {
        let from = self
            .position_of(id)
            .ok_or_else(|| DeckError::UnknownSlide(id.to_string()))?;
        let slide = self.slides.remove(from);
        let to = position.min(self.slides.len());
        self.slides.insert(to, slide);
        debug!("Moved slide {} from position {} to {}", id, from, to);
        Ok(to)
    }

    /// Store image bytes, reusing the existing part when identical content is
    /// already present.
    pub fn add_media(&mut self, image: ImageData) -> MediaId {
        if let Some(index) = self.media.iter().position(|m| m.bytes() == image.bytes()) {
            return MediaId(index);
        }
        self.media.push(image);
        MediaId(self.media.len() - 1)
    }

    /// Store `image` and place it on a slide. See [`Slide::add_picture`] for
    /// how a missing width or height is derived.
    pub fn add_picture(
        &mut self,
        slide_id: SlideId,
        image: ImageData,
        left: Emu,
        top: Emu,
        width: Option<Emu>,
        height: Option<Emu>,
    ) -> Result<ShapeId> {
        if self.slide(slide_id).is_none() {
            return Err(DeckError::UnknownSlide(slide_id.to_string()));
        }
        let media = self.add_media(image);
        let image = &self.media[media.0];
        let slide = self
            .slides
            .iter_mut()
            .find(|s| s.id() == slide_id)
            .ok_or_else(|| DeckError::UnknownSlide(slide_id.to_string()))?;
        Ok(slide.add_picture(media, image, left, top, width, height))
    }

    pub fn media(&self, id: MediaId) -> Option<&ImageData> {
        self.media.get(id.0)
    }

    pub(crate) fn media_parts(&self) -> &[ImageData] {
        &self.media
    }

    /// Write to the path this presentation was created at or opened from.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or(DeckError::MissingOutputPath)?;
        package::write_package(self, path)
    }

    /// Write to `path` and remember it for later [`Presentation::save`] calls.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        package::write_package(self, path)?;
        info!("Presentation saved to {:?}", path);
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}
