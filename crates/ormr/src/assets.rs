//! Resource registry: string ids mapped to decoded images.
//!
//! Hosts register paths up front and call [`Assets::load_all`] once before
//! the loop starts (the scheduler's `enqueue_when` covers hosts that decode
//! on a background thread and need to poll for completion). Lookups return
//! `None` for anything unknown or not yet loaded; the default entity draw
//! treats that as "skip this frame", never as an error.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::EngineError;

/// A decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Image {
    /// # Panics
    ///
    /// Panics if `pixels` is not exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "pixel buffer does not match {width}x{height} RGBA8"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// An all-transparent image. Handy as a placeholder in headless hosts.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }
}

/// Registry of drawable resources, keyed by caller-chosen ids.
#[derive(Debug, Default)]
pub struct Assets {
    pending: Vec<(String, PathBuf)>,
    images: HashMap<String, Image>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file for [`load_all`](Self::load_all). Nothing is read yet.
    pub fn register(&mut self, id: &str, path: impl Into<PathBuf>) {
        self.pending.push((id.to_string(), path.into()));
    }

    /// Decode every registered file. Stops at the first failure; resources
    /// decoded before the failure stay available.
    pub fn load_all(&mut self) -> Result<(), EngineError> {
        while let Some((id, path)) = self.pending.pop() {
            let decoded = image::open(&path).map_err(|source| EngineError::Resource {
                id: id.clone(),
                path: path.clone(),
                source,
            })?;
            let rgba = decoded.to_rgba8();
            log::info!("loaded resource `{id}` from {}", path.display());
            let (width, height) = rgba.dimensions();
            self.images.insert(id, Image::new(width, height, rgba.into_raw()));
        }
        Ok(())
    }

    /// Store an already-decoded image under `id`, replacing any existing one.
    pub fn insert(&mut self, id: &str, image: Image) {
        self.images.insert(id.to_string(), image);
    }

    /// The decoded image, or `None` if unknown or not loaded yet.
    pub fn get(&self, id: &str) -> Option<&Image> {
        self.images.get(id)
    }

    /// True once no registered resource is waiting to be decoded.
    pub fn done_loading(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut assets = Assets::new();
        assets.insert("ship", Image::blank(16, 16));
        assert_eq!(assets.get("ship").unwrap().width, 16);
        assert!(assets.get("slug").is_none());
    }

    #[test]
    fn blank_image_dimensions() {
        let image = Image::blank(4, 3);
        assert_eq!(image.pixels.len(), 4 * 3 * 4);
    }

    #[test]
    #[should_panic(expected = "RGBA8")]
    fn mismatched_pixel_buffer_panics() {
        Image::new(2, 2, vec![0; 3]);
    }

    #[test]
    fn loading_tracks_pending_work() {
        let mut assets = Assets::new();
        assert!(assets.done_loading());
        assets.register("tiles", "res/tiles.png");
        assert!(!assets.done_loading());
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut assets = Assets::new();
        assets.register("ghost", "definitely/not/here.png");
        let err = assets.load_all().unwrap_err();
        assert!(matches!(err, EngineError::Resource { ref id, .. } if id == "ghost"));
    }
}
