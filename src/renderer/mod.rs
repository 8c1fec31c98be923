//! Rendering module
//!
//! The simulation only talks to a `DrawSurface`. Concrete graphics live
//! behind it; the bundled implementation draws to a terminal.

pub mod terminal;

pub use terminal::{TerminalAssets, TerminalGuard, TerminalSurface};

use crate::error::Result;
use crate::platform::AssetLoader;

/// Opaque handle to a full-surface image (background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a sprite image (actor frames, obstacles)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u32);

/// Opaque handle to a loaded font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// Destination rectangle in screen coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flip {
    #[default]
    None,
    Vertical,
}

/// Minimal drawing contract consumed by the scene.
///
/// A frame is `clear`, draw calls, then `present`. `None` as a destination
/// means the whole surface.
pub trait DrawSurface {
    fn clear(&mut self) -> Result<()>;
    fn present(&mut self) -> Result<()>;
    fn draw_sprite(&mut self, sprite: SpriteHandle, dest: Rect, flip: Flip) -> Result<()>;
    fn draw_texture(&mut self, texture: TextureHandle, dest: Option<Rect>) -> Result<()>;
    fn draw_text(&mut self, font: FontHandle, text: &str, dest: Option<Rect>) -> Result<()>;
}

/// Number of actor animation frames
pub const ACTOR_FRAME_COUNT: usize = 4;

/// Handles the scene needs to paint a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneAssets {
    pub background: TextureHandle,
    pub actor_frames: Vec<SpriteHandle>,
    pub obstacle: SpriteHandle,
    pub font: FontHandle,
}

impl SceneAssets {
    /// Resolve every named resource; the first failure aborts
    pub fn load<L: AssetLoader + ?Sized>(loader: &mut L) -> Result<Self> {
        let background = loader.load_texture("background")?;

        let actor_frames = (1..=ACTOR_FRAME_COUNT)
            .map(|i| loader.load_sprite(&format!("actor-frame-{i}")))
            .collect::<Result<Vec<_>>>()?;

        let obstacle = loader.load_sprite("obstacle")?;
        let font = loader.load_font("banner-font")?;

        log::info!("Loaded scene assets ({} actor frames)", actor_frames.len());

        Ok(Self {
            background,
            actor_frames,
            obstacle,
            font,
        })
    }

    /// Release every handle back to the loader
    pub fn release<L: AssetLoader + ?Sized>(self, loader: &mut L) {
        loader.release_texture(self.background);
        for frame in self.actor_frames {
            loader.release_sprite(frame);
        }
        loader.release_sprite(self.obstacle);
        loader.release_font(self.font);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeLoader;
    use super::*;
    use crate::error::GameError;

    #[test]
    fn test_load_resolves_all_names() {
        let mut loader = FakeLoader::default();
        let assets = SceneAssets::load(&mut loader).unwrap();
        assert_eq!(assets.actor_frames.len(), ACTOR_FRAME_COUNT);
        assert_eq!(loader.next, 7);

        assets.release(&mut loader);
        assert_eq!(loader.released, 7);
    }

    #[test]
    fn test_missing_asset_is_resource_error() {
        let mut loader = FakeLoader {
            missing: vec!["actor-frame-3".into()],
            ..FakeLoader::default()
        };
        let err = SceneAssets::load(&mut loader).unwrap_err();
        match err {
            GameError::ResourceLoad { name, .. } => assert_eq!(name, "actor-frame-3"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
