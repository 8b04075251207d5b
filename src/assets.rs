// Bundled outfit images and where they go on the canvas.
use crate::surface::Placement;
use std::path::{Path, PathBuf};

/// Every outfit is fitted into this box (350x500 at 200,100).
pub const OUTFIT_PLACEMENT: Placement = Placement::new(350.0, 500.0, 200.0, 100.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outfit {
    /// The base avatar shown at startup and after a clear.
    Base,
    AnimeGirl,
    Shirt2,
    Shirt3,
}

impl Outfit {
    pub const ALL: [Outfit; 4] = [Outfit::Base, Outfit::AnimeGirl, Outfit::Shirt2, Outfit::Shirt3];

    pub fn file_name(self) -> &'static str {
        match self {
            Outfit::Base => "girlBaseAvatar.png",
            Outfit::AnimeGirl => "animeGirl.png",
            Outfit::Shirt2 => "shirt2.png",
            Outfit::Shirt3 => "shirt3.png",
        }
    }
}

/// Resolves outfits to files under one assets directory.
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, outfit: Outfit) -> PathBuf {
        self.root.join(outfit.file_name())
    }

    pub fn default_outfit(&self) -> Outfit {
        Outfit::Base
    }
}
