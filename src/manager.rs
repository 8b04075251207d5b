// Surface Manager: owns the surface and everything that replaces its content
// wholesale (background fills, outfit swaps, uploads, clear).
use crate::assets::{AssetCatalog, OUTFIT_PLACEMENT, Outfit};
use crate::error::Error;
use crate::loader::{AssetLoader, LoadTarget, LoadedImage, RequestId};
use crate::surface::{Placement, Surface};
use crate::types::Color;
use std::path::PathBuf;
use std::time::Duration;

pub struct SurfaceManager {
    surface: Surface,
    loader: AssetLoader,
    catalog: AssetCatalog,
}

impl SurfaceManager {
    /// Background is painted before anything else can touch the surface.
    pub fn new(width: usize, height: usize, background: Color, catalog: AssetCatalog) -> Result<Self, Error> {
        Ok(Self {
            surface: Surface::new(width, height, background),
            loader: AssetLoader::spawn()?,
            catalog,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn resize_to_container(&mut self, width: usize, height: usize) {
        self.surface.resize_to_container(width, height);
    }

    pub fn fill_background(&mut self, color: Color) {
        self.surface.fill_background(color);
    }

    /// Ask for `path` to be fitted into `placement` once decoded.
    pub fn load_image(&mut self, path: impl Into<PathBuf>, placement: Placement) -> Result<RequestId, Error> {
        self.loader.request(path, LoadTarget::Placed(placement))
    }

    pub fn load_outfit(&mut self, outfit: Outfit) -> Result<RequestId, Error> {
        log::info!("outfit {:?} selected", outfit);
        let path = self.catalog.path(outfit);
        self.load_image(path, OUTFIT_PLACEMENT)
    }

    /// Ask for a user file to be stretched over the whole surface once decoded.
    pub fn load_upload(&mut self, path: impl Into<PathBuf>) -> Result<RequestId, Error> {
        self.loader.request(path, LoadTarget::Fill)
    }

    /// Back to the initial look: background fill plus the default outfit.
    pub fn clear(&mut self) -> Result<RequestId, Error> {
        let background = self.surface.background();
        self.surface.fill_background(background);
        let outfit = self.catalog.default_outfit();
        self.load_outfit(outfit)
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_pending()
    }

    /// Apply a finished load, if the newest one is done. Returns true if the surface changed.
    pub fn pump(&mut self) -> bool {
        match self.loader.poll() {
            Some(loaded) => {
                self.apply(loaded);
                true
            }
            None => false,
        }
    }

    /// Like `pump`, but block up to `timeout` for the newest load.
    pub fn pump_blocking(&mut self, timeout: Duration) -> bool {
        match self.loader.wait(timeout) {
            Some(loaded) => {
                self.apply(loaded);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, loaded: LoadedImage) {
        match loaded.target {
            LoadTarget::Placed(placement) => {
                let dest = self.surface.place_image(&loaded.image, &placement);
                log::debug!(
                    "load #{} placed {} at ({:.1},{:.1}) {:.1}x{:.1}",
                    loaded.id,
                    loaded.path.display(),
                    dest.x,
                    dest.y,
                    dest.width,
                    dest.height
                );
            }
            LoadTarget::Fill => {
                self.surface.fill_with_image(&loaded.image);
                log::debug!("load #{} filled the surface with {}", loaded.id, loaded.path.display());
            }
        }
    }
}
