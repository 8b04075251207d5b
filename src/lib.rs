//! Avatar customization canvas.
//!
//! A white raster surface with a fitted avatar image on it. Users paint
//! freehand strokes, erase, pick colors and brush sizes, swap outfit images,
//! upload their own picture and save the result as a JPEG.
//!
//! - [`manager::SurfaceManager`] owns the surface and replaces its content
//!   wholesale (background, outfits, uploads, clear).
//! - [`controller::StrokeController`] turns pointer events into strokes and
//!   erasing.
//! - [`session::Session`] ties both together for the frame loop in `main.rs`.

pub mod assets;
pub mod config;
pub mod controller;
pub mod draw;
pub mod error;
pub mod export;
pub mod gamma;
pub mod loader;
pub mod logger;
pub mod manager;
pub mod raster;
pub mod session;
pub mod surface;
pub mod types;
