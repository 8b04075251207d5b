// Save the canvas as a JPEG named after the current time.
use crate::error::Error;
use crate::surface::Surface;
use image::codecs::jpeg::JpegEncoder;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// `<unix-millis>.jpg`
pub fn export_file_name(now: SystemTime) -> String {
    let millis = now.duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    format!("{millis}.jpg")
}

/// Encode the flattened surface into `dir`. Returns the written path.
pub fn export_jpeg(surface: &Surface, dir: &Path, quality: u8) -> Result<PathBuf, Error> {
    export_jpeg_at(surface, dir, quality, SystemTime::now())
}

fn export_jpeg_at(surface: &Surface, dir: &Path, quality: u8, now: SystemTime) -> Result<PathBuf, Error> {
    fs::create_dir_all(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
    let (path, file) = create_unique(dir, &export_file_name(now))?;

    let mut writer = BufWriter::new(file);
    let rgb = surface.to_rgb_image();
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(&rgb)
        .map_err(|source| Error::Export { path: path.clone(), source })?;
    writer.flush().map_err(|source| Error::Io { path: path.clone(), source })?;

    log::info!("saved {}", path.display());
    Ok(path)
}

/// Create `name` in `dir` without touching existing files; `1700000000123.jpg`
/// is taken, so try `1700000000123-1.jpg`, `-2`, ...
fn create_unique(dir: &Path, name: &str) -> Result<(PathBuf, File), Error> {
    let stem = name.trim_end_matches(".jpg");
    let mut n = 0u32;
    loop {
        let path = if n == 0 { dir.join(name) } else { dir.join(format!("{stem}-{n}.jpg")) };
        match File::create_new(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying next name", path.display());
                n += 1;
            }
            Err(source) => return Err(Error::Io { path, source }),
        }
    }
}
