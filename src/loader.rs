// Background image decoding with last-requested-wins semantics.
//
// Decoding a PNG can take longer than a frame, so requests go to one worker
// thread and results come back over a channel. Every request gets a fresh id;
// a newer request supersedes all older ones. The worker skips superseded jobs
// it has not started yet, and `poll` throws away results that arrive for a
// superseded id. A slow outfit therefore never paints over a newer choice.

use crate::error::Error;
use crate::surface::Placement;
use image::RgbaImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Identity of one load request. Larger ids are newer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a decoded image should be put on the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoadTarget {
    /// Fit and center inside a box (outfits).
    Placed(Placement),
    /// Stretch over the whole surface (uploads).
    Fill,
}

struct Job {
    id: RequestId,
    path: PathBuf,
    target: LoadTarget,
}

struct Outcome {
    id: RequestId,
    path: PathBuf,
    target: LoadTarget,
    result: Result<RgbaImage, Error>,
}

/// A decoded image that is still the newest request.
#[derive(Debug)]
pub struct LoadedImage {
    pub id: RequestId,
    pub path: PathBuf,
    pub target: LoadTarget,
    pub image: RgbaImage,
}

pub struct AssetLoader {
    jobs: Option<Sender<Job>>,
    outcomes: Receiver<Outcome>,
    latest: Arc<AtomicU64>, // id of the newest request; shared with the worker
    next_id: u64,
    pending: Option<RequestId>,
    worker: Option<JoinHandle<()>>,
}

impl AssetLoader {
    /// Start the decoder thread.
    pub fn spawn() -> Result<Self, Error> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (out_tx, out_rx) = mpsc::channel::<Outcome>();
        let latest = Arc::new(AtomicU64::new(0));

        let worker_latest = Arc::clone(&latest);
        let worker = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || run_worker(job_rx, out_tx, worker_latest))
            .map_err(Error::LoaderSpawn)?;

        Ok(Self {
            jobs: Some(job_tx),
            outcomes: out_rx,
            latest,
            next_id: 0,
            pending: None,
            worker: Some(worker),
        })
    }

    /// Queue a decode. Supersedes every earlier request.
    pub fn request(&mut self, path: impl Into<PathBuf>, target: LoadTarget) -> Result<RequestId, Error> {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.latest.store(id.0, Ordering::Release);

        let path = path.into();
        log::debug!("load #{id} requested: {}", path.display());
        let jobs = self.jobs.as_ref().ok_or(Error::LoaderClosed)?;
        jobs.send(Job { id, path, target }).map_err(|_| Error::LoaderClosed)?;
        self.pending = Some(id);
        Ok(id)
    }

    /// True while the newest request has not resolved yet.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking: drain finished work, return the newest request's image if it is done.
    pub fn poll(&mut self) -> Option<LoadedImage> {
        let mut ready = None;
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) => {
                    if let Some(img) = self.accept(outcome) {
                        ready = Some(img);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.pending = None;
                    break;
                }
            }
        }
        ready
    }

    /// Block until the newest request resolves or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadedImage> {
        let deadline = Instant::now() + timeout;
        let mut ready = self.poll();
        while self.pending.is_some() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.outcomes.recv_timeout(left) {
                Ok(outcome) => {
                    if let Some(img) = self.accept(outcome) {
                        ready = Some(img);
                    }
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    self.pending = None;
                    break;
                }
            }
        }
        ready
    }

    fn accept(&mut self, outcome: Outcome) -> Option<LoadedImage> {
        if Some(outcome.id) != self.pending {
            log::debug!("discarding stale load #{} ({})", outcome.id, outcome.path.display());
            return None;
        }
        self.pending = None;

        match outcome.result {
            Ok(image) => {
                log::info!(
                    "loaded {} ({}x{})",
                    outcome.path.display(),
                    image.width(),
                    image.height()
                );
                Some(LoadedImage { id: outcome.id, path: outcome.path, target: outcome.target, image })
            }
            Err(e) => {
                // Cosmetic feature: the surface just keeps what it had.
                log::warn!("{e}");
                None
            }
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        // Closing the job channel ends the worker's loop.
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(jobs: Receiver<Job>, outcomes: Sender<Outcome>, latest: Arc<AtomicU64>) {
    for job in jobs {
        if job.id.0 < latest.load(Ordering::Acquire) {
            log::trace!("skipping superseded load #{}", job.id);
            continue;
        }
        let result = decode(&job.path);
        let outcome = Outcome { id: job.id, path: job.path, target: job.target, result };
        if outcomes.send(outcome).is_err() {
            break;
        }
    }
}

fn decode(path: &Path) -> Result<RgbaImage, Error> {
    let img = image::open(path).map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    const WAIT: Duration = Duration::from_secs(10);

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, px: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba(px)).save(&path).unwrap();
        path
    }

    #[test]
    fn loads_an_image() {
        let dir = tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 3, 2, [1, 2, 3, 255]);

        let mut loader = AssetLoader::spawn().unwrap();
        let id = loader.request(&path, LoadTarget::Fill).unwrap();
        assert!(loader.is_pending());

        assert_eq!(id.to_string(), "1");

        let loaded = loader.wait(WAIT).expect("image should load");
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.target, LoadTarget::Fill);
        assert_eq!(loaded.image.dimensions(), (3, 2));
        assert!(!loader.is_pending());
    }

    #[test]
    fn newest_request_wins() {
        let dir = tempdir().unwrap();
        let big = write_png(dir.path(), "big.png", 512, 512, [255, 0, 0, 255]);
        let small = write_png(dir.path(), "small.png", 1, 1, [0, 0, 255, 255]);

        let mut loader = AssetLoader::spawn().unwrap();
        let first = loader.request(&big, LoadTarget::Fill).unwrap();
        let second = loader.request(&small, LoadTarget::Fill).unwrap();
        assert!(second > first);

        let loaded = loader.wait(WAIT).expect("newest image should load");
        assert_eq!(loaded.id, second);
        assert_eq!(loaded.path, small);

        // Nothing from the superseded request shows up afterwards.
        thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn missing_file_resolves_to_nothing() {
        let dir = tempdir().unwrap();
        let mut loader = AssetLoader::spawn().unwrap();
        loader.request(dir.path().join("nope.png"), LoadTarget::Fill).unwrap();
        assert!(loader.wait(WAIT).is_none());
        assert!(!loader.is_pending());
    }
}
