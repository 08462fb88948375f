// Logo bitmap loading off the frame loop.
// The decode runs on a background thread and reports through a channel; the
// effect only ever polls, so a slow or broken asset never stalls a frame.

use crate::error::{Error, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Starts decodes. A trait so the lifecycle can be driven by a fake in tests.
pub trait AssetLoader {
    fn load(&self, path: &Path) -> PendingDecode;
}

pub enum DecodePoll {
    Pending,
    Loaded(RgbaImage),
    Failed(Error),
}

/// Handle to one in-flight decode. Dropping it abandons the result.
pub struct PendingDecode {
    rx: Receiver<Result<RgbaImage>>,
}

impl PendingDecode {
    pub fn from_channel(rx: Receiver<Result<RgbaImage>>) -> Self {
        Self { rx }
    }

    /// Never blocks.
    pub fn poll(&self) -> DecodePoll {
        match self.rx.try_recv() {
            Ok(Ok(img)) => DecodePoll::Loaded(img),
            Ok(Err(e)) => DecodePoll::Failed(e),
            Err(TryRecvError::Empty) => DecodePoll::Pending,
            Err(TryRecvError::Disconnected) => {
                DecodePoll::Failed(Error::Decode("decoder exited without a result".to_string()))
            }
        }
    }
}

/// Decode a file into RGBA8 (blocking).
pub fn decode_file(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| Error::Decode(format!("{}: {}", path.display(), e)))?;
    Ok(img.to_rgba8())
}

/// Decodes with `image` on a short-lived named thread per request.
#[derive(Default)]
pub struct ThreadedLoader;

impl AssetLoader for ThreadedLoader {
    fn load(&self, path: &Path) -> PendingDecode {
        let (tx, rx) = mpsc::channel();
        let path: PathBuf = path.to_path_buf();
        let spawned = thread::Builder::new().name("logo-decode".to_string()).spawn({
            let tx = tx.clone();
            move || {
                let started = Instant::now();
                let result = decode_file(&path);
                debug!(
                    path = %path.display(),
                    ok = result.is_ok(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "logo decode finished"
                );
                // Receiver gone means the effect moved on; nothing to do.
                if tx.send(result).is_err() {
                    debug!("logo decode result discarded");
                }
            }
        });
        if let Err(e) = spawned {
            warn!(error = %e, "could not start decode thread");
            let _ = tx.send(Err(Error::Decode(format!("spawn decoder: {e}"))));
        }
        PendingDecode::from_channel(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::{Duration, Instant};

    fn wait(pending: &PendingDecode) -> DecodePoll {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match pending.poll() {
                DecodePoll::Pending if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5))
                }
                other => return other,
            }
        }
    }

    #[test]
    fn threaded_loader_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(6, 4, Rgba([1, 2, 3, 200])).save(&path).unwrap();

        match wait(&ThreadedLoader.load(&path)) {
            DecodePoll::Loaded(img) => {
                assert_eq!(img.dimensions(), (6, 4));
                assert_eq!(img.get_pixel(0, 0)[3], 200);
            }
            DecodePoll::Failed(e) => panic!("decode failed: {e}"),
            DecodePoll::Pending => panic!("decode timed out"),
        }
    }

    #[test]
    fn missing_file_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pending = ThreadedLoader.load(&dir.path().join("nope.png"));
        assert!(matches!(wait(&pending), DecodePoll::Failed(Error::Decode(_))));
    }

    #[test]
    fn dropped_sender_counts_as_failure() {
        let (tx, rx) = mpsc::channel::<Result<RgbaImage>>();
        let pending = PendingDecode::from_channel(rx);
        assert!(matches!(pending.poll(), DecodePoll::Pending));
        drop(tx);
        assert!(matches!(pending.poll(), DecodePoll::Failed(_)));
    }
}
