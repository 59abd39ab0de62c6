//! Background image decoding for the gallery pages.
//!
//! Requests go to a small pool of worker threads over a bounded flume queue;
//! decoded RGBA buffers come back on an async channel the GTK main loop polls.

use std::io::{BufRead, Seek};
use std::path::Path;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, GenericImageView, ImageFormat, ImageReader};
use tracing::{debug, warn};

use lightbox::ImageSource;

/// Maximum number of pending decode requests.
const MAX_QUEUE_SIZE: usize = 64;

/// Read and decode `path`. Animated GIFs yield their first frame.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .with_context(|| format!("Cannot open {}", path.display()))?;

    match reader.format() {
        Some(ImageFormat::Gif) => first_gif_frame(reader.into_inner())
            .with_context(|| format!("Cannot decode GIF {}", path.display())),
        _ => reader
            .decode()
            .with_context(|| format!("Cannot decode {}", path.display())),
    }
}

fn first_gif_frame<R: BufRead + Seek>(source: R) -> Result<DynamicImage> {
    let frame = GifDecoder::new(source)?
        .into_frames()
        .next()
        .ok_or_else(|| anyhow!("GIF has no frames"))??;
    Ok(DynamicImage::ImageRgba8(frame.into_buffer()))
}

/// RGBA pixels ready to be uploaded as a texture.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub key: String,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode `path` so its longest side is at most `max_size` pixels.
pub fn decode_for_viewport(key: String, path: &Path, max_size: u32) -> Result<DecodedImage> {
    let img = open_image(path)?;
    let (orig_w, orig_h) = img.dimensions();
    let longest = orig_w.max(orig_h).max(1);
    let max_size = max_size.max(1);

    let prepared = if longest > max_size {
        let scale = max_size as f32 / longest as f32;
        let new_w = ((orig_w as f32 * scale) as u32).max(1);
        let new_h = ((orig_h as f32 * scale) as u32).max(1);
        img.resize_exact(new_w, new_h, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let (width, height) = prepared.dimensions();
    Ok(DecodedImage {
        key,
        data: prepared.to_rgba8().into_raw(),
        width: width.max(1),
        height: height.max(1),
    })
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub source: ImageSource,
    pub max_size: u32,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(DecodedImage),
    Failed { key: String, error: String },
}

fn load(request: &LoadRequest) -> Result<DecodedImage> {
    let key = request.source.key();
    let Some(path) = request.source.local_path() else {
        bail!("Only local images can be decoded: {}", key);
    };
    decode_for_viewport(key, &path, request.max_size)
}

/// Decode worker pool.
///
/// Workers are detached: dropping the loader closes the request queue and
/// each worker exits after the decode it is running, without blocking the
/// caller.
pub struct ImageLoader {
    request_tx: flume::Sender<LoadRequest>,
    result_rx: async_channel::Receiver<LoadOutcome>,
}

impl ImageLoader {
    pub fn new(worker_count: usize) -> Result<Self> {
        let (request_tx, request_rx) = flume::bounded::<LoadRequest>(MAX_QUEUE_SIZE);
        let (result_tx, result_rx) = async_channel::unbounded::<LoadOutcome>();

        for id in 0..worker_count.max(1) {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            thread::Builder::new()
                .name(format!("lightbox-decode-{id}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let outcome = match load(&request) {
                            Ok(decoded) => LoadOutcome::Loaded(decoded),
                            Err(err) => {
                                warn!(error = ?err, "Image decode failed");
                                LoadOutcome::Failed {
                                    key: request.source.key(),
                                    error: format!("{err:#}"),
                                }
                            }
                        };
                        if tx.send_blocking(outcome).is_err() {
                            break;
                        }
                    }
                    debug!("Decode worker {} exiting", id);
                })
                .context("Failed to spawn decode worker")?;
        }

        Ok(Self {
            request_tx,
            result_rx,
        })
    }

    /// Queue a decode. Returns `false` if the queue is full.
    pub fn request(&self, source: ImageSource, max_size: u32) -> bool {
        match self.request_tx.try_send(LoadRequest { source, max_size }) {
            Ok(()) => true,
            Err(err) => {
                debug!("Decode request dropped: {}", err);
                false
            }
        }
    }

    pub fn results(&self) -> async_channel::Receiver<LoadOutcome> {
        self.result_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_decode_keeps_small_images() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.png");
        write_png(&path, 4, 2);

        let decoded = decode_for_viewport("k".into(), &path, 100).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
        assert_eq!(decoded.data.len(), 4 * 2 * 4);
        assert_eq!(&decoded.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_downscales_longest_side() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.png");
        write_png(&path, 200, 50);

        let decoded = decode_for_viewport("k".into(), &path, 100).unwrap();
        assert_eq!((decoded.width, decoded.height), (100, 25));
    }

    #[test]
    fn test_decode_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(decode_for_viewport("k".into(), &dir.path().join("nope.png"), 100).is_err());
    }

    #[test]
    fn test_loader_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, 8, 8);

        let loader = ImageLoader::new(1).unwrap();
        let results = loader.results();
        assert!(loader.request(ImageSource::file(&path), 64));
        assert!(loader.request(ImageSource::uri("https://example.com/b.png"), 64));

        let mut loaded = 0;
        let mut failed = 0;
        for _ in 0..2 {
            match results.recv_blocking().unwrap() {
                LoadOutcome::Loaded(img) => {
                    assert_eq!(img.key, path.display().to_string());
                    loaded += 1;
                }
                LoadOutcome::Failed { key, .. } => {
                    assert_eq!(key, "https://example.com/b.png");
                    failed += 1;
                }
            }
        }
        assert_eq!((loaded, failed), (1, 1));
    }

    #[test]
    fn test_dropping_loader_releases_workers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.png");
        write_png(&path, 16, 16);

        let loader = ImageLoader::new(2).unwrap();
        let results = loader.results();
        assert!(loader.request(ImageSource::file(&path), 64));
        drop(loader);

        // The queued decode still completes, then every worker hangs up.
        assert!(matches!(
            results.recv_blocking(),
            Ok(LoadOutcome::Loaded(_))
        ));
        assert!(results.recv_blocking().is_err());
    }
}
