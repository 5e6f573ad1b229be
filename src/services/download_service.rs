// src/services/download_service.rs
//
// Artifact downloads, split over two lanes:
//
//   queued     - binary archives, one at a time in submission order, so
//                large transfers never compete for bandwidth
//   concurrent - logo and gallery images, small and independent,
//                spawned freely
//
// Both lanes hand back a DownloadHandle that resolves to the final path.
// Bodies are streamed chunk by chunk into `<name>.part` while the hash
// is computed incrementally, and the file is renamed only after the
// hash check passes, so a crash mid-write never leaves a corrupt
// artifact under the real name.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    validate_modfile, GalleryImageVersion, LogoVersion, ModBinaryStatus, ModProfile, Modfile,
};
use crate::error::{AppError, AppResult};
use crate::events::{BinaryDownloaded, EventBus, ModGalleryImageUpdated, ModLogoUpdated};
use crate::integrations::CatalogClient;
use crate::repositories::ModRepository;
use crate::services::manifest_store::ManifestStore;

/// Chunked byte source. Split out from the service so lane behavior can
/// be tested without a network.
#[async_trait]
pub trait Transfer: Send + Sync {
    async fn open(&self, url: &str) -> AppResult<Box<dyn TransferStream>>;
}

/// One open transfer. `next_chunk` returns `Ok(None)` once the body is
/// exhausted.
#[async_trait]
pub trait TransferStream: Send {
    async fn next_chunk(&mut self) -> AppResult<Option<Vec<u8>>>;
}

pub struct HttpTransfer {
    http: Client,
}

impl HttpTransfer {
    pub fn new() -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(AppError::Network)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn open(&self, url: &str) -> AppResult<Box<dyn TransferStream>> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Other(format!(
                "download source returned status {} for {}",
                status, url
            )));
        }
        Ok(Box::new(HttpTransferStream { response }))
    }
}

struct HttpTransferStream {
    response: reqwest::Response,
}

#[async_trait]
impl TransferStream for HttpTransferStream {
    async fn next_chunk(&mut self) -> AppResult<Option<Vec<u8>>> {
        Ok(self.response.chunk().await?.map(|bytes| bytes.to_vec()))
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub source_url: String,
    pub destination: PathBuf,
    /// Lowercase hex hash to verify against, when the remote supplied one
    pub expected_hash: Option<String>,
}

/// Resolves once the associated transfer finishes, on either lane.
pub struct DownloadHandle {
    rx: oneshot::Receiver<AppResult<PathBuf>>,
}

impl DownloadHandle {
    fn ready(result: AppResult<PathBuf>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    pub async fn completed(self) -> AppResult<PathBuf> {
        self.rx
            .await
            .map_err(|_| AppError::Other("download task ended before reporting".to_string()))?
    }
}

type Job = Pin<Box<dyn Future<Output = AppResult<PathBuf>> + Send>>;

/// Single-worker lane. Jobs run to completion in submission order.
struct QueuedLane {
    tx: mpsc::UnboundedSender<(Job, oneshot::Sender<AppResult<PathBuf>>)>,
}

impl QueuedLane {
    /// Spawns the worker task; must be called inside a Tokio runtime.
    fn new() -> Self {
        let (tx, mut rx) =
            mpsc::unbounded_channel::<(Job, oneshot::Sender<AppResult<PathBuf>>)>();
        tokio::spawn(async move {
            while let Some((job, done)) = rx.recv().await {
                // The receiver may have been dropped; the transfer still
                // ran and its artifact is on disk either way.
                let _ = done.send(job.await);
            }
        });
        Self { tx }
    }

    fn submit(&self, job: Job) -> DownloadHandle {
        let (done, rx) = oneshot::channel();
        if self.tx.send((job, done)).is_err() {
            return DownloadHandle::ready(Err(AppError::Other(
                "download worker is gone".to_string(),
            )));
        }
        DownloadHandle { rx }
    }
}

/// Fan-out lane. Every job gets its own task.
struct ConcurrentLane;

impl ConcurrentLane {
    fn submit(&self, job: Job) -> DownloadHandle {
        let (done, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = done.send(job.await);
        });
        DownloadHandle { rx }
    }
}

/// Stream, hash, land. Each chunk feeds the hasher as it is written, and
/// nothing is left on disk when the transfer breaks off or the content
/// hash (when known) does not match.
async fn run_transfer(transfer: &dyn Transfer, request: DownloadRequest) -> AppResult<PathBuf> {
    let mut stream = transfer.open(&request.source_url).await?;

    if let Some(parent) = request.destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut part = request.destination.clone().into_os_string();
    part.push(".part");
    let part = PathBuf::from(part);

    let mut hasher = Sha256::new();
    let streamed: AppResult<()> = async {
        let mut file = std::fs::File::create(&part)?;
        while let Some(chunk) = stream.next_chunk().await? {
            hasher.update(&chunk);
            file.write_all(&chunk)?;
        }
        file.flush()?;
        Ok(())
    }
    .await;
    if let Err(e) = streamed {
        let _ = std::fs::remove_file(&part);
        return Err(e);
    }

    if let Some(expected) = &request.expected_hash {
        let actual = format!("{:x}", hasher.finalize());
        if &actual != expected {
            let _ = std::fs::remove_file(&part);
            return Err(AppError::Integrity {
                path: request.destination,
                expected: expected.clone(),
                actual,
            });
        }
    }

    std::fs::rename(&part, &request.destination)?;
    Ok(request.destination)
}

pub enum ImageFetch {
    /// Already on disk and indexed; no transfer started.
    Cached(PathBuf),
    Downloading(DownloadHandle),
}

pub struct DownloadService {
    transfer: Arc<dyn Transfer>,
    client: Arc<dyn CatalogClient>,
    mod_repo: Arc<dyn ModRepository>,
    manifest: Arc<ManifestStore>,
    bus: Arc<EventBus>,
    queued: QueuedLane,
    concurrent: ConcurrentLane,
}

impl DownloadService {
    /// Must be called inside a Tokio runtime (spawns the queued worker).
    pub fn new(
        transfer: Arc<dyn Transfer>,
        client: Arc<dyn CatalogClient>,
        mod_repo: Arc<dyn ModRepository>,
        manifest: Arc<ManifestStore>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            transfer,
            client,
            mod_repo,
            manifest,
            bus,
            queued: QueuedLane::new(),
            concurrent: ConcurrentLane,
        }
    }

    /// Queue a binary archive download. Resolves immediately when the
    /// artifact is already on disk.
    pub fn download_binary(&self, modfile: &Modfile) -> DownloadHandle {
        let destination = self.mod_repo.binary_path(modfile.mod_id, modfile.id);
        if destination.exists() {
            log::debug!("binary for modfile {} already on disk", modfile.id);
            return DownloadHandle::ready(Ok(destination));
        }

        let request = DownloadRequest {
            source_url: modfile.download_url.clone(),
            destination,
            expected_hash: modfile.expected_hash(),
        };
        let transfer = Arc::clone(&self.transfer);
        let bus = Arc::clone(&self.bus);
        let (mod_id, modfile_id) = (modfile.mod_id, modfile.id);

        self.queued.submit(Box::pin(async move {
            let path = run_transfer(transfer.as_ref(), request).await?;
            log::info!("binary for modfile {} landed at {}", modfile_id, path.display());
            bus.emit(BinaryDownloaded::new(mod_id, modfile_id, path.clone()));
            Ok(path)
        }))
    }

    /// Fetch one logo size, image index first. The index is only updated
    /// after a transfer succeeds.
    pub fn fetch_logo(&self, profile: &ModProfile, version: LogoVersion) -> ImageFetch {
        let url = profile.logo.url_for(version);
        if let Some(path) = self.manifest.cached_image(url) {
            return ImageFetch::Cached(path);
        }

        let request = DownloadRequest {
            source_url: url.to_string(),
            destination: self.mod_repo.logo_path(profile.id, version),
            expected_hash: None,
        };
        let transfer = Arc::clone(&self.transfer);
        let manifest = Arc::clone(&self.manifest);
        let bus = Arc::clone(&self.bus);
        let mod_id = profile.id;
        let url = url.to_string();

        let handle = self.concurrent.submit(Box::pin(async move {
            let path = run_transfer(transfer.as_ref(), request).await?;
            manifest.record_image(&url, &path)?;
            bus.emit(ModLogoUpdated::new(mod_id, version.to_string(), path.clone()));
            Ok(path)
        }));
        ImageFetch::Downloading(handle)
    }

    /// Fetch one gallery image size, image index first. The profile must
    /// carry a locator for the file name.
    pub fn fetch_gallery_image(
        &self,
        profile: &ModProfile,
        file_name: &str,
        version: GalleryImageVersion,
    ) -> AppResult<ImageFetch> {
        let Some(locator) = profile.gallery_image(file_name) else {
            log::warn!(
                "mod {} has no gallery image named {}",
                profile.id,
                file_name
            );
            return Err(AppError::NotFound);
        };
        let url = locator.url_for(version);
        if let Some(path) = self.manifest.cached_image(url) {
            return Ok(ImageFetch::Cached(path));
        }

        let request = DownloadRequest {
            source_url: url.to_string(),
            destination: self.mod_repo.gallery_path(profile.id, version, file_name),
            expected_hash: None,
        };
        let transfer = Arc::clone(&self.transfer);
        let manifest = Arc::clone(&self.manifest);
        let bus = Arc::clone(&self.bus);
        let mod_id = profile.id;
        let url = url.to_string();
        let file_name = file_name.to_string();

        let handle = self.concurrent.submit(Box::pin(async move {
            let path = run_transfer(transfer.as_ref(), request).await?;
            manifest.record_image(&url, &path)?;
            bus.emit(ModGalleryImageUpdated::new(
                mod_id,
                file_name,
                version.to_string(),
                path.clone(),
            ));
            Ok(path)
        }));
        Ok(ImageFetch::Downloading(handle))
    }

    /// Start transfers for every profile whose logo is not yet indexed.
    pub fn download_missing_logos(
        &self,
        profiles: &[ModProfile],
        version: LogoVersion,
    ) -> Vec<DownloadHandle> {
        profiles
            .iter()
            .filter_map(|profile| match self.fetch_logo(profile, version) {
                ImageFetch::Cached(_) => None,
                ImageFetch::Downloading(handle) => Some(handle),
            })
            .collect()
    }

    /// Modfile record, disk first. A remote fetch is persisted before it
    /// is returned.
    pub async fn load_or_fetch_modfile(&self, mod_id: u64, modfile_id: u64) -> AppResult<Modfile> {
        if let Some(record) = self.mod_repo.load_modfile(mod_id, modfile_id)? {
            return Ok(record);
        }
        let modfile = self.client.get_modfile(mod_id, modfile_id).await?;
        validate_modfile(&modfile).map_err(AppError::Domain)?;
        self.mod_repo.save_modfile(&modfile)?;
        Ok(modfile)
    }

    pub fn binary_status(&self, profile: &ModProfile) -> ModBinaryStatus {
        self.mod_repo.binary_status(profile)
    }

    pub fn current_binary_path(&self, profile: &ModProfile) -> Option<PathBuf> {
        self.mod_repo.current_binary_path(profile)
    }

    pub fn delete_binaries(&self, mod_id: u64) -> AppResult<()> {
        self.mod_repo.delete_binaries(mod_id)
    }
}
