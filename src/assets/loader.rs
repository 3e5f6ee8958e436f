//! Cooperative texture loading
//!
//! Every request becomes a future on a single-threaded [`LocalPool`]. A load
//! reads one chunk of its file per frame tick, then decodes and hands the
//! image back over a channel. [`AssetLoader::pump`] runs once per frame,
//! advances every load by one tick and applies whatever finished.

use std::{
    cell::RefCell,
    collections::HashMap,
    fs::File,
    future::Future,
    io::Read,
    path::{Path, PathBuf},
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll, Waker},
};

use futures::{
    channel::mpsc,
    executor::{LocalPool, LocalSpawner},
    task::LocalSpawnExt,
};
use log::{debug, error, info};

use super::{TextureImage, TextureRequest};
use crate::{
    error::{Result, SceneError},
    gfx::scene::Scene,
};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Handle of an in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadId(u64);

#[derive(Debug, Clone)]
pub enum LoadEvent {
    Progress { id: LoadId, loaded: u64, total: u64 },
    Loaded { id: LoadId, image: Arc<TextureImage> },
    Failed { id: LoadId, error: SceneError },
}

/// Outcome of one [`AssetLoader::pump`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Textures that reached their target this tick
    pub applied: usize,
    pub failed: usize,
    /// Progress events received this tick
    pub progressed: usize,
    /// Loads still waiting for data after this tick
    pub in_flight: usize,
}

type TickQueue = Rc<RefCell<Vec<Waker>>>;

struct PendingLoad {
    path: PathBuf,
    request: TextureRequest,
    /// Bytes read so far and file size
    progress: (u64, u64),
}

/// Resolves on the next [`AssetLoader::pump`]
struct NextTick {
    ticks: TickQueue,
    parked: bool,
}

impl Future for NextTick {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.parked {
            return Poll::Ready(());
        }
        self.parked = true;
        self.ticks.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}

pub struct AssetLoader {
    root: PathBuf,
    chunk_size: usize,
    pool: LocalPool,
    spawner: LocalSpawner,
    ticks: TickQueue,
    events_tx: mpsc::UnboundedSender<LoadEvent>,
    events_rx: mpsc::UnboundedReceiver<LoadEvent>,
    pending: HashMap<LoadId, PendingLoad>,
    next_id: u64,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>, chunk_size: usize) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let (events_tx, events_rx) = mpsc::unbounded();
        Self {
            root: root.into(),
            chunk_size: chunk_size.max(1),
            pool,
            spawner,
            ticks: Rc::new(RefCell::new(Vec::new())),
            events_tx,
            events_rx,
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts loading `request`; nothing is read until the next pump
    pub fn request(&mut self, request: TextureRequest) -> Result<LoadId> {
        let id = LoadId(self.next_id);
        self.next_id += 1;

        let path = self.root.join(&request.path);
        let task = load_texture(
            id,
            path.clone(),
            self.chunk_size,
            self.ticks.clone(),
            self.events_tx.clone(),
        );
        self.spawner
            .spawn_local(task)
            .map_err(|e| SceneError::asset(&path, e))?;

        debug!("Queued texture load {} -> '{}'", path.display(), request.target.material());
        self.pending.insert(
            id,
            PendingLoad {
                path,
                request,
                progress: (0, 0),
            },
        );
        Ok(id)
    }

    /// Bytes read and total size of a load that has not finished yet
    pub fn progress(&self, id: LoadId) -> Option<(u64, u64)> {
        self.pending.get(&id).map(|load| load.progress)
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advances every load by one tick and applies finished textures
    ///
    /// Failures are logged and leave their target untouched.
    pub fn pump(&mut self, scene: &mut Scene) -> PumpReport {
        let parked = std::mem::take(&mut *self.ticks.borrow_mut());
        for waker in parked {
            waker.wake();
        }
        self.pool.run_until_stalled();

        let mut report = PumpReport::default();
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                LoadEvent::Progress { id, loaded, total } => {
                    report.progressed += 1;
                    if let Some(load) = self.pending.get_mut(&id) {
                        load.progress = (loaded, total);
                        let percent = if total > 0 { loaded * 100 / total } else { 0 };
                        debug!("{}: {}% loaded", load.path.display(), percent);
                    }
                }
                LoadEvent::Loaded { id, image } => {
                    let Some(PendingLoad { path, request, .. }) = self.pending.remove(&id) else {
                        continue;
                    };
                    match scene.apply_texture(&request.target, image) {
                        Ok(true) => {
                            info!(
                                "Applied texture {} to '{}'",
                                path.display(),
                                request.target.material()
                            );
                            report.applied += 1;
                        }
                        Ok(false) => {
                            debug!("Texture {} already bound, skipped", path.display());
                            report.applied += 1;
                        }
                        Err(e) => {
                            error!("Cannot apply texture {}: {}", path.display(), e);
                            report.failed += 1;
                        }
                    }
                }
                LoadEvent::Failed { id, error } => {
                    self.pending.remove(&id);
                    error!("{}", error);
                    report.failed += 1;
                }
            }
        }

        report.in_flight = self.pending.len();
        report
    }
}

async fn load_texture(
    id: LoadId,
    path: PathBuf,
    chunk_size: usize,
    ticks: TickQueue,
    events: mpsc::UnboundedSender<LoadEvent>,
) {
    let result = read_in_chunks(id, &path, chunk_size, &ticks, &events)
        .await
        .and_then(|bytes| TextureImage::decode(&path, &bytes));

    let event = match result {
        Ok(image) => LoadEvent::Loaded {
            id,
            image: Arc::new(image),
        },
        Err(error) => LoadEvent::Failed { id, error },
    };
    // receiver only goes away with the loader itself
    let _ = events.unbounded_send(event);
}

async fn read_in_chunks(
    id: LoadId,
    path: &Path,
    chunk_size: usize,
    ticks: &TickQueue,
    events: &mpsc::UnboundedSender<LoadEvent>,
) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| SceneError::asset(path, e))?;
    let total = file.metadata().map(|m| m.len()).unwrap_or(0);

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let read = file.read(&mut chunk).map_err(|e| SceneError::asset(path, e))?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        let _ = events.unbounded_send(LoadEvent::Progress {
            id,
            loaded: bytes.len() as u64,
            total,
        });
        NextTick {
            ticks: ticks.clone(),
            parked: false,
        }
        .await;
    }
    Ok(bytes)
}
