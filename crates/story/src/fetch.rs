//! Asynchronous text fetches bridged into the ECS.
//!
//! Native builds read the file on the `IoTaskPool`; wasm builds use the
//! browser `fetch` API and hand the result back through a shared slot. In
//! both cases systems call [`PendingFetch::poll`] once per frame until it
//! yields a result. Fetches are never cancelled.

use crate::error::LoadError;

#[cfg(not(target_arch = "wasm32"))]
use bevy::tasks::{block_on, IoTaskPool, Task, TaskPool};

#[cfg(target_arch = "wasm32")]
use std::sync::{Arc, Mutex};

/// One in-flight text fetch.
pub struct PendingFetch {
    path: String,
    #[cfg(not(target_arch = "wasm32"))]
    task: Task<Result<String, LoadError>>,
    #[cfg(target_arch = "wasm32")]
    slot: Arc<Mutex<Option<Result<String, LoadError>>>>,
}

impl std::fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFetch").field("path", &self.path).finish()
    }
}

impl PendingFetch {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Take the result if the fetch has finished.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn poll(&mut self) -> Option<Result<String, LoadError>> {
        block_on(futures_lite::future::poll_once(&mut self.task))
    }

    /// Take the result if the fetch has finished.
    #[cfg(target_arch = "wasm32")]
    pub fn poll(&mut self) -> Option<Result<String, LoadError>> {
        self.slot.lock().ok()?.take()
    }
}

/// Start fetching `path` as text.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_fetch(path: String) -> PendingFetch {
    let pool = IoTaskPool::get_or_init(TaskPool::new);
    let task_path = path.clone();
    let task = pool.spawn(async move {
        std::fs::read_to_string(&task_path).map_err(|source| LoadError::Io {
            path: task_path,
            source,
        })
    });
    PendingFetch { path, task }
}

/// Start fetching `path` as text.
#[cfg(target_arch = "wasm32")]
pub fn spawn_fetch(path: String) -> PendingFetch {
    let slot = Arc::new(Mutex::new(None));
    let writer = slot.clone();
    let url = path.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = web::fetch_text(&url).await.map_err(|message| LoadError::Http {
            path: url.clone(),
            message,
        });
        if let Ok(mut guard) = writer.lock() {
            *guard = Some(result);
        }
    });
    PendingFetch { path, slot }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    pub(super) async fn fetch_text(url: &str) -> Result<String, String> {
        let window = web_sys::window().ok_or_else(|| "window not available".to_string())?;
        let response_value = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| format!("fetch failed: {:?}", e))?;

        let response: web_sys::Response = response_value
            .dyn_into()
            .map_err(|_| "failed to cast fetch response".to_string())?;

        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }

        let text_promise = response
            .text()
            .map_err(|e| format!("response.text() failed: {:?}", e))?;
        let text_value = JsFuture::from(text_promise)
            .await
            .map_err(|e| format!("await response text failed: {:?}", e))?;
        text_value
            .as_string()
            .ok_or_else(|| "response text was not a string".to_string())
    }
}

/// Several fetches that succeed together or fail on the first error.
#[derive(Debug)]
pub struct FetchBatch {
    pending: Vec<Option<PendingFetch>>,
    done: Vec<Option<String>>,
}

impl FetchBatch {
    pub fn spawn(paths: Vec<String>) -> Self {
        let done = vec![None; paths.len()];
        let pending = paths.into_iter().map(|p| Some(spawn_fetch(p))).collect();
        Self { pending, done }
    }

    /// `Some(Ok(texts))` in request order once every fetch succeeded,
    /// `Some(Err(_))` as soon as any fetch fails, `None` while waiting.
    pub fn poll(&mut self) -> Option<Result<Vec<String>, LoadError>> {
        for (slot, done) in self.pending.iter_mut().zip(self.done.iter_mut()) {
            let Some(fetch) = slot else {
                continue;
            };
            match fetch.poll() {
                Some(Ok(text)) => {
                    *done = Some(text);
                    *slot = None;
                }
                Some(Err(e)) => {
                    *slot = None;
                    return Some(Err(e));
                }
                None => {}
            }
        }
        if self.done.iter().all(Option::is_some) {
            Some(Ok(self.done.iter_mut().filter_map(Option::take).collect()))
        } else {
            None
        }
    }
}
