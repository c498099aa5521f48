//! Sheet loading: byte sources and the single-shot load future.
//!
//! Loading is split from installation so hosts never hold the engine
//! across an await point:
//! 1. [`SpriteEngine::begin_load`](crate::SpriteEngine::begin_load) marks a load in flight
//! 2. [`load_sheet`] reads and decodes the bytes
//! 3. [`SpriteEngine::finish_load`](crate::SpriteEngine::finish_load) installs the result

use crate::{SheetResult, SpriteSheet};

/// Loading phase indicator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadingPhase {
    /// No load requested yet
    #[default]
    Idle,
    /// A load is in flight; renders are no-ops until a sheet exists
    Loading,
    /// The most recent load installed a sheet
    Ready,
    /// The most recent load failed; any earlier sheet is still in place
    Failed,
}

/// Trait for async sheet byte providers.
///
/// Implement this trait to provide image bytes from your specific I/O
/// mechanism (fetch API, filesystem, embedded assets, etc.)
///
/// No `Send` bounds, so it works in both native and WASM (single-threaded)
/// contexts.
pub trait SheetSource {
    /// Read the raw encoded image at `path`.
    fn read_sheet_bytes(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = SheetResult<Vec<u8>>>;
}

/// Read and decode a sheet from a source.
pub async fn load_sheet<S: SheetSource>(source: &S, path: &str) -> SheetResult<SpriteSheet> {
    let bytes = source.read_sheet_bytes(path).await?;
    tracing::debug!(path, bytes = bytes.len(), "decoding sprite sheet");
    SpriteSheet::decode(&bytes)
}

/// Reads sheets from the local filesystem.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug, Default)]
pub struct FsSheetSource;

#[cfg(not(target_arch = "wasm32"))]
impl SheetSource for FsSheetSource {
    async fn read_sheet_bytes(&self, path: &str) -> SheetResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| crate::SheetError::unreadable(format!("{}: {}", path, e)))
    }
}

/// Fetch-based loading for the browser.
#[cfg(feature = "web")]
pub mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    use super::SheetSource;
    use crate::{SheetError, SheetResult};

    /// Reads sheets over HTTP with `window.fetch`.
    #[derive(Clone, Debug, Default)]
    pub struct FetchSheetSource;

    impl SheetSource for FetchSheetSource {
        async fn read_sheet_bytes(&self, path: &str) -> SheetResult<Vec<u8>> {
            let window =
                web_sys::window().ok_or_else(|| SheetError::unreadable("No window available"))?;
            let response = JsFuture::from(window.fetch_with_str(path))
                .await
                .map_err(|_| SheetError::unreadable(format!("Failed to fetch {}", path)))?
                .dyn_into::<web_sys::Response>()
                .map_err(|_| SheetError::unreadable("Failed to cast to Response"))?;
            if !response.ok() {
                return Err(SheetError::unreadable(format!(
                    "Fetching {} returned HTTP {}",
                    path,
                    response.status()
                )));
            }

            let buffer = response
                .array_buffer()
                .map_err(|_| SheetError::unreadable("Failed to read response body"))?;
            let buffer = JsFuture::from(buffer)
                .await
                .map_err(|_| SheetError::unreadable("Failed to read response body"))?;
            Ok(js_sys::Uint8Array::new(&buffer).to_vec())
        }
    }
}
