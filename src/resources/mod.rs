//! Loading of the room's external assets.
//!
//! In the browser assets are fetched from `<origin>/assets/`. Natively the
//! working directory's `assets/` is searched first, then the copy `build.rs`
//! leaves in `OUT_DIR` (exported as `PORTAL_ASSETS_DIR`), so the binary also
//! finds them when started from elsewhere.

pub mod model;

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{data_structures::texture::Texture, error::PortalError};

pub use model::load_model_gltf;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page has no origin"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

/// Directories searched for assets, in order.
#[cfg(not(target_arch = "wasm32"))]
pub fn asset_dirs() -> [PathBuf; 2] {
    [
        Path::new("./").join("assets"),
        PathBuf::from(env!("PORTAL_ASSETS_DIR")),
    ]
}

/// Read `file_name` from the first of `dirs` that has it.
#[cfg(not(target_arch = "wasm32"))]
async fn read_first(dirs: &[PathBuf], file_name: &str) -> anyhow::Result<Vec<u8>> {
    for dir in dirs {
        let path = dir.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(data) => return Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::trace!("{} not found", path.display());
            }
            Err(e) => return Err(e).with_context(|| format!("could not read {}", path.display())),
        }
    }
    let searched = dirs
        .iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    anyhow::bail!("{file_name} not found in {searched}")
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = read_first(&asset_dirs(), file_name).await?;

    Ok(data)
}

/// Load and upload the baked colour texture.
pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<Texture, PortalError> {
    let asset_error = |source| PortalError::AssetLoad {
        path: file_name.to_string(),
        source,
    };
    let data = load_binary(file_name).await.map_err(asset_error)?;
    let texture = Texture::from_bytes(device, queue, &data, file_name).map_err(asset_error)?;
    log::info!("loaded texture {file_name}");
    Ok(texture)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn build_copy_is_searched_after_the_working_directory() {
        let [local, built] = asset_dirs();
        assert_eq!(local, Path::new("./assets"));
        assert_eq!(built, Path::new(env!("PORTAL_ASSETS_DIR")));
        assert!(built.starts_with(env!("OUT_DIR")));
    }

    #[tokio::test]
    async fn falls_back_to_the_second_directory() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("baked.jpg"), b"built").unwrap();

        let dirs = [first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(read_first(&dirs, "baked.jpg").await.unwrap(), b"built");
    }

    #[tokio::test]
    async fn first_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("room.glb"), b"local").unwrap();
        std::fs::write(second.path().join("room.glb"), b"built").unwrap();

        let dirs = [first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(read_first(&dirs, "room.glb").await.unwrap(), b"local");
    }

    #[tokio::test]
    async fn missing_everywhere_names_the_file() {
        let empty = tempfile::tempdir().unwrap();
        let err = read_first(&[empty.path().to_path_buf()], "gone.glb")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gone.glb"));
    }
}
