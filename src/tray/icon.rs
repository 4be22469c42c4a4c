//! Icon resources: path resolution, decoding, and named icon states

use crate::error::{AppError, Result};
use image::GenericImageView;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// States the application shows through the tray icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    Idle,
    Busy,
    Disabled,
}

impl IconState {
    /// Icon for the application's flags; paused wins over a running job
    pub fn for_status(paused: bool, busy: bool) -> Self {
        if paused {
            IconState::Disabled
        } else if busy {
            IconState::Busy
        } else {
            IconState::Idle
        }
    }
}

impl fmt::Display for IconState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconState::Idle => write!(f, "Idle"),
            IconState::Busy => write!(f, "Busy"),
            IconState::Disabled => write!(f, "Disabled"),
        }
    }
}

/// Icon file per [`IconState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSet {
    #[serde(default = "default_idle")]
    pub idle: PathBuf,

    #[serde(default = "default_busy")]
    pub busy: PathBuf,

    #[serde(default = "default_disabled")]
    pub disabled: PathBuf,
}

fn default_idle() -> PathBuf {
    PathBuf::from("resources/icon_idle.png")
}

fn default_busy() -> PathBuf {
    PathBuf::from("resources/icon_busy.png")
}

fn default_disabled() -> PathBuf {
    PathBuf::from("resources/icon_disabled.png")
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            idle: default_idle(),
            busy: default_busy(),
            disabled: default_disabled(),
        }
    }
}

impl IconSet {
    pub fn path_for(&self, state: IconState) -> &Path {
        match state {
            IconState::Idle => &self.idle,
            IconState::Busy => &self.busy,
            IconState::Disabled => &self.disabled,
        }
    }
}

/// Decoded RGBA glyph
#[derive(Debug, Clone)]
pub struct IconImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl IconImage {
    /// Resolve and decode an icon file (PNG or ICO)
    pub fn load(path: &Path) -> Result<Self> {
        let resolved = resolve_icon_path(path)?;
        let img = image::open(&resolved).map_err(|e| {
            AppError::IconLoadFailure(format!("{}: {}", resolved.display(), e))
        })?;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(AppError::IconLoadFailure(format!(
                "{}: empty image {}x{}",
                resolved.display(),
                width,
                height
            )));
        }

        debug!("Decoded icon {:?} ({}x{})", resolved, width, height);
        Ok(Self {
            rgba: img.into_rgba8().into_raw(),
            width,
            height,
        })
    }
}

/// Find an icon file: the path as given first, then relative to the executable directory
pub fn resolve_icon_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(AppError::IconLoadFailure("empty icon path".to_string()));
    }
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    if path.is_relative() {
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            let candidate = exe_dir.join(path);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(AppError::IconLoadFailure(format!(
        "{}: icon file not found",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, size: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(size, size, image::Rgba([0, 200, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "icon_idle.png", 32);

        let icon = IconImage::load(&path).unwrap();
        assert_eq!((icon.width, icon.height), (32, 32));
        assert_eq!(icon.rgba.len(), 32 * 32 * 4);
        assert_eq!(&icon.rgba[..4], &[0, 200, 0, 255]);
    }

    #[test]
    fn test_load_high_dpi_icon() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "retina.png", 512);

        let icon = IconImage::load(&path).unwrap();
        assert_eq!((icon.width, icon.height), (512, 512));
        assert_eq!(icon.rgba.len(), 512 * 512 * 4);
    }

    #[test]
    fn test_load_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            IconImage::load(&path),
            Err(AppError::IconLoadFailure(_))
        ));
    }

    #[test]
    fn test_resolve_missing_and_empty() {
        assert!(resolve_icon_path(Path::new("")).is_err());
        assert!(resolve_icon_path(Path::new("definitely/not/here.png")).is_err());
    }

    #[test]
    fn test_state_for_status() {
        assert_eq!(IconState::for_status(false, false), IconState::Idle);
        assert_eq!(IconState::for_status(false, true), IconState::Busy);
        // A job finishing or starting while paused keeps the disabled icon
        assert_eq!(IconState::for_status(true, true), IconState::Disabled);
        assert_eq!(IconState::for_status(true, false), IconState::Disabled);
    }

    #[test]
    fn test_icon_set_paths() {
        let set = IconSet::default();
        assert_eq!(set.path_for(IconState::Idle), Path::new("resources/icon_idle.png"));
        assert_eq!(set.path_for(IconState::Busy), Path::new("resources/icon_busy.png"));
        assert_eq!(IconState::Disabled.to_string(), "Disabled");
    }
}
