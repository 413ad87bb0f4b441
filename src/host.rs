//! Boundary between the editor core and whatever presents it.
//!
//! The core never opens windows or touches the filesystem on its own. It
//! asks a [`Host`] for paths and confirmations and reads and writes files
//! through [`FileIo`].

use std::io;
use std::path::{Path, PathBuf};

/// Byte-level file access.
///
/// The default methods go straight to `std::fs`.
pub trait FileIo {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }
}

/// Plain filesystem access.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FileIo for StdFs {}

/// What kind of file an open dialog should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    /// Sprite animation documents.
    Document,
    /// Atlas images.
    Image,
    /// Sprite-packer manifests.
    Manifest,
}

impl FileFilter {
    /// Get the display name for this filter.
    pub fn name(&self) -> &'static str {
        match self {
            FileFilter::Document => "Sprite File",
            FileFilter::Image => "Image",
            FileFilter::Manifest => "TexturePacker JSON",
        }
    }

    /// File extensions offered by this filter.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileFilter::Document | FileFilter::Manifest => &["json"],
            FileFilter::Image => &[
                "png", "qoi", "jpg", "jpeg", "bmp", "gif", "tga", "tiff", "tif", "webp",
            ],
        }
    }
}

/// Interactive services the editor needs from its host.
///
/// Every request may be declined; `None` or `false` cancels the operation
/// that asked.
pub trait Host: FileIo {
    /// Ask the user for a file to open.
    fn request_open_path(&self, filter: FileFilter) -> Option<PathBuf>;

    /// Ask the user where to save, suggesting `default_name`.
    fn request_save_path(&self, default_name: &str) -> Option<PathBuf>;

    /// Ask a yes/no question.
    fn request_confirmation(&self, title: &str, message: &str) -> bool;
}

/// Native dialogs via `rfd`.
#[cfg(feature = "dialogs")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogHost;

#[cfg(feature = "dialogs")]
impl FileIo for DialogHost {}

#[cfg(feature = "dialogs")]
impl Host for DialogHost {
    fn request_open_path(&self, filter: FileFilter) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter(filter.name(), filter.extensions())
            .pick_file()
    }

    fn request_save_path(&self, default_name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter(FileFilter::Document.name(), FileFilter::Document.extensions())
            .set_file_name(default_name)
            .save_file()
    }

    fn request_confirmation(&self, title: &str, message: &str) -> bool {
        let answer = rfd::MessageDialog::new()
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        matches!(answer, rfd::MessageDialogResult::Yes)
    }
}
