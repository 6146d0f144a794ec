//! Batch driver: walks a target directory and crops every source image.
//!
//! Expected layout, one level of product folders under the target:
//!
//! ```text
//! target/
//!   <product>/
//!     PNG/                       source images
//!     Transparent_ Background/   source images
//!     Resized/                   <stem>_cropped.png outputs (created)
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::ImageFormat;
use tracing::{debug, error, info, warn};

use crate::engine::{self, CropOptions, CropResult};
use crate::error::{Error, Result};

/// Default padding for batch runs.
pub const DEFAULT_BATCH_PADDING: u32 = 700;

/// Source folder names searched inside each product folder.
///
/// `"Transparent_ Background"` is the literal name used by the photo
/// supplier, embedded space included.
pub const DEFAULT_SOURCE_FOLDERS: [&str; 2] = ["PNG", "Transparent_ Background"];

/// Output folder created inside each product folder.
pub const DEFAULT_OUTPUT_FOLDER: &str = "Resized";

/// Suffix appended to the source file stem.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_cropped";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Cropping parameters applied to every image.
    pub crop: CropOptions,
    /// Case-sensitive names of source folders inside each product folder.
    pub source_folders: Vec<String>,
    /// Name of the output folder inside each product folder.
    pub output_folder: String,
    /// Suffix appended to each output file stem.
    pub output_suffix: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            crop: CropOptions {
                padding: DEFAULT_BATCH_PADDING,
                ..CropOptions::default()
            },
            source_folders: DEFAULT_SOURCE_FOLDERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            output_folder: DEFAULT_OUTPUT_FOLDER.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

/// What happened to an image that was processed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Border removed; dimensions of the written image.
    Cropped {
        /// Output width in pixels.
        width: u32,
        /// Output height in pixels.
        height: u32,
    },
    /// No border found; the decoded image was written as-is.
    Unchanged {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Source image path.
    pub input: PathBuf,
    /// Destination path.
    pub output: PathBuf,
    /// Outcome, or the error that stopped this image.
    pub outcome: Result<Outcome>,
}

impl ProcessResult {
    /// Whether the output was written.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Results for one product folder.
#[derive(Debug)]
pub struct FolderReport {
    /// The product folder.
    pub folder: PathBuf,
    /// One entry per discovered image, in processing order.
    pub results: Vec<ProcessResult>,
    /// Folder-level failure (output folder or source listing).
    pub error: Option<Error>,
}

/// Results for a whole batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per product folder, sorted by name.
    pub folders: Vec<FolderReport>,
}

impl BatchReport {
    /// All per-image results across folders.
    pub fn results(&self) -> impl Iterator<Item = &ProcessResult> {
        self.folders.iter().flat_map(|f| f.results.iter())
    }

    /// Number of images that were cropped.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.results()
            .filter(|r| matches!(r.outcome, Ok(Outcome::Cropped { .. })))
            .count()
    }

    /// Number of images written without a crop.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.results()
            .filter(|r| matches!(r.outcome, Ok(Outcome::Unchanged { .. })))
            .count()
    }

    /// Number of images that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results().filter(|r| r.outcome.is_err()).count()
    }

    /// Number of folders that could not be processed.
    #[must_use]
    pub fn folder_errors(&self) -> usize {
        self.folders.iter().filter(|f| f.error.is_some()).count()
    }

    /// True when every image and folder succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.folder_errors() == 0
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg"),
        None => false,
    }
}

/// Build the output path `<output_dir>/<stem><suffix>.png`.
#[must_use]
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{stem}{suffix}.png"))
}

/// Generate a default output path beside the input.
///
/// Example: `"watch.jpg"` becomes `"watch_cropped.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    output_path_for(input, parent, DEFAULT_OUTPUT_SUFFIX)
}

/// List the supported images in the source folders of `folder`.
///
/// Missing source folders are skipped. Files are sorted by name within
/// each source folder, and folders are visited in the configured order.
///
/// # Errors
///
/// Returns [`Error::Io`] if an existing source folder cannot be read.
pub fn discover_images(folder: &Path, options: &BatchOptions) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for name in &options.source_folders {
        let source = folder.join(name);
        if !source.is_dir() {
            debug!(folder = %source.display(), "source folder absent, skipping");
            continue;
        }

        images.extend(
            list_entries(&source, fs::FileType::is_file)?
                .into_iter()
                .filter(|p| is_supported_image(p)),
        );
    }
    Ok(images)
}

/// Keep `item`, or log the error against `dir` and drop it.
fn ok_or_warn<T>(dir: &Path, item: std::io::Result<T>) -> Option<T> {
    item.map_err(|e| warn!(folder = %dir.display(), "skipping unreadable entry: {e}"))
        .ok()
}

/// Sorted paths of the entries in `dir` whose file type passes `keep`.
fn list_entries(dir: &Path, keep: fn(&fs::FileType) -> bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let Some(entry) = ok_or_warn(dir, entry) else {
            continue;
        };
        let Some(file_type) = ok_or_warn(dir, entry.file_type()) else {
            continue;
        };
        if keep(&file_type) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn crop_file(input: &Path, output: &Path, options: &CropOptions) -> Result<Outcome> {
    if !input.exists() {
        return Err(Error::FileNotFound(input.to_path_buf()));
    }

    info!(input = %input.display(), "opening image");
    let decoded = image::open(input).map_err(|source| Error::Decode {
        path: input.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (orig_w, orig_h) = rgba.dimensions();

    let started = Instant::now();
    let result = engine::crop(rgba, options)?;
    let (width, height) = result.image().dimensions();
    let outcome = match &result {
        CropResult::Cropped(_) => {
            info!(
                elapsed = ?started.elapsed(),
                "borders detected and cropped: {orig_w}x{orig_h} -> {width}x{height}"
            );
            Outcome::Cropped { width, height }
        }
        CropResult::Unchanged(_) => Outcome::Unchanged { width, height },
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    info!(output = %output.display(), "saving output");
    result
        .into_image()
        .save_with_format(output, ImageFormat::Png)
        .map_err(|source| Error::Encode {
            path: output.to_path_buf(),
            source,
        })?;

    Ok(outcome)
}

/// Process a single image file: load, crop, save as PNG.
///
/// Failures are captured in the returned [`ProcessResult`] and logged.
#[must_use]
pub fn process_file(input: &Path, output: &Path, options: &CropOptions) -> ProcessResult {
    let outcome = crop_file(input, output, options);
    if let Err(e) = &outcome {
        error!(input = %input.display(), "error processing image: {e}");
    }
    ProcessResult {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        outcome,
    }
}

/// Process every source image of one product folder.
///
/// Creates the output folder first, even when no images are found.
#[must_use]
pub fn process_folder(folder: &Path, options: &BatchOptions) -> FolderReport {
    let mut report = FolderReport {
        folder: folder.to_path_buf(),
        results: Vec::new(),
        error: None,
    };

    info!(folder = %folder.display(), "processing folder");

    let output_dir = folder.join(&options.output_folder);
    if !output_dir.exists() {
        if let Err(e) = fs::create_dir_all(&output_dir) {
            error!(folder = %output_dir.display(), "failed to create output folder: {e}");
            report.error = Some(e.into());
            return report;
        }
        info!(folder = %output_dir.display(), "created output folder");
    }

    let images = match discover_images(folder, options) {
        Ok(images) => images,
        Err(e) => {
            error!(folder = %folder.display(), "failed to list source images: {e}");
            report.error = Some(e);
            return report;
        }
    };

    if images.is_empty() {
        warn!(folder = %folder.display(), "no images found");
        return report;
    }

    let mut claimed = HashSet::new();
    for input in images {
        let output = output_path_for(&input, &output_dir, &options.output_suffix);
        if !claimed.insert(output.clone()) {
            warn!(
                input = %input.display(),
                output = %output.display(),
                "output name already used in this folder, overwriting"
            );
        }
        report
            .results
            .push(process_file(&input, &output, &options.crop));
    }

    report
}

/// Run the batch over every product folder directly under `target_dir`.
///
/// # Errors
///
/// Returns [`Error::FileNotFound`] if `target_dir` does not exist and
/// [`Error::Io`] if it cannot be listed. Per-folder and per-image failures
/// are reported in the returned [`BatchReport`] instead.
pub fn run(target_dir: &Path, options: &BatchOptions) -> Result<BatchReport> {
    if !target_dir.is_dir() {
        return Err(Error::FileNotFound(target_dir.to_path_buf()));
    }

    info!(target = %target_dir.display(), "processing target directory");

    let folders = list_entries(target_dir, fs::FileType::is_dir)?;

    Ok(BatchReport {
        folders: folders
            .iter()
            .map(|folder| process_folder(folder, options))
            .collect(),
    })
}
