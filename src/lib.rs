//! Crop white and transparent borders from product photographs.
//!
//! A pixel counts as background when it is fully transparent or when its
//! red, green and blue channels all reach a white threshold (240 by
//! default). Four line scans find the outermost rows and columns holding
//! content; the image is cropped to them and optionally centered on a
//! transparent square canvas with uniform padding.
//!
//! # Quick Start
//!
//! ```no_run
//! use auto_crop_borders::{crop, CropOptions};
//!
//! let img = image::open("watch.jpg").unwrap().to_rgba8();
//! let result = crop(img, &CropOptions::default()).expect("valid image");
//! result.into_image().save("watch_cropped.png").unwrap();
//! ```
//!
//! # Batch runs
//!
//! [`batch::run`] walks a target directory of product folders, crops the
//! images found in each folder's source sub-folders and writes PNG outputs
//! into a sibling `Resized` folder. Failures are collected per image in the
//! returned [`BatchReport`] rather than aborting the run.
//!
//! ```no_run
//! use std::path::Path;
//! use auto_crop_borders::{batch, BatchOptions};
//!
//! let report = batch::run(Path::new("target"), &BatchOptions::default()).unwrap();
//! println!("cropped {}, failed {}", report.processed(), report.failed());
//! ```

#![deny(missing_docs)]

pub mod batch;
pub mod classify;
pub mod detection;
mod engine;
pub mod error;

pub use batch::{
    default_output_path, is_supported_image, process_file, BatchOptions, BatchReport,
    FolderReport, Outcome, ProcessResult,
};
pub use classify::BackgroundRule;
pub use detection::{Borders, CropBox};
pub use engine::{
    centered_offset, crop, extract, pad_to_square, CropOptions, CropResult, DEFAULT_PADDING,
};
pub use error::{Error, Result};
