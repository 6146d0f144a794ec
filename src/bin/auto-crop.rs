use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use auto_crop_borders::batch::{self, DEFAULT_BATCH_PADDING, DEFAULT_SOURCE_FOLDERS};
use auto_crop_borders::classify::DEFAULT_THRESHOLD;
use auto_crop_borders::{
    default_output_path, process_file, BackgroundRule, BatchOptions, CropOptions, Outcome,
    ProcessResult, DEFAULT_PADDING,
};

#[derive(Parser)]
#[command(
    name = "auto-crop",
    about = "Crop white and transparent borders from product photos",
    version,
    after_help = "Directory input: each sub-folder's source folders are cropped into <sub-folder>/Resized.\n\
                  File input: writes <name>_cropped.png beside the image unless -o is given.\n\n\
                  Outputs are always PNG so transparent padding survives."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Target directory of product folders, or a single image file
    #[arg(default_value = "target")]
    input: PathBuf,

    /// Output file for single-image mode (default: {name}_cropped.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// White threshold: R, G and B must all be >= this to count as background
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Padding around the square canvas (default: 700 for directories, 200 for files)
    #[arg(short, long)]
    padding: Option<u32>,

    /// Keep the cropped aspect ratio instead of padding to a square
    #[arg(long)]
    no_square: bool,

    /// Do not treat fully transparent pixels as background
    #[arg(long)]
    opaque_only: bool,

    /// Source folder name inside each product folder (repeatable)
    #[arg(long = "source-folder", value_name = "NAME")]
    source_folders: Vec<String>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn crop_options(&self, default_padding: u32) -> CropOptions {
        CropOptions {
            rule: BackgroundRule {
                threshold: self.threshold,
                transparent_is_background: !self.opaque_only,
            },
            square: !self.no_square,
            padding: self.padding.unwrap_or(default_padding),
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if !cli.input.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input.display());
        process::exit(1);
    }

    let (results, folder_errors) = if cli.input.is_dir() {
        if cli.output.is_some() {
            eprintln!("Error: --output only applies to a single image file");
            process::exit(1);
        }
        let opts = BatchOptions {
            crop: cli.crop_options(DEFAULT_BATCH_PADDING),
            source_folders: if cli.source_folders.is_empty() {
                DEFAULT_SOURCE_FOLDERS.iter().map(ToString::to_string).collect()
            } else {
                cli.source_folders.clone()
            },
            ..BatchOptions::default()
        };
        match batch::run(&cli.input, &opts) {
            Ok(report) => {
                for folder in &report.folders {
                    if let Some(e) = &folder.error {
                        eprintln!("[FAIL] {}: {e}", folder.folder.display());
                    }
                }
                let folder_errors = report.folder_errors();
                let results: Vec<ProcessResult> =
                    report.folders.into_iter().flat_map(|f| f.results).collect();
                (results, folder_errors)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&cli.input));
        let opts = cli.crop_options(DEFAULT_PADDING);
        (vec![process_file(&cli.input, &output, &opts)], 0)
    };

    let mut cropped_count = 0u32;
    let mut unchanged_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &cli);
        match r.outcome {
            Ok(Outcome::Cropped { .. }) => cropped_count += 1,
            Ok(Outcome::Unchanged { .. }) => unchanged_count += 1,
            Err(_) => fail_count += 1,
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Cropped: {cropped_count}");
        if unchanged_count > 0 {
            eprint!(", Unchanged: {unchanged_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 || folder_errors > 0 {
        process::exit(1);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

fn print_result(result: &ProcessResult, cli: &Cli) {
    let filename = display_name(&result.input);
    match &result.outcome {
        Ok(Outcome::Cropped { width, height }) => {
            if !cli.quiet {
                eprintln!("[OK] {filename} -> {width}x{height}");
            }
        }
        Ok(Outcome::Unchanged { width, height }) => {
            if !cli.quiet {
                eprintln!("[SKIP] {filename}: no border detected ({width}x{height})");
            }
        }
        Err(e) => eprintln!("[FAIL] {filename}: {e}"),
    }

    if cli.verbose && result.is_success() {
        eprintln!("  -> {}", result.output.display());
    }
}
