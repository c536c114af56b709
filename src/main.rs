use ballkeeper_media::imaging::{CanvasSize, FontSource, PlaceholderKind, ScaleStrategy};
use ballkeeper_media::{batch, config, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ballkeeper-media")]
#[command(about = "Placeholder images and size-bounded recompression for league media")]
#[command(long_about = "\
Placeholder images and size-bounded recompression for league media

Placeholders are a random vertical gradient with the label centered on top,
in black or white depending on the background. Avatars are 50x50, league
covers 100x100.

Compression keeps files at or under a byte budget (100 KiB by default):

  .jpg/.jpeg   re-encoded at quality 90, 80, ... 10 until it fits
  .png         alpha dropped, dimensions scaled down
  other        re-encoded in the same format, dimensions scaled down

Files already within budget are copied unchanged.

Run 'ballkeeper-media gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a placeholder image for a label
    Placeholder {
        /// Text drawn on the image, usually a user or league name
        label: String,
        /// Output file; the format follows the extension
        #[arg(short, long)]
        output: PathBuf,
        /// Preset canvas size
        #[arg(long, value_enum)]
        kind: Option<PlaceholderKind>,
        /// Canvas width in pixels (overrides --kind and config)
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Canvas height in pixels (overrides --kind and config)
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },
    /// Compress image files into an output directory
    Compress {
        /// Files or directories to compress
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Directory the results are written to
        #[arg(long)]
        out_dir: PathBuf,
        /// Byte budget per file
        #[arg(long)]
        budget: Option<usize>,
        /// Scaling strategy for non-JPEG images
        #[arg(long, value_enum)]
        strategy: Option<ScaleStrategy>,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show which font placeholders will use
    Fonts,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Placeholder {
            label,
            output: out,
            kind,
            width,
            height,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let size = match (width, height, kind) {
                (Some(w), Some(h), _) => CanvasSize::new(w, h),
                (_, _, Some(kind)) => kind.canvas(),
                _ => config.placeholder.canvas(),
            };
            let generator = config.placeholder.generator();
            let image = generator.generate(&label, size);
            image.save(&out)?;
            output::print_placeholder_output(&label, size, &out, generator.font());
        }
        Command::Compress {
            paths,
            out_dir,
            budget,
            strategy,
            json,
        } => {
            let mut config = config::load_config(cli.config.as_deref())?;
            if let Some(budget) = budget {
                config.compression.budget_bytes = budget;
            }
            if let Some(strategy) = strategy {
                config.compression.strategy = strategy;
            }
            config.validate()?;

            init_thread_pool(&config.processing);
            let compressor = config.compression.compressor();
            let inputs = batch::collect_inputs(&paths)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if json {
                        continue;
                    }
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let report = batch::compress_files(&inputs, &out_dir, &compressor, Some(tx))?;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_batch_summary(&report);
            }
            if report.has_failures() {
                return Err(format!("{} file(s) failed", report.totals.failed).into());
            }
        }
        Command::Fonts => {
            let config = config::load_config(cli.config.as_deref())?;
            let candidates = config.placeholder.font_paths.as_slice();
            let font = FontSource::resolve(candidates);
            output::print_fonts_output(candidates, &font);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` when set.
///
/// Defaults to `warn`, or `debug` for this crate with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,ballkeeper_media=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
