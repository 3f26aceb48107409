use clap::{Parser, Subcommand};
use ggp_site::generate::{self, Route};
use ggp_site::i18n::Locale;
use ggp_site::timeline::{self, TimelineOptions};
use ggp_site::{config, output, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "ggp-site")]
#[command(about = "Static site generator for the Global Gate Produce website")]
#[command(long_about = "\
Static site generator for the Global Gate Produce website

Renders the landing page, product catalog, product detail pages and the
certifications page in English and Spanish. Page sections reveal once as
they scroll into view; the reveal timing is decided at build time and can
be previewed with the timeline command.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── translations/
  │   ├── en.toml                  # UI copy, nested tables → dotted keys
  │   └── es.toml                  # Missing keys fall back to the default locale
  ├── home.toml                    # Capabilities, quality pillars, contacts
  ├── certifications.toml          # [[certification]] badges
  ├── products/
  │   ├── 010-avocados-hass.toml   # Numbered = listed, in number order
  │   └── lemons.toml              # Unnumbered = page only, not listed
  └── assets/                      # Copied to the output root

Run 'ggp-site gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".ggp-site-temp", global = true)]
    temp_dir: PathBuf,

    /// Log reveal decisions and other diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Produce the final HTML site from the manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate content and translation coverage without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Print the translated text for a catalog key
    Lookup {
        /// Dotted key, e.g. footer.copyright
        key: String,
        #[arg(long, default_value = "en")]
        locale: Locale,
        /// Placeholder value as name=value (repeatable)
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
    /// Simulate scrolling through a page and print when each element reveals
    Timeline {
        /// home, products, product:<slug> or certifications
        #[arg(long, default_value = "home")]
        page: Route,
        #[arg(long, default_value = "en")]
        locale: Locale,
        /// Viewport as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x800", value_parser = timeline::parse_viewport)]
        viewport: ggp_site::reveal::sim::Size,
        /// Simulate a visitor who prefers reduced motion
        #[arg(long)]
        reduced_motion: bool,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{s}'"))
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "ggp_site=debug" } else { "ggp_site=warn" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let report = generate::generate(&manifest_path, &cli.output)?;
            output::print_generate_output(&report);
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            let manifest_path = write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate(&manifest_path, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            let coverage = scan::check_coverage(&manifest);
            output::print_check_output(&coverage);
            if !coverage.is_ok() {
                return Err(format!(
                    "{} unknown translation key(s) referenced by content",
                    coverage.unknown.len()
                )
                .into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Lookup { key, locale, vars } => {
            let manifest = scan::scan(&cli.source)?;
            let vars: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            println!("{}", manifest.catalog.t_with(locale, &key, &vars));
        }
        Command::Timeline {
            page,
            locale,
            viewport,
            reduced_motion,
        } => {
            let manifest = scan::scan(&cli.source)?;
            let rendered = generate::render_page(&manifest, &page, locale)?;
            let options = TimelineOptions {
                viewport,
                reduced_motion,
                ..TimelineOptions::default()
            };
            let result = timeline::simulate(&rendered.plan, &manifest.config.reveal.presets(), &options);
            output::print_timeline(&result, &format!("{page} ({locale})"), viewport);
        }
    }

    Ok(())
}

/// Write the scan manifest to `<temp_dir>/manifest.json` and return its path.
fn write_manifest(manifest: &scan::Manifest, temp_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&manifest_path, json)?;
    Ok(manifest_path)
}
