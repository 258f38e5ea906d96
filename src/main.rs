use clap::{ArgGroup, Parser};
use myst_image_gallery::transform::GalleryTransform;
use myst_image_gallery::{config, metadata, output, plugin};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "myst-image-gallery")]
#[command(about = "MyST plugin that renders an image catalog as a card grid")]
#[command(long_about = "\
MyST plugin that renders an image catalog as a card grid

Register it in myst.yml:

  project:
    plugins:
      - type: executable
        path: myst-image-gallery

then use the directive anywhere in a page:

  :::{image-gallery}
  :::

Run with no flags to print the plugin manifest. The host calls
--directive and --transform itself, passing JSON on stdin.

Catalog (images/images_metadata.yml):

  - file: cat.jpg          # required, relative to images/
    alt-text: A cat        # optional, shown as the caption
    tags: [animals, cute]  # optional, shown as badges
  - file: dog.jpg

Run 'myst-image-gallery --gen-config' to print a documented
image-gallery.toml.")]
#[command(version = version_string())]
#[command(group(
    ArgGroup::new("mode").args(["directive", "transform", "role", "check", "gen_config"])
))]
struct Cli {
    /// Project root; the catalog and images are resolved against it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file (default: <root>/image-gallery.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a directive (host protocol; directive data on stdin)
    #[arg(long, value_name = "NAME")]
    directive: Option<String>,

    /// Run a transform (host protocol; document on stdin)
    #[arg(long, value_name = "NAME")]
    transform: Option<String>,

    /// Run a role (host protocol; none are provided)
    #[arg(long, value_name = "NAME")]
    role: Option<String>,

    /// Validate the image catalog and list its entries
    #[arg(long)]
    check: bool,

    /// Print a stock image-gallery.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    if let Some(name) = &cli.role {
        plugin::run_role(name)?;
        return Ok(());
    }

    if let Some(name) = &cli.directive {
        let data = plugin::read_input(std::io::stdin().lock())?;
        let nodes = plugin::run_directive(name, &data)?;
        return write_json(&nodes);
    }

    if let Some(name) = &cli.transform {
        // A bad config only fails the pages that contain a gallery
        let transform = match config::load_config(&cli.root, cli.config.as_deref()) {
            Ok(site_config) => GalleryTransform::new(&cli.root, site_config),
            Err(err) => {
                warn!("{err}");
                GalleryTransform::misconfigured(&cli.root, &err)
            }
        };
        let document = plugin::read_input(std::io::stdin().lock())?;
        let document = plugin::run_transform(name, document, &transform)?;
        return write_json(&document);
    }

    if cli.check {
        let site_config = config::load_config(&cli.root, cli.config.as_deref())?;
        let transform = GalleryTransform::new(&cli.root, site_config);
        let path = transform.metadata_path();
        let gallery = metadata::load_metadata(&path)?;
        output::print_check_output(&gallery, &path);
        return Ok(());
    }

    write_json(&plugin::plugin_spec())
}

/// Log to stderr; stdout belongs to the host protocol.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "myst_image_gallery=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .init();
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    stdout.flush()?;
    Ok(())
}
