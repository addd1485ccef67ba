use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use clsstub::{ClassSource, DirectoryClassFile, JarArchive, StubOptions, StubTree, build_stub_with};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "clsstub")]
#[command(about = "Print the source-level stub of a compiled Java class as JSON")]
struct Cli {
    /// A `.class` file, or a jar when `--entry` is given.
    path: PathBuf,

    /// Class entry inside the jar, e.g. `java/util/Map.class`.
    #[arg(long, value_name = "ENTRY")]
    entry: Option<String>,

    /// JSON file with build options.
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Do not attach inner classes from sibling files.
    #[arg(long)]
    no_inner: bool,

    #[arg(long)]
    pretty: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load_options(cli: &Cli) -> Result<StubOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading options from {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing options in {}", path.display()))?
        }
        None => StubOptions::default(),
    };
    if let Some(max_depth) = cli.max_depth {
        options.max_nesting_depth = max_depth;
    }
    if cli.no_inner {
        options.resolve_inner_classes = false;
    }
    Ok(options)
}

fn build<S: ClassSource>(source: &S, options: &StubOptions) -> Result<StubTree> {
    let bytes = source
        .read()
        .with_context(|| format!("reading {}", source.base_name()))?;
    build_stub_with(source, &bytes, options)
        .with_context(|| format!("building stub of {}", source.base_name()))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let options = load_options(&cli)?;

    let tree = match &cli.entry {
        Some(entry) => {
            let jar = JarArchive::open(&cli.path)
                .with_context(|| format!("opening {}", cli.path.display()))?;
            let Some(class_file) = jar.class_file(entry) else {
                bail!("no class entry `{entry}` in {}", cli.path.display());
            };
            build(&class_file, &options)?
        }
        None => build(&DirectoryClassFile::new(cli.path.clone()), &options)?,
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&tree)?
    } else {
        serde_json::to_string(&tree)?
    };
    println!("{json}");
    Ok(())
}
