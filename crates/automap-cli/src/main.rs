use automap::render::{HeadlessError, PageMap, compose_manifest};
use automap::{Diagnostic, FileSource, LoadOptions, MergedView, PageManifest};
use futures::executor::block_on;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Automap(HeadlessError),
    Json(serde_json::Error),
    MapNotFound(String),
    Diagnostics(usize),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Automap(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::MapNotFound(container) => {
                write!(f, "No map with container `{container}` in manifest")
            }
            CliError::Diagnostics(count) => write!(f, "{count} problem(s) found"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Automap(value)
    }
}

impl From<automap::Error> for CliError {
    fn from(value: automap::Error) -> Self {
        Self::Automap(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Compose,
    Render,
    Check,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    strict: bool,
    verbose: bool,
    map: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
struct CheckOut<'a> {
    layers: Vec<&'a str>,
    maps: Vec<&'a str>,
    diagnostics: &'a [Diagnostic],
}

fn usage() -> &'static str {
    "automap-cli\n\
\n\
USAGE:\n\
  automap-cli [compose] [--pretty] [--strict] [--map <container>] [--verbose] [<manifest>|-]\n\
  automap-cli render [--strict] [--map <container>] [--out <path>] [--verbose] [<manifest>|-]\n\
  automap-cli check [--pretty] [--strict] [--verbose] [<manifest>|-]\n\
\n\
NOTES:\n\
  - If <manifest> is omitted or '-', the manifest is read from stdin.\n\
  - Layer paths are resolved relative to the manifest's directory (the current directory for stdin).\n\
  - compose prints the merged views as JSON; render prints one HTML fragment per map.\n\
  - check prints the load report as JSON and fails when any point or layer was skipped.\n\
  - --strict turns malformed layers and invalid points into errors instead of skipping them.\n\
  - Logging goes to stderr; RUST_LOG overrides the level, --verbose defaults it to debug.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "compose" => args.command = Command::Compose,
            "render" => args.command = Command::Render,
            "check" => args.command = Command::Check,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--verbose" | "-v" => args.verbose = true,
            "--map" => {
                let Some(container) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.map = Some(container.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => args.input = Some("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn layer_root(input: Option<&str>) -> PathBuf {
    match input {
        None | Some("-") => PathBuf::from("."),
        Some(path) => Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn select_maps(maps: Vec<PageMap>, only: Option<&str>) -> Result<Vec<PageMap>, CliError> {
    let Some(container) = only else {
        return Ok(maps);
    };
    let selected: Vec<PageMap> = maps
        .into_iter()
        .filter(|m| m.view.container == container)
        .collect();
    if selected.is_empty() {
        return Err(CliError::MapNotFound(container.to_string()));
    }
    Ok(selected)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let manifest = PageManifest::from_json_str(&text)?;
    let source = FileSource::new(layer_root(args.input.as_deref()));
    let options = if args.strict {
        LoadOptions::strict()
    } else {
        LoadOptions::lenient()
    };
    tracing::debug!(
        layers = manifest.layers.len(),
        maps = manifest.maps.len(),
        root = %source.base().display(),
        "loaded manifest"
    );

    match args.command {
        Command::Compose => {
            let maps = block_on(compose_manifest(&manifest, &source, options))?;
            let maps = select_maps(maps, args.map.as_deref())?;
            if args.map.is_some() {
                write_json(&maps[0].view, args.pretty)
            } else {
                let views: Vec<&MergedView> = maps.iter().map(|m| &m.view).collect();
                write_json(&views, args.pretty)
            }
        }
        Command::Render => {
            let maps = block_on(compose_manifest(&manifest, &source, options))?;
            let maps = select_maps(maps, args.map.as_deref())?;
            let mut html = String::new();
            for map in &maps {
                html.push_str(&map.html()?);
            }
            write_text(&html, args.out.as_deref())
        }
        Command::Check => {
            let mut session = manifest.session(&source, options);
            let ctx = session.on_load()?;
            let report = CheckOut {
                layers: ctx.registry.layer_names().collect(),
                maps: ctx.maps().map(|m| m.container.as_str()).collect(),
                diagnostics: ctx.registry.diagnostics(),
            };
            write_json(&report, args.pretty)?;
            for diagnostic in report.diagnostics {
                eprintln!("{diagnostic}");
            }
            if report.diagnostics.is_empty() {
                Ok(())
            } else {
                Err(CliError::Diagnostics(report.diagnostics.len()))
            }
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::MapNotFound(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
