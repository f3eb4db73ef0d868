use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "lookup")]
use cinevault::OmdbClient;
use cinevault::{CsvStore, JsonStore, MovieApp, MovieStore};

#[derive(Debug, Parser)]
#[command(name = "cinevault", version, about = "Personal movie catalog over flat files")]
struct CliOptions {
    /// Storage file holding the catalog.
    #[arg(default_value = "movies.json")]
    file: PathBuf,

    /// Storage format. Inferred from the file extension when omitted.
    #[arg(long, value_enum)]
    storage: Option<StorageFormat>,

    /// Heading for the menu and the generated website.
    #[arg(long, default_value = "My Movie Catalog")]
    title: String,

    /// Website template file. Without it a built-in template is used.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Where the generated website is written.
    #[arg(long, default_value = "movies.html")]
    output: PathBuf,

    /// OMDb API key enabling the title-lookup menu entry. Falls back to
    /// the OMDB_API_KEY environment variable.
    #[cfg(feature = "lookup")]
    #[arg(long)]
    omdb_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageFormat {
    Json,
    Csv,
}

impl StorageFormat {
    fn infer(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => StorageFormat::Csv,
            _ => StorageFormat::Json,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let options = CliOptions::parse();

    let format = options
        .storage
        .unwrap_or_else(|| StorageFormat::infer(&options.file));
    let result = match format {
        StorageFormat::Json => match JsonStore::new(&options.file) {
            Ok(store) => run_app(store, &options),
            Err(e) => Err(e.to_string()),
        },
        StorageFormat::Csv => match CsvStore::new(&options.file) {
            Ok(store) => run_app(store, &options),
            Err(e) => Err(e.to_string()),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_app<S: MovieStore>(store: S, options: &CliOptions) -> Result<(), String> {
    let mut app = MovieApp::new(store)
        .with_page_title(&options.title)
        .with_output(&options.output);
    if let Some(template) = &options.template {
        app = app.with_template(template);
    }
    #[cfg(feature = "lookup")]
    {
        let key = options
            .omdb_key
            .clone()
            .or_else(|| std::env::var("OMDB_API_KEY").ok());
        if let Some(key) = key {
            app = app.with_lookup(Box::new(OmdbClient::new(key)));
        }
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    app.run(&mut input, &mut output).map_err(|e| e.to_string())
}
