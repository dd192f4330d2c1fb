//! The thin CLI front end: argument parsing, tabular/JSON rendering, and
//! process exit codes. The crate's only consumer of the library.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use indelve::{CollectingWarnSink, Indelve, ItemRecord, WarnSink};

/// indelve: ranked XDG desktop-application search.
#[derive(Parser, Debug)]
#[command(name = "indelve", version, about)]
struct Args {
    /// Comma-separated list of provider short names to load. Defaults to
    /// the configuration file's provider list.
    #[arg(short = 'p', long = "providers", value_delimiter = ',')]
    providers: Option<Vec<String>>,

    /// List the short names of every loaded provider and exit.
    #[arg(short = 'l', long = "list-providers")]
    list_providers: bool,

    /// Print the given provider's long description and exit.
    #[arg(short = 'd', long = "provider-description", value_name = "NAME")]
    provider_description: Option<String>,

    /// Comma-separated output columns: name, exec, description, icon.
    #[arg(short = 'c', long = "columns", value_delimiter = ',', default_value = "name,description")]
    columns: Vec<String>,

    /// Output format: plain or json.
    #[arg(short = 'f', long = "format", default_value = "plain")]
    format: Format,

    /// Interactive mode is not implemented by this core; the flag is
    /// accepted only so that rejecting it can produce a clear error
    /// rather than an "unrecognized argument" one.
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Increase log verbosity; may be repeated.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// The search query. `-` or omitted reads the query from standard
    /// input.
    query: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    Plain,
    Json,
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Name,
    Exec,
    Description,
    Icon,
}

impl Column {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "name" => Some(Column::Name),
            "exec" => Some(Column::Exec),
            "description" => Some(Column::Description),
            "icon" => Some(Column::Icon),
            _ => None,
        }
    }

    fn value<'a>(self, item: &'a ItemRecord) -> &'a str {
        match self {
            Column::Name => &item.name,
            Column::Exec => &item.exec,
            Column::Description => &item.description,
            Column::Icon => &item.icon,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Exec => "exec",
            Column::Description => "description",
            Column::Icon => "icon",
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    indelve::logging::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("ERROR: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    if args.interactive {
        return Err("interactive mode is not supported by this core".to_string());
    }

    let config = indelve::config::load();
    let providers: Vec<String> = args.providers.unwrap_or(config.providers);
    let provider_refs: Vec<&str> = providers.iter().map(String::as_str).collect();

    let sink = CollectingWarnSink::new();
    let indelve = Indelve::construct(&provider_refs, &sink).map_err(|e| e.to_string())?;
    for warning in sink.into_warnings() {
        log::warn!("{warning}");
    }

    if args.list_providers {
        for name in indelve.list_providers() {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(name) = args.provider_description {
        let found = indelve
            .list_providers_with_descriptions()
            .into_iter()
            .find(|(provider_name, _)| *provider_name == name);
        return match found {
            Some((_, description)) => {
                println!("{}", description.long);
                Ok(())
            }
            None => Err(format!("unknown provider '{name}'")),
        };
    }

    let columns: Vec<Column> = args
        .columns
        .iter()
        .map(|c| Column::parse(c).ok_or_else(|| format!("unknown column '{c}'")))
        .collect::<Result<_, _>>()?;

    let query = resolve_query(args.query)?;
    let results = indelve.search(&query).map_err(|e| e.to_string())?;
    render(&results, &columns, args.format);
    Ok(())
}

/// `-`, an empty string, or no positional argument all mean: read the
/// query from standard input.
fn resolve_query(positional: Option<String>) -> Result<String, String> {
    match positional.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read query from stdin: {e}"))?;
            Ok(buf.trim().to_string())
        }
        Some(query) => Ok(query.to_string()),
    }
}

fn render(results: &[ItemRecord], columns: &[Column], format: Format) {
    match format {
        Format::Plain => {
            for item in results {
                let row: Vec<&str> = columns.iter().map(|c| c.value(item)).collect();
                println!("{}", row.join("\t"));
            }
        }
        Format::Json => {
            let rendered: Vec<Value> = results
                .iter()
                .map(|item| {
                    let fields: BTreeMap<&str, &str> =
                        columns.iter().map(|c| (c.key(), c.value(item))).collect();
                    serde_json::to_value(fields).expect("string map always serializes")
                })
                .collect();
            match serde_json::to_string(&rendered) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("failed to render JSON output: {e}"),
            }
        }
    }
}
