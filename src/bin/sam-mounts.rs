//! SAM API Mounts CLI
//!
//! Command-line interface for listing the route mounts of SAM APIs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sam_api_mounts::{
    load_template, resolve_definition, resolve_mounts, DefinitionSource, MountDescriptor,
    NoObjectStore, ObjectStore, ServerlessApi, ServerlessTemplate,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sam-mounts")]
#[command(about = "List the local route mounts of SAM API definitions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    store: StoreArgs,

    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct StoreArgs {
    /// AWS region for S3 definitions (default: from the environment)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Custom S3 endpoint URL (e.g. MinIO or LocalStack)
    #[arg(long, global = true)]
    endpoint_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the mounts of every API in a template
    Mounts {
        /// SAM template (JSON or YAML)
        template: PathBuf,

        /// Only this API (logical id)
        #[arg(long)]
        api: Option<String>,

        /// Output JSON keyed by API logical id
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },

    /// Print the resolved definition of an API
    Definition {
        /// SAM template (JSON or YAML)
        template: PathBuf,

        /// API logical id
        #[arg(long)]
        api: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Mounts {
            template,
            api,
            json,
            pretty,
        } => run_mounts(&template, api.as_deref(), json, pretty, &cli.store),

        Commands::Definition {
            template,
            api,
            output,
        } => run_definition(&template, &api, output, &cli.store),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_template(path: &Path) -> Result<ServerlessTemplate, u8> {
    load_template(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn select_apis(
    template: &ServerlessTemplate,
    api: Option<&str>,
) -> Result<Vec<(String, ServerlessApi)>, u8> {
    let selected = match api {
        Some(name) => template.api(name).map(|api| vec![(name.to_string(), api)]),
        None => template.apis(),
    };
    selected.map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

/// Build the object store, only touching AWS configuration when an API
/// actually lives in S3.
fn object_store<'a, I>(apis: I, args: &StoreArgs) -> Result<Box<dyn ObjectStore>, u8>
where
    I: IntoIterator<Item = &'a ServerlessApi>,
{
    let needs_s3 = apis.into_iter().any(|api| {
        matches!(
            api.definition_source(),
            Some(DefinitionSource::ObjectLocation(_))
        )
    });
    if !needs_s3 {
        return Ok(Box::new(NoObjectStore));
    }

    #[cfg(feature = "s3")]
    {
        let mut config = sam_api_mounts::S3Config::new();
        if let Some(region) = &args.region {
            config = config.with_region(region);
        }
        if let Some(endpoint) = &args.endpoint_url {
            config = config.with_endpoint(endpoint);
        }
        sam_api_mounts::S3ObjectStore::new(config)
            .map(|store| Box::new(store) as Box<dyn ObjectStore>)
            .map_err(|e| {
                eprintln!("Error starting S3 client: {}", e);
                3u8
            })
    }
    #[cfg(not(feature = "s3"))]
    {
        let _ = args;
        Ok(Box::new(NoObjectStore))
    }
}

fn run_mounts(
    template_path: &Path,
    api: Option<&str>,
    json: bool,
    pretty: bool,
    store_args: &StoreArgs,
) -> Result<(), u8> {
    let template = open_template(template_path)?;
    let apis = select_apis(&template, api)?;
    let store = object_store(apis.iter().map(|(_, api)| api), store_args)?;

    let mut resolved: Vec<(String, Vec<MountDescriptor>)> = Vec::new();
    for (name, api) in &apis {
        let mounts = resolve_mounts(api, store.as_ref()).map_err(|e| {
            eprintln!("Error resolving {}: {}", name, e);
            e.exit_code() as u8
        })?;
        resolved.push((name.clone(), mounts));
    }

    if json {
        let mut output = serde_json::Map::new();
        for (name, mounts) in resolved {
            let value = serde_json::to_value(&mounts).map_err(|e| {
                eprintln!("Error serializing output: {}", e);
                2u8
            })?;
            output.insert(name, value);
        }
        let output = serde_json::Value::Object(output);
        let text = if pretty {
            serde_json::to_string_pretty(&output)
        } else {
            serde_json::to_string(&output)
        }
        .map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", text);
    } else {
        for (name, mounts) in &resolved {
            for mount in mounts {
                let handler = if mount.has_handler() {
                    mount.handler.as_str()
                } else {
                    "-"
                };
                println!(
                    "{}\t{}\t{}\t{}",
                    name,
                    mount.method.as_str().to_uppercase(),
                    mount.path,
                    handler
                );
            }
        }
    }

    Ok(())
}

fn run_definition(
    template_path: &Path,
    api_name: &str,
    output: Option<PathBuf>,
    store_args: &StoreArgs,
) -> Result<(), u8> {
    let template = open_template(template_path)?;
    let api = template.api(api_name).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let store = object_store([&api], store_args)?;

    let bytes = resolve_definition(&api, store.as_ref()).map_err(|e| {
        eprintln!("Error resolving {}: {}", api_name, e);
        e.exit_code() as u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &bytes).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|()| stdout.write_all(b"\n"))
                .map_err(|e| {
                    eprintln!("Error writing output: {}", e);
                    3u8
                })?;
        }
    }

    Ok(())
}
