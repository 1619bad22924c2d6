//! kubemux - Multi-Cluster Workload Orchestration CLI
//!
//! Instantiates workload bundles, resolves placement intents, and inspects
//! the plugin registry. Cluster interaction is simulated in process; the
//! instance record printed by `apply` is the durable output.
//!
//! ## Usage
//!
//! ```sh
//! kubemux plan <bundle>
//! kubemux apply <bundle> [--cloud-region <region>] [--namespace <ns>] [--teardown]
//! kubemux resolve <intent.json>
//! kubemux plugins
//! ```
//!
//! ## Configuration
//!
//! Reads `kubemux.json` from the working directory, or the file named by
//! `KUBEMUX_CONFIG`. `KUBEMUX_BUNDLE_ROOT` and `KUBEMUX_CLOUD_REGION`
//! override individual fields. Logs go to stderr; tune with `KUBEMUX_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use kubemux::{
    Bundle, Config, Error, InstanceClient, LocalCluster, PlacementIntent, PluginRegistry,
    ResultExt, VnfManager,
};

// =============================================================================
// CLI Parsing
// =============================================================================

#[derive(Debug)]
enum Command {
    Plan {
        bundle: String,
    },
    Apply {
        bundle: String,
        cloud_region: Option<String>,
        namespace: String,
        teardown: bool,
    },
    Resolve {
        path: PathBuf,
    },
    Plugins,
    Version,
    Help,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "plan" => {
            if args.len() < 3 {
                return Err("plan requires <bundle>".to_string());
            }
            Ok(Command::Plan {
                bundle: args[2].clone(),
            })
        }
        "apply" => {
            if args.len() < 3 {
                return Err("apply requires <bundle>".to_string());
            }
            let bundle = args[2].clone();
            let mut cloud_region = None;
            let mut namespace = String::new();
            let mut teardown = false;
            let mut i = 3;
            while i < args.len() {
                match args[i].as_str() {
                    "--cloud-region" | "-r" => {
                        if i + 1 < args.len() {
                            cloud_region = Some(args[i + 1].clone());
                            i += 2;
                        } else {
                            return Err("--cloud-region requires a value".to_string());
                        }
                    }
                    "--namespace" | "-n" => {
                        if i + 1 < args.len() {
                            namespace = args[i + 1].clone();
                            i += 2;
                        } else {
                            return Err("--namespace requires a value".to_string());
                        }
                    }
                    "--teardown" => {
                        teardown = true;
                        i += 1;
                    }
                    _ => i += 1,
                }
            }
            Ok(Command::Apply {
                bundle,
                cloud_region,
                namespace,
                teardown,
            })
        }
        "resolve" => {
            if args.len() < 3 {
                return Err("resolve requires <intent-file>".to_string());
            }
            Ok(Command::Resolve {
                path: PathBuf::from(&args[2]),
            })
        }
        "plugins" => Ok(Command::Plugins),
        "version" | "--version" | "-v" => Ok(Command::Version),
        "help" | "--help" | "-h" => Ok(Command::Help),
        unknown => Err(format!("unknown command: {}", unknown)),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_plan(bundle: String) -> kubemux::Result<()> {
    let config = Config::load()?;
    let bundle = Bundle::open(config.bundle_root.join(&bundle))?;

    println!("bundle: {}", bundle.root().display());
    let mut missing = None;
    for (resource_type, files) in &bundle.manifest().resources {
        println!("{}:", resource_type);
        for file in files {
            let path = bundle.resource_file(file);
            if path.exists() {
                println!("  {}  ok", file);
            } else {
                println!("  {}  missing", file);
                if missing.is_none() {
                    missing = Some(path);
                }
            }
        }
    }
    println!(
        "{} resource type(s), {} file(s)",
        bundle.manifest().len(),
        bundle.manifest().file_count()
    );

    match missing {
        Some(path) => Err(Error::ResourceFileMissing { path }),
        None => Ok(()),
    }
}

async fn cmd_apply(
    bundle: String,
    cloud_region: Option<String>,
    namespace: String,
    teardown: bool,
) -> kubemux::Result<()> {
    let config = Config::load()?;
    let region = cloud_region.unwrap_or_else(|| config.cloud_region.clone());

    let registry = Arc::new(PluginRegistry::with_builtins());
    let manager = VnfManager::new(registry, config.bundle_root.clone());
    let cluster = LocalCluster::new();

    let handle = manager
        .instantiate(&bundle, &region, &namespace, &cluster)
        .await?;

    let store = kubemux::store::open(&config.store)?;
    let instances = InstanceClient::new(store);
    let record = instances.create(handle.clone()).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    if teardown {
        manager
            .destroy(&handle.resources, &handle.namespace, &cluster)
            .await?;
        instances.delete(&handle.vnf_id).await?;
        eprintln!("destroyed {}", handle.vnf_id);
    }
    Ok(())
}

fn cmd_resolve(path: PathBuf) -> kubemux::Result<()> {
    let data = std::fs::read_to_string(&path)
        .map_err(Error::Io)
        .with_context(|| format!("reading intent file {}", path.display()))?;
    let intent: PlacementIntent = serde_json::from_str(&data)
        .map_err(Error::from)
        .with_context(|| format!("parsing intent file {}", path.display()))?;

    let resolved = intent.resolve();
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn cmd_plugins() {
    let registry = PluginRegistry::with_builtins();
    for resource_type in registry.resource_types() {
        println!("{}", resource_type);
    }
}

fn cmd_version() {
    println!("kubemux version {}", env!("CARGO_PKG_VERSION"));
}

fn cmd_help() {
    println!(
        r#"kubemux - multi-cluster workload orchestrator

USAGE:
    kubemux <command> [options]

COMMANDS:
    plan <bundle>                Show what a bundle would create
    apply <bundle> [options]     Instantiate a bundle and print the record
    resolve <intent-file>        Flatten a placement intent (JSON)
    plugins                      List registered resource types
    version                      Show version info
    help                         Show this help

OPTIONS:
    --cloud-region, -r <region>  Target cloud region (default: from config)
    --namespace, -n <ns>         Target namespace (default: "default")
    --teardown                   Destroy the created resources afterwards

EXAMPLES:
    kubemux plan demo
    kubemux apply demo --cloud-region region1 --namespace edge
    kubemux resolve intent.json
"#
    );
}

// =============================================================================
// Main
// =============================================================================

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("KUBEMUX_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    match parse_args() {
        Ok(cmd) => {
            let result = match cmd {
                Command::Plan { bundle } => cmd_plan(bundle),
                Command::Apply {
                    bundle,
                    cloud_region,
                    namespace,
                    teardown,
                } => cmd_apply(bundle, cloud_region, namespace, teardown).await,
                Command::Resolve { path } => cmd_resolve(path),
                Command::Plugins => {
                    cmd_plugins();
                    Ok(())
                }
                Command::Version => {
                    cmd_version();
                    Ok(())
                }
                Command::Help => {
                    cmd_help();
                    Ok(())
                }
            };

            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            cmd_help();
            ExitCode::FAILURE
        }
    }
}
