//! # ice-rpc CLI Tool
//!
//! Generate client modules from `.ice` files and call remote methods from
//! the command line.

mod codegen;

use clap::{Args, Parser, Subcommand};
use ice_rpc::{Argument, CallRequest, ClientConfig, Dispatcher, MethodSet, idl};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command-line arguments for the ice-rpc tool
#[derive(Parser, Debug)]
#[command(name = "ice-rpc")]
#[command(about = "Generate and exercise clients for .ice interfaces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write `<name>.json` (method list) and `<name>.rs` (client module) for an .ice file
    Init(InitArgs),
    /// Invoke one remote method and print its result
    Call(CallArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Interface definition file
    ice_file: PathBuf,

    /// Output directory (defaults to the directory of the .ice file)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Path of the ice-rpc crate as seen from the generated module
    #[arg(long, default_value = "ice_rpc")]
    crate_path: String,

    /// Name of the generated client struct
    #[arg(long)]
    client_name: Option<String>,
}

#[derive(Args, Debug)]
struct CallArgs {
    /// Remote method name
    method: String,

    /// Primary argument as JSON; anything that is not JSON is sent as a string
    argument: Option<String>,

    /// Secondary numeric argument
    #[arg(long)]
    secondary: Option<i64>,

    /// JSON configuration file (bare, or nested under "iceConfig")
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote host, overrides the configuration file
    #[arg(long)]
    host: Option<String>,

    /// Remote port, overrides the configuration file
    #[arg(short, long)]
    port: Option<u16>,

    /// Method list generated by `init`; unknown methods are rejected
    #[arg(long)]
    methods: Option<PathBuf>,
}

/// Files written by `init`.
#[derive(Debug)]
struct Generated {
    method_list: PathBuf,
    client_module: PathBuf,
    method_count: usize,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Init(args) => run_init(&args).map(|generated| {
            println!("Read {}", args.ice_file.display());
            println!(
                "Generated {} methods:\n  {}\n  {}",
                generated.method_count,
                generated.method_list.display(),
                generated.client_module.display()
            );
        }),
        Command::Call(args) => run_call(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn run_init(args: &InitArgs) -> Result<Generated, Box<dyn std::error::Error>> {
    let path = &args.ice_file;
    if !path.is_file() {
        return Err(format!("file not found: {}", path.display()).into());
    }

    tracing::debug!(path = %path.display(), "reading interface definition");
    let source = fs::read_to_string(path)?;
    let file = idl::parse(&source);
    let methods: MethodSet = file.method_names().into_iter().collect();
    if methods.is_empty() {
        tracing::warn!(path = %path.display(), "no operations found");
    }

    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    fs::create_dir_all(&out_dir)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("invalid file name: {}", path.display()))?;
    let source_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(stem);

    let interface = file.interfaces.first();
    let client_name = match (&args.client_name, interface) {
        (Some(name), _) => name.clone(),
        (None, Some(interface)) => codegen::client_name(&interface.name),
        (None, None) => codegen::client_name(stem),
    };
    let type_id = interface.map(|i| i.type_id());

    let module = codegen::render_client_module(&codegen::ClientTemplate {
        source_name,
        crate_path: &args.crate_path,
        client_name: &client_name,
        type_id: type_id.as_deref(),
        methods: &methods,
    })?;

    let method_list = out_dir.join(format!("{stem}.json"));
    let client_module = out_dir.join(format!("{stem}.rs"));
    fs::write(&method_list, codegen::render_method_list(&methods)?)?;
    fs::write(&client_module, module)?;
    tracing::info!(
        methods = methods.len(),
        client = %client_name,
        "generated client"
    );

    Ok(Generated {
        method_list,
        client_module,
        method_count: methods.len(),
    })
}

fn load_config(args: &CallArgs) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    Ok(config)
}

fn build_request(args: &CallArgs) -> Result<CallRequest, Box<dyn std::error::Error>> {
    if let Some(path) = &args.methods {
        let methods = MethodSet::from_json_str(&fs::read_to_string(path)?)?;
        if !methods.contains(&args.method) {
            return Err(format!("unknown method `{}`", args.method).into());
        }
    }

    let argument = match &args.argument {
        Some(text) => serde_json::from_str::<serde_json::Value>(text)
            .map(Argument::from)
            .unwrap_or_else(|_| Argument::from(text.as_str())),
        None => Argument::none(),
    };

    let mut request = CallRequest::new(&args.method).argument(argument);
    if let Some(secondary) = args.secondary {
        request = request.secondary(secondary);
    }
    Ok(request)
}

fn run_call(args: &CallArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let request = build_request(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async {
        let dispatcher = Dispatcher::tcp(&config);
        tracing::debug!(proxy = %config.descriptor(), method = %args.method, "calling");
        dispatcher.invoke(request).await
    })?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
