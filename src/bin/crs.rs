//! `crs` runs a single request against a data directory directly, without a server.
//!
//! `crs [--data-dir DIR] [--engine ENGINE] <list|get KEY|add [FIELDS]|update KEY [FIELDS]|rm KEY>`
//!
//! The response body is printed as JSON; error responses exit with a non-zero code.

use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use crs::config::{self, EngineKind};
use crs::{handle, CrsError, IndexedStore, NamedStore, Request, Response, Result};
use serde_json::Value;
use std::path::Path;
use std::process::exit;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    subscriber_config();

    let key_arg = || Arg::with_name("KEY").help("a client id or name").required(true).index(1);
    let matches = App::new("crs")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("manage a client record store without a server")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommands(vec![
            SubCommand::with_name("list").about("List every client"),
            SubCommand::with_name("get")
                .about("Get a client by id or name")
                .arg(key_arg()),
            SubCommand::with_name("add")
                .about("Create a client")
                .arg(Arg::with_name("FIELDS").help("a JSON object").index(1)),
            SubCommand::with_name("update")
                .about("Update the given fields of a client")
                .arg(key_arg())
                .arg(Arg::with_name("FIELDS").help("a JSON object").index(2)),
            SubCommand::with_name("rm")
                .about("Remove a client")
                .arg(key_arg()),
        ])
        .arg(Arg::with_name("data-dir")
            .long("data-dir")
            .value_name("DIR")
            .help("sets the directory holding the client data file")
            .default_value(config::DEFAULT_DATA_DIR))
        .arg(Arg::with_name("engine")
            .long("engine")
            .value_name("ENGINE_NAME")
            .help("sets the storage engine to use, either 'indexed' or 'named'")
            .possible_values(EngineKind::VARIANTS))
        .get_matches();

    match run(&matches) {
        Ok(Response::Ok { body, .. }) => print_json(&body),
        Ok(Response::Err { status, error }) => {
            eprintln!("{} ({})", error, status);
            exit(1);
        }
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    }
}

fn run(matches: &ArgMatches) -> Result<Response> {
    let data_dir = Path::new(matches.value_of("data-dir").unwrap_or(config::DEFAULT_DATA_DIR));
    let requested = matches
        .value_of("engine")
        .map(str::parse::<EngineKind>)
        .transpose()?;
    let req = parse_request(matches)?;

    let path = config::data_file(data_dir);
    match config::resolve_engine(data_dir, requested)? {
        EngineKind::Indexed => Ok(handle(&IndexedStore::open(&path)?, req)),
        EngineKind::Named => Ok(handle(&NamedStore::open(&path)?, req)),
    }
}

fn parse_request(matches: &ArgMatches) -> Result<Request> {
    let key = |args: &ArgMatches| args.value_of("KEY").unwrap_or_default().to_string();
    match matches.subcommand() {
        ("list", Some(_)) => Ok(Request::List),
        ("get", Some(args)) => Ok(Request::Get { key: key(args) }),
        ("add", Some(args)) => Ok(Request::Create {
            fields: parse_fields(args.value_of("FIELDS"))?,
        }),
        ("update", Some(args)) => Ok(Request::Update {
            key: key(args),
            fields: parse_fields(args.value_of("FIELDS"))?,
        }),
        ("rm", Some(args)) => Ok(Request::Delete { key: key(args) }),
        _ => Err(CrsError::Parsing("a command is required, see --help".to_string())),
    }
}

/// parses the FIELDS argument. A missing argument is an empty object
fn parse_fields(fields: Option<&str>) -> Result<Value> {
    match fields {
        None => Ok(Value::Object(Default::default())),
        Some(raw) => match serde_json::from_str(raw)? {
            obj @ Value::Object(_) => Ok(obj),
            _ => Err(CrsError::Parsing(format!("FIELDS must be a JSON object: {}", raw))),
        },
    }
}

fn print_json(body: &Value) {
    match serde_json::to_string_pretty(body) {
        Ok(body) => println!("{}", body),
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    }
}

/// configures a tracing subscriber that will log warnings to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting tracing default subscriber failed: {}", e);
    }
}
