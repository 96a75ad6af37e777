//! The crs-client executable supports the following command line arguments:
//!
//! `crs-client health [--addr IP-PORT]`
//!
//!     Check that the server is running.
//!
//! `crs-client list [--addr IP-PORT]`
//!
//!     Print every client.
//!
//! `crs-client get <KEY> [--addr IP-PORT]`
//!
//!     Print the client with the given id or name.
//!
//! `crs-client add [FIELDS] [--addr IP-PORT]`
//!
//!     Create a client. FIELDS is a JSON object such as '{"name": "Acme", "service": "hosting"}'.
//!
//! `crs-client update <KEY> [FIELDS] [--addr IP-PORT]`
//!
//!     Update the fields of a client present in FIELDS.
//!
//! `crs-client rm <KEY> [--addr IP-PORT]`
//!
//!     Remove a client.
//!
//! --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT.
//! If --addr is not specified then connect on 127.0.0.1:4000.
//! The response body is printed as JSON. An error and a non-zero exit code are returned on
//! server error, or if IP-PORT or FIELDS do not parse.

use clap::{crate_version, App, Arg, ArgMatches, SubCommand};
use crs::{CrsClient, CrsError, Request, Result};
use serde_json::Value;
use std::net::SocketAddr;
use std::process::exit;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    req: Request,
}

impl Opt {
    /// validates the `addr` parameter is a valid IP address and PORT
    /// # Errors
    /// returns [`CrsError::Parsing`] if `addr` is invalid
    fn build(addr: &str, req: Request) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            CrsError::Parsing(format!("could not parse {} into an IP address and port", &addr))
        })?;

        Ok(Opt { addr, req })
    }
}

fn main() {
    // configure a subscriber that will log messages to STDERR
    subscriber_config();

    let key_arg = || Arg::with_name("KEY").help("a client id or name").required(true).index(1);
    let addr_arg = || {
        Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT of the server to connect to")
            .default_value(DEFAULT_ADDRESS)
    };
    let matches = App::new("crs-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a client record store client")
        .subcommands(vec![
            SubCommand::with_name("health")
                .about("Check that the server is running")
                .arg(addr_arg()),
            SubCommand::with_name("list")
                .about("List every client")
                .arg(addr_arg()),
            SubCommand::with_name("get")
                .about("Get a client by id or name")
                .arg(key_arg())
                .arg(addr_arg()),
            SubCommand::with_name("add")
                .about("Create a client")
                .arg(Arg::with_name("FIELDS").help("a JSON object").index(1))
                .arg(addr_arg()),
            SubCommand::with_name("update")
                .about("Update the given fields of a client")
                .arg(key_arg())
                .arg(Arg::with_name("FIELDS").help("a JSON object").index(2))
                .arg(addr_arg()),
            SubCommand::with_name("rm")
                .about("Remove a client")
                .arg(key_arg())
                .arg(addr_arg()),
        ])
        .get_matches();

    let result = parse_options(&matches).and_then(run);
    match result {
        Ok(body) => match serde_json::to_string_pretty(&body) {
            Ok(body) => println!("{}", body),
            Err(e) => {
                eprintln!("{}", e);
                exit(1);
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    }
}

/// sends the request in `opt` to the server and returns the response body
fn run(opt: Opt) -> Result<Value> {
    let mut client = CrsClient::connect(opt.addr)?;
    client.send(&opt.req)
}

/// parses the matches from the command line into an [`Opt`] struct
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    let key = |args: &ArgMatches| args.value_of("KEY").unwrap_or_default().to_string();
    let addr = matches
        .subcommand()
        .1
        .and_then(|args| args.value_of("addr"))
        .unwrap_or(DEFAULT_ADDRESS);
    let req = match matches.subcommand() {
        ("health", Some(_)) => Request::Health,
        ("list", Some(_)) => Request::List,
        ("get", Some(args)) => Request::Get { key: key(args) },
        ("add", Some(args)) => Request::Create {
            fields: parse_fields(args.value_of("FIELDS"))?,
        },
        ("update", Some(args)) => Request::Update {
            key: key(args),
            fields: parse_fields(args.value_of("FIELDS"))?,
        },
        ("rm", Some(args)) => Request::Delete { key: key(args) },
        _ => {
            return Err(CrsError::Parsing(
                "a command is required, see --help".to_string(),
            ))
        }
    };
    Opt::build(addr, req)
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

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting tracing default subscriber failed: {}", e);
    }
}
