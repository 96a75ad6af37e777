//! this binary starts the crs server
//! to see the list of options, type: `crs-server --help`

use clap::{crate_version, App, Arg};
use crs::config::{self, EngineKind};
use crs::thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use crs::{ClientEngine, CrsError, CrsServer, IndexedStore, NamedStore, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";
const DEFAULT_THREADS: &str = "4";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Pool {
    Shared,
    Rayon,
}

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    engine: EngineKind,
    data_dir: PathBuf,
    pool: Pool,
    threads: u32,
}

impl Opt {
    /// validates the command line parameters
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`CrsError::Parsing`] if one of the parameters is invalid, or if the
    /// requested engine does not match the one already used by `data_dir`
    fn build(
        addr: &str,
        req_engine: Option<&str>,
        data_dir: &str,
        pool: &str,
        threads: &str,
    ) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            CrsError::Parsing(format!("could not parse {} into an IP address and port", &addr))
        })?;
        let threads: u32 = threads
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| CrsError::Parsing(format!("invalid thread count: {}", threads)))?;
        let pool = match pool {
            "shared" => Pool::Shared,
            "rayon" => Pool::Rayon,
            other => return Err(CrsError::Parsing(format!("unknown pool: {}", other))),
        };
        let req_engine = req_engine.map(str::parse::<EngineKind>).transpose()?;
        let data_dir = PathBuf::from(data_dir);
        let engine = config::resolve_engine(&data_dir, req_engine)?;

        Ok(Opt {
            addr,
            engine,
            data_dir,
            pool,
            threads,
        })
    }
}

fn main() {
    // set up a tracing subscriber to log to STDERR
    subscriber_config();

    let matches = App::new("crs-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a client record store server")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("engine")
            .long("engine")
            .value_name("ENGINE_NAME")
            .help("sets the storage engine to use, either 'indexed' or 'named'")
            .possible_values(EngineKind::VARIANTS))
        .arg(Arg::with_name("data-dir")
            .long("data-dir")
            .value_name("DIR")
            .help("sets the directory holding the client data file")
            .default_value(config::DEFAULT_DATA_DIR))
        .arg(Arg::with_name("pool")
            .long("pool")
            .value_name("POOL")
            .help("sets the thread pool that serves connections, either 'shared' or 'rayon'")
            .possible_values(&["shared", "rayon"])
            .default_value("shared"))
        .arg(Arg::with_name("threads")
            .long("threads")
            .value_name("N")
            .help("sets the number of worker threads")
            .default_value(DEFAULT_THREADS))
        .get_matches();

    let opt = match Opt::build(
        matches.value_of("addr").unwrap_or(DEFAULT_ADDRESS),
        matches.value_of("engine"),
        matches.value_of("data-dir").unwrap_or(config::DEFAULT_DATA_DIR),
        matches.value_of("pool").unwrap_or("shared"),
        matches.value_of("threads").unwrap_or(DEFAULT_THREADS),
    ) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // start the server
    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("crs-server {}", env!("CARGO_PKG_VERSION"));
    info!("Listening on {}", opt.addr);

    let path = config::data_file(&opt.data_dir);
    info!("Data file: {:?}", path);
    match opt.engine {
        EngineKind::Indexed => run_with_engine(IndexedStore::open(&path)?, &opt),
        EngineKind::Named => run_with_engine(NamedStore::open(&path)?, &opt),
    }
}

fn run_with_engine<E: ClientEngine>(engine: E, opt: &Opt) -> Result<()> {
    match opt.pool {
        Pool::Shared => {
            CrsServer::new(engine, SharedQueueThreadPool::new(opt.threads)?).run(opt.addr)
        }
        Pool::Rayon => CrsServer::new(engine, RayonThreadPool::new(opt.threads)?).run(opt.addr),
    }
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting tracing default subscriber failed: {}", e);
    }
}
