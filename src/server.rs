use crate::command::{body_fields, Request, Response};
use crate::thread_pool::ThreadPool;
use crate::{ClientEngine, CrsError, Result};
use serde_json::Deserializer;
use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info};

/// A TCP socket server implementation over a client record storage engine.
/// It listens for incoming [`Request`]s on a [`SocketAddr`](https://doc.rust-lang.org/std/net/enum.SocketAddr.html),
/// deserializes the request, and then processes the request on a thread of its pool.
///
/// Each thread receives a handle to a [`ClientEngine`], and uses that engine to process the
/// request.
///
/// # Example
/// Create and run a new server listening on "127.0.0.1:4000", with 4 threads running on a
/// shared queue thread pool, using the id-keyed store
/// ```rust
/// use std::path::Path;
/// use crs::{CrsServer, IndexedStore};
/// use crs::thread_pool::{SharedQueueThreadPool, ThreadPool};
/// # fn main() -> crs::Result<()> {
/// let pool = SharedQueueThreadPool::new(4)?;
/// let engine = IndexedStore::open(Path::new("data/clients.json"))?;
/// let server = CrsServer::new(engine, pool);
/// //server.run("127.0.0.1:4000")?;
/// # Ok(())
/// # }
/// ```
pub struct CrsServer<E: ClientEngine, P: ThreadPool> {
    /// the engine to use
    engine: E,
    /// a pool of threads that will perform work using a handle to the engine
    pool: P,
}

impl<E: ClientEngine, P: ThreadPool> CrsServer<E, P> {
    /// Create a new `CrsServer` using the given [`ClientEngine`] and [`ThreadPool`]
    pub fn new(engine: E, pool: P) -> Self {
        CrsServer { engine, pool }
    }

    /// starts a server listening on the given address.
    /// Each connection that comes in gets serviced on a thread from the ThreadPool
    ///
    /// # Errors
    /// returns [`CrsError`] if the server could not bind to `addr`
    ///
    /// [`CrsError`]: ./enum.CrsError.html
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        self.serve_listener(listener)
    }

    /// services connections accepted on an already bound `listener`
    pub fn serve_listener(self, listener: TcpListener) -> Result<()> {
        info!("accepting connections on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let engine = self.engine.clone();
                    self.pool.spawn(move || {
                        if let Err(e) = serve(engine, stream) {
                            error!("Error on serving client: {}", e);
                        }
                    });
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }
        Ok(())
    }
}

/// Executes a single [`Request`] against `engine` and builds its [`Response`]
pub fn handle<E: ClientEngine>(engine: &E, req: Request) -> Response {
    match req {
        Request::Health => Response::health(),
        Request::List => Response::list(engine.list()),
        Request::Get { key } => match engine.get(&key) {
            Some(record) => Response::record(record),
            None => Response::from(CrsError::NotFound(format!(
                "client not found: {}",
                key
            ))),
        },
        Request::Create { fields } => match engine.create(&body_fields(fields)) {
            Ok(record) => Response::created(record),
            Err(e) => e.into(),
        },
        Request::Update { key, fields } => match engine.update(&key, &body_fields(fields)) {
            Ok(record) => Response::updated(record),
            Err(e) => e.into(),
        },
        Request::Delete { key } => match engine.delete(&key) {
            Ok(record) => Response::deleted(record),
            Err(e) => e.into(),
        },
    }
}

/// Listens for and processes [`Request`]s coming over the given `tcp` stream
/// This function will: deserialize the request, execute it against the engine,
/// and finally return a [`Response`] to the client on the `tcp` stream
fn serve<E: ClientEngine>(engine: E, tcp: TcpStream) -> Result<()> {
    let peer_addr = tcp.peer_addr()?;
    let stream_reader = BufReader::new(&tcp);
    let mut stream_writer = BufWriter::new(&tcp);
    let req_reader = Deserializer::from_reader(stream_reader).into_iter::<Request>();

    for req in req_reader {
        let req = req?;
        debug!("Receive request from {}: {:?}", peer_addr, req);

        let resp = handle(&engine, req);
        serde_json::to_writer(&mut stream_writer, &resp)?;
        stream_writer.flush()?;
        debug!("Response sent to {}: status {}", peer_addr, resp.status());
    }
    Ok(())
}
