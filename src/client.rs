use crate::command::{Request, Response};
use crate::{CrsError, Result};
use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::{Deserializer, Value};
use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

/// `CrsClient` contains the functionality for communication with a [`CrsServer`]
///
/// [`CrsServer`]: ./struct.CrsServer.html
pub struct CrsClient {
    reader: Deserializer<IoRead<BufReader<TcpStream>>>,
    writer: BufWriter<TcpStream>,
}

impl CrsClient {
    /// creates a client and establishes a socket connection to the server at the given `addr`
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;

        Ok(CrsClient {
            reader: Deserializer::from_reader(BufReader::new(tcp_reader)),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// sends `req` and waits for its response
    /// ## Returns
    /// the response body if the server answered with a success status.
    /// # Errors
    /// an error response is turned back into a [`CrsError`] matching its status, so a 404
    /// becomes `CrsError::NotFound`, a 409 `CrsError::Conflict` and so on
    pub fn send(&mut self, req: &Request) -> Result<Value> {
        serde_json::to_writer(&mut self.writer, req)?;
        self.writer.flush()?;

        match Response::deserialize(&mut self.reader)? {
            Response::Ok { body, .. } => Ok(body),
            Response::Err { status, error } => Err(CrsError::from_status(status, error)),
        }
    }

    /// checks that the server is running
    pub fn health(&mut self) -> Result<Value> {
        self.send(&Request::Health)
    }

    /// gets every client from the server
    pub fn list(&mut self) -> Result<Value> {
        self.send(&Request::List)
    }

    /// gets the client resolved by `key`
    pub fn get(&mut self, key: &str) -> Result<Value> {
        self.send(&Request::Get { key: key.to_string() })
    }

    /// creates a client from `fields`
    pub fn create(&mut self, fields: Value) -> Result<Value> {
        self.send(&Request::Create { fields })
    }

    /// applies `fields` to the client resolved by `key`
    pub fn update(&mut self, key: &str, fields: Value) -> Result<Value> {
        self.send(&Request::Update {
            key: key.to_string(),
            fields,
        })
    }

    /// removes the client resolved by `key`
    pub fn delete(&mut self, key: &str) -> Result<Value> {
        self.send(&Request::Delete { key: key.to_string() })
    }
}
