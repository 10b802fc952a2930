// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Error reported by the running simulator.
    #[error("simulator error, code:{}, msg:{}", .0.code, .0.msg)]
    Remote(RemoteError),
    /// Error about the connection.
    /// It will be thrown while the connection between client and simulator
    /// is broken or cannot be established in time.
    #[error("connection error: {0}")]
    Connect(String),
    /// Error from the client itself, basically the request has not been
    /// sent to the simulator yet.
    #[error("client error: {0}")]
    Client(String),
    /// Tree rejected by structural validation.
    #[error("invalid tree: {0}")]
    InvalidTree(String),
    /// Tree file could not be parsed or rendered.
    #[error("tree format error: {0}")]
    TreeFormat(#[from] serde_json::Error),
    /// The buffer does not hold a complete frame yet.
    #[error("incomplete frame in buffer")]
    InsufficientData,
    /// Malformed frame on the wire.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Error unknown.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Status reported by the simulator in a response frame.
#[derive(Debug, Clone)]
pub struct RemoteError {
    pub code: u32,
    pub msg: String,
}

pub type Result<T> = std::result::Result<T, Error>;
