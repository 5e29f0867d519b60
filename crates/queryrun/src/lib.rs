pub mod error;
pub mod transport;
pub mod signer;
pub mod config;
pub mod logging;
pub mod client;
pub mod executor;
pub mod mock_transport;

pub use error::Result;
pub use error::Error;

pub use transport::Transport;
pub use transport::TransportError;
pub use transport::Response;

pub use signer::Signer;
pub use signer::Hasher;
pub use signer::Sha256Hasher;

pub use config::ClientConfig;

pub use client::Client;
