//! Protocol layer for dronesync.
//!
//! - [`ProtocolCommand`]: feature-tagged command values with typed
//!   arguments, as delivered by the device link.
//! - [`features`]: per-feature decoders (command -> typed event) and
//!   encoders (typed parameters -> command).
//! - [`ProtocolEnum`]: raw <-> typed mapping for protocol enums.
//! - [`DroneClient`]: async client for the drone's embedded HTTP server
//!   (flight data records, file uploads).

pub mod command;
pub mod enums;
pub mod error;
pub mod features;
pub mod http;
pub mod transport;

pub use command::{Arg, ArgReader, FeatureTag, ProtocolCommand};
pub use enums::ProtocolEnum;
pub use error::Error;
pub use http::{DroneClient, FlightLogRecord};
pub use transport::TransportConfig;
