#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod extract;
pub mod normalize;
mod portal;
mod prelude;
mod reading;
mod transport;

pub use self::{
    client::{PortalClient, SUGGESTED_REFRESH_INTERVAL},
    config::{Config, Credentials},
    error::{CredentialsRejected, Error},
    portal::DEFAULT_BASE_URL,
    reading::{Category, Reading, Readings, THERM_KILOWATT_HOURS},
    transport::{Transport, UreqTransport},
};
