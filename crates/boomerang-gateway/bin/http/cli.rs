use boomerang_pool::pool::DEFAULT_CAPACITY;
use boomerang_shortener::reaper::MAX_INTERVAL;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "BOOMERANG_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "BOOMERANG_BASE_URL";
pub const RECLAIM_INTERVAL_ENV: &str = "BOOMERANG_RECLAIM_INTERVAL_SECS";
pub const ID_CAPACITY_ENV: &str = "BOOMERANG_ID_CAPACITY";
pub const RETRY_ATTEMPTS_ENV: &str = "BOOMERANG_RETRY_ATTEMPTS";
pub const LOG_FORMAT_ENV: &str = "BOOMERANG_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_RECLAIM_INTERVAL_SECS: u64 = 60;
pub const MAX_RECLAIM_INTERVAL_SECS: u64 = MAX_INTERVAL.as_secs();
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "boomerang-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix of every short URL handed out, e.g. `https://sho.rt`.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = RECLAIM_INTERVAL_ENV,
        default_value_t = DEFAULT_RECLAIM_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_RECLAIM_INTERVAL_SECS),
    )]
    pub reclaim_interval_secs: u64,

    #[arg(
        long,
        env = ID_CAPACITY_ENV,
        default_value_t = DEFAULT_CAPACITY,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub id_capacity: u64,

    #[arg(
        long,
        env = RETRY_ATTEMPTS_ENV,
        default_value_t = DEFAULT_RETRY_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    pub retry_attempts: u32,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,
}
