#![forbid(unsafe_code)]

mod config;
mod error;
mod intent;

pub use config::StoreConfig;
pub use error::*;
pub use intent::Intent;

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 6480;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const MAX_CONNECTIONS: usize = 1024;
pub const INITIAL_BUFFER_CAPACITY: usize = 512;
pub const MAX_FRAME_SIZE: usize = 64 * 1024; // 64 KB, valores são minúsculos
/// Requests são arrays planos de bulks.
pub const MAX_FRAME_DEPTH: usize = 2;
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Estado de redirect não tem motivo para viver mais de um dia.
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// 128 bits de entropia.
pub const MIN_KEY_BYTES: usize = 16;
