//! Configuration management for the video server.
//!
//! Options come from command-line arguments via clap, each with an
//! environment variable fallback and a default:
//!
//! - `VIDEO_HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 8095; an empty value also means 8095)
//! - `VIDEO_ROOT` - Directory video files are served from (default: /app/output)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use video_server::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::server::DEFAULT_ROOT;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8095;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Video Server - serves pre-rendered video segments over HTTP.
///
/// Files under the root directory are exposed at `/video/`. Only MP4, WebM,
/// HLS and DASH segment and manifest files are served.
#[derive(Parser, Debug, Clone)]
#[command(name = "video-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "VIDEO_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_PORT,
        env = "PORT",
        value_parser = parse_port
    )]
    pub port: u16,

    /// Directory video files are served from.
    #[arg(long, default_value = DEFAULT_ROOT, env = "VIDEO_ROOT")]
    pub root: PathBuf,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

/// Parse a port, treating an empty value as unset.
fn parse_port(value: &str) -> Result<u16, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    value
        .parse()
        .map_err(|_| format!("invalid port number: {}", value))
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }

        if self.root.as_os_str().is_empty() {
            return Err("Root directory is required. Set --root or VIDEO_ROOT".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
