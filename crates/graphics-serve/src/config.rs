use argh::FromArgs;
use graphics_io::jpeg::DEFAULT_JPEG_QUALITY;

/// Default address the server binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port the server listens on.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upper bound for request bodies (32 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 << 20;

#[derive(FromArgs, Debug)]
/// Apply convolution filters to JPEG images over HTTP.
pub struct Args {
    /// address to bind to
    #[argh(option, default = "String::from(DEFAULT_HOST)")]
    pub host: String,

    /// port to listen on
    #[argh(option, default = "DEFAULT_PORT")]
    pub port: u16,

    /// maximum size of a request body in bytes
    #[argh(option, default = "DEFAULT_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// quality of the encoded JPEG responses, from 1 to 100
    #[argh(option, default = "DEFAULT_JPEG_QUALITY")]
    pub jpeg_quality: u8,
}

/// An error type for the server configuration.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The JPEG quality is outside `1..=100`.
    #[error("Invalid JPEG quality {0}, expected a value between 1 and 100")]
    InvalidJpegQuality(u8),

    /// Requests could never be read with a zero byte limit.
    #[error("The maximum body size must be greater than zero")]
    ZeroBodyLimit,

    /// The host is empty.
    #[error("The host must not be empty")]
    EmptyHost,
}

/// Validated server settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum size of a request body in bytes.
    pub max_body_bytes: usize,
    /// Quality of the encoded JPEG responses.
    pub jpeg_quality: u8,
}

impl ServerConfig {
    /// Check the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidJpegQuality(self.jpeg_quality));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(())
    }

    /// `host:port` as passed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let config = Self {
            host: args.host,
            port: args.port,
            max_body_bytes: args.max_body_bytes,
            jpeg_quality: args.jpeg_quality,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["graphics-serve"], args).expect("valid command line")
    }

    #[test]
    fn defaults() -> Result<(), ConfigError> {
        let config = ServerConfig::try_from(parse(&[]))?;
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.max_body_bytes, 33_554_432);
        assert_eq!(config.jpeg_quality, 75);
        Ok(())
    }

    #[test]
    fn overrides() -> Result<(), ConfigError> {
        let args = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--max-body-bytes",
            "1024",
            "--jpeg-quality",
            "90",
        ]);
        let config = ServerConfig::try_from(args)?;
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.jpeg_quality, 90);
        Ok(())
    }

    #[test]
    fn rejects_invalid_values() {
        let res = ServerConfig::try_from(parse(&["--jpeg-quality", "0"]));
        assert_eq!(res, Err(ConfigError::InvalidJpegQuality(0)));

        let res = ServerConfig::try_from(parse(&["--jpeg-quality", "101"]));
        assert_eq!(res, Err(ConfigError::InvalidJpegQuality(101)));

        let res = ServerConfig::try_from(parse(&["--max-body-bytes", "0"]));
        assert_eq!(res, Err(ConfigError::ZeroBodyLimit));

        let res = ServerConfig::try_from(parse(&["--host", ""]));
        assert_eq!(res, Err(ConfigError::EmptyHost));
    }

    #[test]
    fn rejects_unparsable_arguments() {
        assert!(Args::from_args(&["graphics-serve"], &["--port", "http"]).is_err());
        assert!(Args::from_args(&["graphics-serve"], &["--jpeg-quality", "300"]).is_err());
    }
}
