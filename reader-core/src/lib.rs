pub mod channel;
pub mod config;
pub mod error;
pub mod invoker;
pub mod launcher;
pub mod session;
pub mod workflow;

#[cfg(test)]
mod tests;

pub const READER_BINARY: &str = "absorbance96app";
pub const READER_SERVICE_HOSTNAME: &str = "127.0.0.1";
pub const READER_SERVICE_BASE_URL: &str =
    const_format::concatcp!("http://", READER_SERVICE_HOSTNAME);
pub const DEFAULT_SERVICE_PORT: u16 = 50051;
