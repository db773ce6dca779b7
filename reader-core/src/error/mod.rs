pub mod channel;
pub mod config;
pub mod invoker;
pub mod launch;
pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    #[error(transparent)]
    Invoker(#[from] invoker::InvokerError),

    #[error(transparent)]
    Session(#[from] session::SessionError),

    #[error(transparent)]
    Launch(#[from] launch::LaunchError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
