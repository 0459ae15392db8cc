mod config;
mod decode;
mod io;
mod listing;
mod scorer;

pub use config::ConfigError;
pub use decode::DecodeError;
pub use io::IoError;
pub use listing::ListingError;
pub use scorer::ScorerError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Io(#[from] IoError),
}

pub type Result<T> = std::result::Result<T, Error>;
