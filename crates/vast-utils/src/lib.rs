pub mod decimal;
pub mod error;
pub mod lockfile;
pub mod path;

pub use error::UtilError;
pub use lockfile::LockFile;

pub type Result<T> = std::result::Result<T, UtilError>;
