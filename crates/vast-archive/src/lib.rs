//! Append-only, fan-out-sharded event archive, replaying write order by
//! `EventId` (§5). Modeled on `git-loose`'s zlib-compressed loose-object
//! store, but keyed by a monotone event identifier instead of a content
//! hash: there is exactly one archive per workspace, and writers are
//! never racing over the same key the way concurrent object writers can.

pub mod codec;
pub mod error;
pub mod iter;
pub mod store;

pub use error::ArchiveError;
pub use iter::ArchiveIter;
pub use store::EventArchive;
