//! In-memory photo metadata index and filter engine.
//!
//! [`MediaTable`] loads the delimited metadata export once at startup and
//! answers parsed queries ([`magpie_syntax::Query`]) with a narrowed record
//! set, a stream of [`Notice`]s describing each narrowing step, and a
//! [`ResultClass`]. [`SessionStore`] keeps each user's latest result set for
//! pagination.

mod notice;
mod record;
mod search;
mod session;
mod table;

pub use notice::*;
pub use record::*;
pub use search::*;
pub use session::*;
pub use table::*;
