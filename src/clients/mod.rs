//! External collaborators: the mail/SMS relay and the media store. These
//! are interfaces the core consumes, not functionality it owns.

pub mod dispatcher;
pub mod media;

pub use dispatcher::{HttpMessageDispatcher, MessageDispatcher};
pub use media::{HttpMediaStore, MediaStore};
