//! Target acquisition: the target collection and the asynchronous handshake
//! that fills it.

mod collection;
mod session;

pub use collection::{Target, TargetCollection, TargetForm};
pub use session::{TargetMacro, TargetingInput, TargetingNotice, TargetingSession};
