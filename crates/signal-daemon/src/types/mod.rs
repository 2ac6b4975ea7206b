//! Wire types exchanged with the signal-cli daemon.

mod envelope;
mod group;
mod send;

pub use envelope::{Attachment, DataMessage, Envelope, GroupInfo, Mention, Quote, ReceiveEvent};
pub use group::{GroupDetails, GroupMember};
pub use send::{AttachmentData, AttachmentParams, SendParams, SendResult, TypingParams};
