#![cfg_attr(feature = "strict", deny(warnings))]

pub use destination::FolderId;
pub use payload::FilePayload;
pub use responses::ServerErrorBody;

mod destination;
mod payload;
mod responses;
