pub mod error;
pub mod event;
pub mod fields;
pub mod outcome;
pub mod types;

pub use error::PreconditionError;
pub use event::{ClientMessage, WsEvent};
pub use fields::{or_na, NOT_AVAILABLE};
pub use outcome::{OutcomeKind, ProbeOutcome};
pub use types::{
    BoundingBox, HealthInfo, ImagePayload, OcrResult, ProbeRequest, StatusInfo, TextBlock,
    IMAGE_MIME,
};
