#![forbid(unsafe_code)]

pub mod error;
pub mod record_client;
pub mod report;
pub mod sessions;

pub use review_core::Clock;
pub use sessions as session;

pub use error::{RecordClientError, SessionError};
pub use record_client::{
    FinalizeUpdate, HttpReviewRecordClient, RecordServiceConfig, ReviewRecordApi,
};
pub use report::render_text_report;

pub use sessions::{MarkOutcome, SessionEngine, SessionFlowService, SessionProgress, SessionTicker};
