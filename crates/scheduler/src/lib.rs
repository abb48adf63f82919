pub mod api;
pub mod error;
pub mod executor;
pub mod listener;
pub mod metrics;
pub mod model;
pub mod queue;
pub mod transport;
pub mod worker;

pub use api::{Pipeline, PipelineReport};
pub use error::SchedulerError;
pub use executor::RequestExecutor;
pub use model::{OutboundMessage, PipelineConfig, RunRequest, RunResponse};
pub use transport::{ChannelInbound, InboundStream, ReplyHandle};
