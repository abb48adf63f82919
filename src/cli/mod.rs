pub mod app;
pub mod context;
pub mod env;
pub mod rank;
pub mod runtime;
pub mod serve;

pub use rank::{cmd_rank, parse_request, rank_file, RankArgs};
pub use serve::{cmd_serve, ServeArgs};
