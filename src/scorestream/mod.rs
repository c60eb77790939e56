pub mod models;
pub mod rpc;

pub use models::{Game, GameScore, ScoreUser, Team};
pub use rpc::HttpTransport;

/// Public ScoreStream JSON-RPC endpoint
pub const DEFAULT_API_URL: &str = "https://scorestream.com/api/";

/// Organization the games search is scoped to
pub const DEFAULT_ORGANIZATION_ID: i64 = 1000;

/// `gameSegmentId` reported once a game is over
pub const FINAL_SEGMENT_ID: i32 = 19999;
