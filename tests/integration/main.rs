//! Integration suite: drives the public controller API end to end
//! against an in-memory price feed.

mod mock_feed;
mod simulation;
