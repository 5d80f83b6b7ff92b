//! Feed transport and its typed client wrapper.

mod truck_feed;

pub use truck_feed::{TruckFeed, TruckFeedClient};
