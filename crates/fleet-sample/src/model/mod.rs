//! Domain records shared by the feed and its consumers.

mod truck;

pub use truck::{Truck, TruckQuery, TruckStatus};
