use serde::{Deserialize, Serialize};

/// Operational state of a tracked vehicle, as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruckStatus {
    Moving,
    Idle,
    Offline,
}

/// A single tracked vehicle.
///
/// Deserialized from the feed's extracted `result.items` records after the
/// schema has run, so `last_seen` is already a normalized timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: TruckStatus,
    /// Epoch milliseconds.
    pub last_seen: i64,
}

/// Header filters applied to the fleet feed.
///
/// Serialized as the request payload; the controller's structural payload
/// comparison makes two equal queries a single dispatch. Unset fields are
/// omitted from the payload so `{}` and "no filters" serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TruckQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TruckStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
