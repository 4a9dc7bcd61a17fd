use serde::{Deserialize, Serialize};

/// A season of a show as returned by the server, in the server's season ordering.
/// Specials usually carry index 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeasonRef {
    pub rating_key: String,
    pub title: String,
    pub index: Option<u32>,
}
