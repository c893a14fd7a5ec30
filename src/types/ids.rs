//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one listener registration on an [`EventBus`](crate::bus::EventBus).
///
/// Registering the same closure twice yields two distinct ids, so removal
/// detaches exactly the registration the handle was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
