use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Remote account details for the logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
}

/// The authenticated session, persisted as `user.data` while logged in
/// and deleted on logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Bearer token presented on authenticated calls
    pub token: String,

    pub profile: UserProfile,

    /// Ids of mods the user is subscribed to, diffed on every sync pass
    pub subscribed_mod_ids: BTreeSet<u64>,
}

impl AuthenticatedUser {
    pub fn new(token: String, profile: UserProfile) -> Self {
        Self {
            token,
            profile,
            subscribed_mod_ids: BTreeSet::new(),
        }
    }

    pub fn is_subscribed(&self, mod_id: u64) -> bool {
        self.subscribed_mod_ids.contains(&mod_id)
    }
}
