//! Staff directory.
//!
//! Maps local staff identifiers (as selected in the report form) to Notion
//! person identifiers. The directory is loaded from configuration and shared
//! by the server handler and, through `GET /api/staff`, the client.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// External id value meaning "not yet provisioned in Notion".
pub const PLACEHOLDER_EXTERNAL_ID: &str = "REPLACE_WITH_REAL_NOTION_USER_ID";

/// A single staff member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StaffMember {
    /// Identifier used by the report form.
    pub local_id: String,
    /// Name shown in the sender/recipient pickers.
    pub display_name: String,
    /// Notion person id. Empty or the placeholder sentinel when unprovisioned.
    #[serde(default)]
    pub external_id: String,
}

impl StaffMember {
    /// Create a staff member.
    pub fn new(
        local_id: impl Into<String>,
        display_name: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            display_name: display_name.into(),
            external_id: external_id.into(),
        }
    }

    /// The Notion person id, if one has been provisioned.
    #[must_use]
    pub fn provisioned_external_id(&self) -> Option<&str> {
        let id = self.external_id.trim();
        if id.is_empty() || id == PLACEHOLDER_EXTERNAL_ID {
            None
        } else {
            Some(id)
        }
    }
}

/// Public view of a staff member. External ids are not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffListing {
    /// Identifier used by the report form.
    pub local_id: String,
    /// Display name.
    pub display_name: String,
    /// Whether the member can be tagged in Notion.
    pub provisioned: bool,
}

impl From<&StaffMember> for StaffListing {
    fn from(member: &StaffMember) -> Self {
        Self {
            local_id: member.local_id.clone(),
            display_name: member.display_name.clone(),
            provisioned: member.provisioned_external_id().is_some(),
        }
    }
}

/// Immutable, cheaply cloneable staff directory.
#[derive(Debug, Clone, Default)]
pub struct StaffDirectory {
    members: Arc<Vec<StaffMember>>,
    by_local_id: Arc<HashMap<String, usize>>,
}

impl StaffDirectory {
    /// Build a directory. Later entries with a duplicate `local_id` are ignored.
    #[must_use]
    pub fn new(members: Vec<StaffMember>) -> Self {
        let mut kept = Vec::with_capacity(members.len());
        let mut by_local_id = HashMap::with_capacity(members.len());

        for member in members {
            if by_local_id.contains_key(&member.local_id) {
                tracing::warn!(local_id = %member.local_id, "Duplicate staff entry ignored");
                continue;
            }
            by_local_id.insert(member.local_id.clone(), kept.len());
            kept.push(member);
        }

        Self {
            members: Arc::new(kept),
            by_local_id: Arc::new(by_local_id),
        }
    }

    /// Look up a member by local id.
    #[must_use]
    pub fn get(&self, local_id: &str) -> Option<&StaffMember> {
        self.by_local_id
            .get(local_id)
            .and_then(|&index| self.members.get(index))
    }

    /// Whether the directory knows this local id.
    #[must_use]
    pub fn contains(&self, local_id: &str) -> bool {
        self.by_local_id.contains_key(local_id)
    }

    /// All members in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &StaffMember> {
        self.members.iter()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Map local ids to provisioned Notion person ids.
    ///
    /// Unknown ids and members without a provisioned external id are skipped
    /// silently; a report may reference staff that cannot be tagged yet.
    pub fn external_ids<'a, I, S>(&'a self, local_ids: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        local_ids
            .into_iter()
            .filter_map(|id| self.get(id.as_ref()))
            .filter_map(StaffMember::provisioned_external_id)
            .collect()
    }

    /// Public listings for the client.
    #[must_use]
    pub fn listings(&self) -> Vec<StaffListing> {
        self.members.iter().map(StaffListing::from).collect()
    }
}

impl From<Vec<StaffListing>> for StaffDirectory {
    /// Client-side directory built from the public listing; external ids are
    /// never known on the client.
    fn from(listings: Vec<StaffListing>) -> Self {
        Self::new(
            listings
                .into_iter()
                .map(|l| StaffMember::new(l.local_id, l.display_name, ""))
                .collect(),
        )
    }
}
