//! Instance record and HTTP wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The (organization, space) pair an instance id must consistently map to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceScope {
    pub org_id: String,
    pub space_id: String,
}

impl InstanceScope {
    pub fn new(org_id: impl Into<String>, space_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            space_id: space_id.into(),
        }
    }
}

/// A provisioned service instance. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub org_id: String,
    pub space_id: String,
    pub created_at: DateTime<Utc>,
}

impl InstanceRecord {
    pub fn new(instance_id: impl Into<String>, scope: InstanceScope) -> Self {
        Self {
            instance_id: instance_id.into(),
            org_id: scope.org_id,
            space_id: scope.space_id,
            created_at: Utc::now(),
        }
    }

    pub fn scope(&self) -> InstanceScope {
        InstanceScope::new(self.org_id.clone(), self.space_id.clone())
    }

    /// True when both records share the full (instance, org, space) key.
    pub fn same_key(&self, other: &InstanceRecord) -> bool {
        self.instance_id == other.instance_id
            && self.org_id == other.org_id
            && self.space_id == other.space_id
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// PUT body. Only the scope fields are read; other broker fields
/// (`service_id`, `plan_id`, `parameters`) are accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub organization_guid: Option<String>,
    #[serde(default)]
    pub space_guid: Option<String>,
}

impl ProvisionRequest {
    pub fn scope(&self) -> InstanceScope {
        InstanceScope::new(
            self.organization_guid.clone().unwrap_or_default(),
            self.space_guid.clone().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionResponse {
    pub dashboard_url: String,
}
