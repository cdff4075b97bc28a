//! Integration-status gate for the node palette.
//!
//! Certain node types only make sense when an external integration is
//! connected: a meeting-scheduling node needs a calendar, a CRM-update node
//! needs a CRM. The gate turns the server-reported integration map into
//! palette annotations. It is advisory only: it decides whether a type may
//! be freely added, and a graph already containing an unconfigured-required
//! node stays structurally valid.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External service category a node type may depend on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntegrationKind {
    Calendar,
    Crm,
    Email,
    Telephony,
}

impl IntegrationKind {
    /// Display name used in palette messages.
    pub fn label(&self) -> &'static str {
        match self {
            IntegrationKind::Calendar => "Calendar",
            IntegrationKind::Crm => "CRM",
            IntegrationKind::Email => "Email",
            IntegrationKind::Telephony => "Telephony",
        }
    }
}

/// Server-reported state of one integration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct IntegrationStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Palette annotation for a node type with an integration dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub kind: IntegrationKind,
    pub required: bool,
    pub configured: bool,
    pub message: String,
}

/// Static dependency table: node type, integration it needs, whether the
/// dependency is hard. Missing from the table means no dependency.
const DEPENDENCIES: &[(&str, IntegrationKind, bool)] = &[
    ("schedule_meeting", IntegrationKind::Calendar, true),
    ("crm_update", IntegrationKind::Crm, true),
    ("email", IntegrationKind::Email, false),
];

/// Advisory palette gate over a fetched integration-status map.
#[derive(Debug, Clone, Default)]
pub struct IntegrationGate {
    statuses: HashMap<IntegrationKind, IntegrationStatus>,
}

impl IntegrationGate {
    pub fn new(statuses: HashMap<IntegrationKind, IntegrationStatus>) -> Self {
        Self {
            statuses,
        }
    }

    /// Build a gate from raw string-keyed statuses, ignoring integration
    /// kinds this client does not know about.
    pub fn from_raw(statuses: HashMap<String, IntegrationStatus>) -> Self {
        let statuses = statuses
            .into_iter()
            .filter_map(|(key, status)| IntegrationKind::from_str(&key).ok().map(|kind| (kind, status)))
            .collect();
        Self {
            statuses,
        }
    }

    /// The palette annotation for `node_type`, or None when the type has no
    /// integration dependency. An integration absent from the status map
    /// counts as unconfigured.
    pub fn requirement_for(
        &self,
        node_type: &str,
    ) -> Option<Requirement> {
        let (_, kind, required) = DEPENDENCIES.iter().find(|(t, _, _)| *t == node_type)?;
        let status = self.statuses.get(kind);
        let configured = status.map(|s| s.configured).unwrap_or(false);

        let message = if configured {
            let provider = status.and_then(|s| s.provider.as_deref()).unwrap_or("unknown");
            format!("{}: {}", kind.label(), provider)
        } else if *required {
            format!("{} integration required", kind.label())
        } else {
            format!("{} integration recommended", kind.label())
        };

        Some(Requirement {
            kind: *kind,
            required: *required,
            configured,
            message,
        })
    }

    /// Whether `node_type` may be freely added: true unless its requirement
    /// is required and unconfigured.
    pub fn can_add(
        &self,
        node_type: &str,
    ) -> bool {
        match self.requirement_for(node_type) {
            None => true,
            Some(requirement) if !requirement.required => true,
            Some(requirement) => requirement.configured,
        }
    }
}
