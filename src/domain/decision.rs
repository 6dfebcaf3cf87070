use serde::{Deserialize, Serialize};
use std::fmt;

/// Known policy actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Allow,
    Deny,
    NeedsApproval,
    Unrecognized,
}

/// Action the policy endpoint asks the caller to take.
///
/// Holds the value exactly as the endpoint sent it, so an echoed decision
/// is byte-for-byte the server's. Matching against the known set is
/// case-insensitive and happens in [`PolicyAction::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyAction(String);

impl PolicyAction {
    pub fn new(action: impl Into<String>) -> Self {
        PolicyAction(action.into())
    }

    /// Wire representation, as received.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> ActionKind {
        match self.0.to_lowercase().as_str() {
            "allow" => ActionKind::Allow,
            "deny" => ActionKind::Deny,
            "needsapproval" => ActionKind::NeedsApproval,
            _ => ActionKind::Unrecognized,
        }
    }
}

impl From<&str> for PolicyAction {
    fn from(s: &str) -> Self {
        PolicyAction::new(s)
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decision returned by the policy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    #[serde(default)]
    pub action_to_take: PolicyAction,

    /// Identifier correlating the decision with the submitted event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Fields we don't interpret, kept so the decision can be echoed intact
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PolicyDecision {
    pub fn new(action_to_take: PolicyAction, event_id: impl Into<String>) -> Self {
        PolicyDecision {
            action_to_take,
            event_id: Some(event_id.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Event ID, or "N/A" when the endpoint omitted it.
    pub fn event_id_or_na(&self) -> &str {
        self.event_id.as_deref().unwrap_or("N/A")
    }

    /// Classify the decision for the caller.
    pub fn classify(&self) -> Classification {
        match self.action_to_take.kind() {
            ActionKind::NeedsApproval => Classification::ManualReview,
            ActionKind::Allow | ActionKind::Deny => Classification::Automated,
            ActionKind::Unrecognized => {
                Classification::Unrecognized(self.action_to_take.as_str().to_string())
            }
        }
    }
}

/// What the caller should do with a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Flag for manual review
    ManualReview,
    /// Allow/deny was decided automatically, nothing further to do
    Automated,
    /// Action outside the known set; reported as-is
    Unrecognized(String),
}

impl Classification {
    /// One-line advisory shown to the operator.
    pub fn advisory(&self) -> String {
        match self {
            Classification::ManualReview => {
                "Manual review required. Use the event ID to follow up on the dashboard.".to_string()
            }
            Classification::Automated => "Automated decision returned.".to_string(),
            Classification::Unrecognized(action) => format!("Unrecognized action: {}", action),
        }
    }
}
