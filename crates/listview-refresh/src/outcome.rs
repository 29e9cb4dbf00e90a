//! Result of a create, update, or delete call.

use serde::{Deserialize, Serialize};

use listview_model::RecordId;

/// What the source reported for one mutation.
///
/// Produced by the transport layer and consumed by value, exactly once, by
/// [`RefreshCoordinator`](crate::RefreshCoordinator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationOutcome {
    #[serde(rename_all = "camelCase")]
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        affected_id: Option<RecordId>,
    },
    /// The request arrived but the server refused it (validation, conflict,
    /// permission). `message` is shown to the user verbatim.
    BusinessError { message: String },
    /// The request did not complete.
    TransportError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl MutationOutcome {
    pub fn success(affected_id: impl Into<RecordId>) -> Self {
        Self::Success {
            affected_id: Some(affected_id.into()),
        }
    }

    pub fn business_error(message: impl Into<String>) -> Self {
        Self::BusinessError {
            message: message.into(),
        }
    }

    pub fn transport_error(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Which mutation produced an outcome. Only used to word notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub(crate) fn success_text(self) -> &'static str {
        match self {
            Self::Create => "Record created",
            Self::Update => "Record updated",
            Self::Delete => "Record deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_wire_format() {
        let json = serde_json::to_string(&MutationOutcome::success(7)).unwrap();
        assert_eq!(json, r#"{"kind":"success","affectedId":7}"#);

        let json = serde_json::to_string(&MutationOutcome::business_error("Duplicate entry")).unwrap();
        assert_eq!(json, r#"{"kind":"businessError","message":"Duplicate entry"}"#);

        let outcome: MutationOutcome = serde_json::from_str(r#"{"kind":"transportError"}"#).unwrap();
        assert_eq!(outcome, MutationOutcome::TransportError { message: None });
    }
}
