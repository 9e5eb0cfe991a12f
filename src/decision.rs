use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
/// Principal reported on every Deny.
pub const ANONYMOUS_PRINCIPAL: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    pub context: DecisionContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

/// Values forwarded to downstream handlers as the caller's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub full_name: String,
    pub profile_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecisionContext {
    Identity(IdentityContext),
    Error { error: String },
}

impl AccessDecision {
    pub fn allow(resource: impl Into<String>, identity: IdentityContext) -> Self {
        Self {
            principal_id: identity.user_id.clone(),
            policy_document: PolicyDocument::single(Effect::Allow, resource.into()),
            context: DecisionContext::Identity(identity),
        }
    }

    pub fn deny(resource: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            principal_id: ANONYMOUS_PRINCIPAL.to_string(),
            policy_document: PolicyDocument::single(Effect::Deny, resource.into()),
            context: DecisionContext::Error {
                error: error.into(),
            },
        }
    }

    /// Effect of the (single) statement.
    pub fn effect(&self) -> Effect {
        self.policy_document
            .statement
            .first()
            .map(|s| s.effect)
            .unwrap_or(Effect::Deny)
    }

    pub fn is_allowed(&self) -> bool {
        self.effect() == Effect::Allow
    }

    pub fn resource(&self) -> Option<&str> {
        self.policy_document
            .statement
            .first()
            .map(|s| s.resource.as_str())
    }

    pub fn identity(&self) -> Option<&IdentityContext> {
        match &self.context {
            DecisionContext::Identity(identity) => Some(identity),
            DecisionContext::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.context {
            DecisionContext::Error { error } => Some(error),
            DecisionContext::Identity(_) => None,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        // All fields are plain strings; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl PolicyDocument {
    fn single(effect: Effect, resource: String) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource,
            }],
        }
    }
}
