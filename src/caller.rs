use crate::decision::IdentityContext;
use serde_json::{Map, Value};

/// Caller identity as seen by a handler running behind the authorizer.
///
/// Handlers trust these values unconditionally; they are only ever produced
/// by an Allow decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub full_name: String,
    pub profile_image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CallerContextError {
    #[error("Authorizer context is missing")]
    MissingContext,
    #[error("User ID not found in authorizer context")]
    MissingUserId,
}

impl CallerContextError {
    /// Handlers answer both cases as unauthenticated.
    pub fn status_code(self) -> u16 {
        401
    }
}

impl CallerIdentity {
    /// Reads the identity from the `requestContext.authorizer` map forwarded
    /// with each request.
    pub fn from_context(context: Option<&Map<String, Value>>) -> Result<Self, CallerContextError> {
        let context = context.ok_or(CallerContextError::MissingContext)?;
        let field = |name: &str| {
            context
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let user_id = field("user_id");
        if user_id.is_empty() {
            return Err(CallerContextError::MissingUserId);
        }
        Ok(Self {
            user_id,
            email: field("email"),
            role: field("role"),
            full_name: field("full_name"),
            profile_image_url: field("profile_image_url"),
        })
    }

    /// Same as [`CallerIdentity::from_context`], starting from a proxy event's
    /// `requestContext`.
    pub fn from_request_context(request_context: &Value) -> Result<Self, CallerContextError> {
        Self::from_context(
            request_context
                .get("authorizer")
                .and_then(Value::as_object),
        )
    }
}

impl From<IdentityContext> for CallerIdentity {
    fn from(context: IdentityContext) -> Self {
        Self {
            user_id: context.user_id,
            email: context.email,
            role: context.role,
            full_name: context.full_name,
            profile_image_url: context.profile_image_url,
        }
    }
}
