use crate::decision::IdentityContext;
use crate::error::Error;
use serde_json::Value;

/// Identity fields read from a verified token payload.
///
/// Only `sub` is required. Profile fields come from the social login
/// provider and may be absent; the `*_or_empty` accessors default them to
/// `""` so the forwarded context is always a complete set of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub subject: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl IdentityClaims {
    pub fn from_claims(claims: &Value) -> Result<Self, Error> {
        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| Error::InvalidToken("token has no sub claim".to_string()))?;
        let metadata = claims.get("user_metadata").filter(|m| m.is_object());
        Ok(Self {
            subject: subject.to_string(),
            email: claim_string(claims.get("email")),
            role: claim_string(claims.get("role")),
            full_name: claim_string(metadata.and_then(|m| m.get("full_name"))),
            avatar_url: claim_string(metadata.and_then(|m| m.get("avatar_url"))),
        })
    }

    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn role_or_empty(&self) -> &str {
        self.role.as_deref().unwrap_or_default()
    }

    pub fn full_name_or_empty(&self) -> &str {
        self.full_name.as_deref().unwrap_or_default()
    }

    pub fn avatar_url_or_empty(&self) -> &str {
        self.avatar_url.as_deref().unwrap_or_default()
    }

    pub fn to_context(&self) -> IdentityContext {
        IdentityContext {
            user_id: self.subject.clone(),
            email: self.email_or_empty().to_string(),
            role: self.role_or_empty().to_string(),
            full_name: self.full_name_or_empty().to_string(),
            profile_image_url: self.avatar_url_or_empty().to_string(),
        }
    }
}

// Strings pass through, numbers are rendered; anything else counts as absent.
fn claim_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
