use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque token scoping a conversation on the remote side.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Generates a fresh, globally unique identity.
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identity as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ThreadId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ThreadId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl FromStr for ThreadId {
    type Err = std::convert::Infallible;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

/// A request to be sent to the remote assistant, one per submission.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The trimmed user query.
    pub user_query: String,
    /// The thread this query belongs to.
    pub thread_id: ThreadId,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let req = ChatRequest {
            user_query: "여름에 쓰기 좋은 시트러스 향수".to_owned(),
            thread_id: ThreadId::from("T1"),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "user_query": "여름에 쓰기 좋은 시트러스 향수",
                "thread_id": "T1",
            })
        );
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = ThreadId::generate();
        let b = ThreadId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }
}
