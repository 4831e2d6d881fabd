use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Details of the request that triggered a change, when there is one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub request_url: Option<String>,
}

impl RequestContext {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip_address.into()),
            user_agent: Some(user_agent.into()),
            ..Self::default()
        }
    }
}

/// Ambient context passed explicitly into each pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationContext {
    /// `None` outside of a request (jobs, console commands, tests).
    pub request: Option<RequestContext>,
    pub batch_uuid: Option<Uuid>,
}

impl InvocationContext {
    pub fn with_request(request: RequestContext) -> Self {
        Self {
            request: Some(request),
            batch_uuid: None,
        }
    }
}
