//! Endpoint URL resolution for `when.endpoint` triggers.
//!
//! URL formatting belongs to the API layer; the compiler only decorates the
//! trigger node with whatever the resolver returns.

pub trait EndpointResolver {
    fn endpoint_url(&self, slug: &str) -> String;
}

impl<F> EndpointResolver for F
where
    F: Fn(&str) -> String,
{
    fn endpoint_url(&self, slug: &str) -> String {
        self(slug)
    }
}

/// Webhook URLs served by a workspace: `{api_url}/workspaces/{id}/webhooks/{slug}`.
#[derive(Debug, Clone)]
pub struct WorkspaceEndpoints {
    pub api_url: String,
    pub workspace_id: String,
}

impl EndpointResolver for WorkspaceEndpoints {
    fn endpoint_url(&self, slug: &str) -> String {
        format!(
            "{}/workspaces/{}/webhooks/{}",
            self.api_url.trim_end_matches('/'),
            self.workspace_id,
            slug
        )
    }
}
