use std::sync::Arc;

use crate::collaborators::Collaborators;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState<R> {
    pub collaborators: Arc<Collaborators>,
    pub events: R,
    pub server_name: String,
}

impl<R: Clone> AppState<R> {
    pub fn event_repo(&self) -> R {
        self.events.clone()
    }
}
