use std::future::Future;

use uuid::Uuid;

use crate::domain::types::{EventListener, EventListenerChanges};
use crate::error::WebservicesError;

/// Storage for event listeners.
///
/// Futures are spelled out as `Send` so generic axum handlers stay `Send`.
pub trait EventListenerRepository: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<EventListener>, WebservicesError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<EventListener>, WebservicesError>> + Send;

    fn create(
        &self,
        listener: &EventListener,
    ) -> impl Future<Output = Result<(), WebservicesError>> + Send;

    /// Applies `changes` and returns the stored listener, or `None` if it does not exist.
    fn update(
        &self,
        id: Uuid,
        changes: &EventListenerChanges,
    ) -> impl Future<Output = Result<Option<EventListener>, WebservicesError>> + Send;

    /// Returns `true` if a row was deleted.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, WebservicesError>> + Send;
}
