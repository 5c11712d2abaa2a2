use axum::{Router, routing::get};

use crate::domain::repository::EventListenerRepository;
use crate::handlers::{
    events::{
        create_event_listener, delete_event_listener, get_event_listener, list_event_listeners,
        update_event_listener,
    },
    status::get_status,
};
use crate::http::with_request_ids;
use crate::state::AppState;

pub fn build_router<R>(state: AppState<R>) -> Router
where
    R: EventListenerRepository + Clone + 'static,
{
    let routes: Router<AppState<R>> = Router::new()
        // Status
        .route("/pulp/api/v2/status/", get(get_status::<R>))
        // Event listeners
        .route(
            "/pulp/api/v2/events/",
            get(list_event_listeners::<R>).post(create_event_listener::<R>),
        )
        .route(
            "/pulp/api/v2/events/{event_listener_id}/",
            get(get_event_listener::<R>)
                .put(update_event_listener::<R>)
                .delete(delete_event_listener::<R>),
        );
    with_request_ids(routes).with_state(state)
}
