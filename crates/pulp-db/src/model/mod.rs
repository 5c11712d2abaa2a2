pub mod event_listeners;
