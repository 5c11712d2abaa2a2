mod events_test;
mod helpers;
mod status_test;
