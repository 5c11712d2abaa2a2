use std::sync::Arc;

use tracing::info;

use pulp_db::DatabaseSettings;
use pulp_webservices::collaborators::Collaborators;
use pulp_webservices::infra::db::DbEventListenerRepository;
use pulp_webservices::router::build_router;
use pulp_webservices::state::AppState;

#[tokio::main]
async fn main() {
    let config = pulp_config::global();
    config
        .load_configuration()
        .expect("failed to load configuration");

    let (database, collaborators, server_name, bind_address) = {
        let config = config.read();
        pulp_core::logs::start_logging(&config).expect("failed to start logging");
        let database = DatabaseSettings::from_config(&config).expect("invalid [database] section");
        let collaborators =
            Collaborators::from_config(&config).expect("invalid [authentication] section");
        let server_name = config.settings().require("server", "server_name").map(str::to_owned);
        let bind_address = config.settings().require("server", "bind_address").map(str::to_owned);
        (
            database,
            collaborators,
            server_name.expect("missing server_name"),
            bind_address.expect("missing bind_address"),
        )
    };

    let handle = pulp_db::connection()
        .initialize(&database)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        collaborators: Arc::new(collaborators),
        events: DbEventListenerRepository {
            db: handle.db.clone(),
        },
        server_name,
    };

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("failed to bind");

    info!(database = %database.name, "pulp server listening on {bind_address}");
    axum::serve(listener, router).await.expect("server error");
}
