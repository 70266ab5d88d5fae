pub mod routes_client;

pub use routes_client::GoogleRoutesClient;
