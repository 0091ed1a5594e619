mod middlewares;
mod routes;

use crate::common::mock_server::middlewares::MiddlewareFn;
use actix_web::{web, App, HttpServer};
use coreledger_rust::apis::customers::Customer;
use reqwest::Url;
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};
use tokio::sync::oneshot;

#[derive(Clone)]
struct MockServerConfiguration {
    program_identifier: String,
    hmac_key: String,
}

#[derive(Clone, Default)]
struct MockServerStorageInner {
    customers: BTreeMap<String, Customer>,
    /// Every token issued by `POST /auth`, oldest first. Only the last one is valid.
    tokens: Vec<String>,
}

/// In-memory storage for the resources created on the mock server.
type MockServerStorage = Arc<RwLock<MockServerStorageInner>>;

/// Simple mock server for CoreLedger APIs used in local integration tests.
pub struct CoreLedgerMockServer {
    url: Url,
    shutdown: Option<oneshot::Sender<()>>,
    storage: MockServerStorage,
}

impl CoreLedgerMockServer {
    pub async fn start(program_identifier: &str, hmac_key: &str) -> Self {
        let configuration = MockServerConfiguration {
            program_identifier: program_identifier.to_string(),
            hmac_key: hmac_key.to_string(),
        };

        // Setup the in-memory storage
        let storage = MockServerStorage::default();
        let storage_clone = storage.clone();

        // Setup the mock HTTP server and bind it to a random port
        let http_server_factory = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(configuration.clone()))
                .app_data(web::Data::new(storage.clone()))
                // User agent must be validated for each request
                .wrap(MiddlewareFn::new(middlewares::validate_user_agent))
                // Mock routes
                .service(web::resource("/api/v1/auth").route(web::post().to(routes::post_auth)))
                .service(
                    web::scope("/api/v1")
                        .wrap(MiddlewareFn::new(middlewares::validate_authorization(
                            storage.clone(),
                        )))
                        .service(
                            web::resource("/customers")
                                .route(web::get().to(routes::list_customers))
                                .route(web::post().to(routes::create_customer)),
                        )
                        .service(
                            web::resource("/customers/{uid}")
                                .route(web::get().to(routes::get_customer_by_uid))
                                .route(web::put().to(routes::update_customer)),
                        )
                        .service(
                            web::resource("/customers/{uid}/{action}")
                                .route(web::put().to(routes::customer_action)),
                        ),
                )
                .default_service(web::to(routes::not_found))
        })
        .workers(1)
        .bind("127.0.0.1:0")
        .unwrap();

        // Retrieve the address and port the server was bound to
        let addr = http_server_factory.addrs().first().cloned().unwrap();

        // Prepare a oneshot channel to kill the HTTP server when this struct is dropped
        let (shutdown_sender, shutdown_recv) = oneshot::channel();

        // Start the server in another task
        let http_server = http_server_factory.run();
        tokio::spawn(async move {
            tokio::select! {
                _ = http_server => panic!("HTTP server crashed"),
                _ = shutdown_recv => { /* Intentional shutdown */ }
            }
        });

        Self {
            url: Url::parse(&format!("http://{}", addr)).unwrap(),
            shutdown: Some(shutdown_sender),
            storage: storage_clone,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn issued_tokens(&self) -> Vec<String> {
        self.storage.read().unwrap().tokens.clone()
    }
}

impl Drop for CoreLedgerMockServer {
    fn drop(&mut self) {
        // Send a shutdown signal to the actix server on drop
        let _ = self.shutdown.take().unwrap().send(());
    }
}
