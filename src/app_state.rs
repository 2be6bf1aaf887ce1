use std::sync::Arc;

use crate::{
    auth::{CredentialStore, TokenService},
    config::Config,
    store::{SharedGraph, SocialGraph},
};

#[derive(Clone)]
pub struct AppState {
    pub graph: SharedGraph,
    pub credentials: CredentialStore,
    pub tokens: Arc<TokenService>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let graph = SocialGraph::shared();
        let credentials = CredentialStore::new(graph.clone());
        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_days,
        ));

        Self {
            graph,
            credentials,
            tokens,
            config,
        }
    }
}
