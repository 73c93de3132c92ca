use std::sync::Arc;

use cafe_trivia_core::ports::random::RandomSource;
use cafe_trivia_core::ports::store::Store;

use crate::auth::TokenVerifier;

/// Built once by the entry point (or a test) and handed to `router`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub rng: Arc<dyn RandomSource>,
    pub verifier: Arc<TokenVerifier>,
    pub questions_per_page: usize,
    pub allowed_origins: Vec<String>,
}
