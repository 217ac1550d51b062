use std::sync::Arc;

use axum::extract::FromRef;
use rooranking_core::Festival;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub festival: Arc<Festival>,
}
