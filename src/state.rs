//! Shared application state.

use std::sync::Arc;

use crate::domain::totals::CheckoutPolicy;
use crate::notify::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub nats: Option<async_nats::Client>,
    pub mailer: Arc<dyn Mailer>,
    pub policy: CheckoutPolicy,
}
