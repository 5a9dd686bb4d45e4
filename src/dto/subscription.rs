use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::SubscriptionEntity, dto::format_instant};

/// Registration of a push delivery target.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubscriptionRequest {
    #[validate(url)]
    pub endpoint: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Stored delivery target.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionView {
    pub id: Uuid,
    pub endpoint: String,
    pub user_id: Option<Uuid>,
    pub created_at: String,
}

impl From<SubscriptionEntity> for SubscriptionView {
    fn from(subscription: SubscriptionEntity) -> Self {
        Self {
            id: subscription.id,
            endpoint: subscription.endpoint,
            user_id: subscription.user_id,
            created_at: format_instant(subscription.created_at),
        }
    }
}
