use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Entity;
use crate::database::store::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Subscriber {
    const COLLECTION: Collection = Collection::Subscribers;
    const NAME: &'static str = "Subscriber";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSubscriber {
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubscriberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
