use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{doc, Binary, DateTime};
use mongodb::options::{ClientOptions, IndexOptions, ReplaceOptions};
use mongodb::{Client, Collection, IndexModel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{SessionStore, StoreError};

fn default_collection() -> String {
    "sessions".to_string()
}

/// The config struct for MongoDB connections.
/// Contains the URI, database name and the collection holding sessions.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct MongoDBConfig {
    pub uri: String,
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

/// A concrete `SessionStore` implementation that uses MongoDB.
///
/// Each session is one document keyed by its identifier. Expiry is enforced
/// on every read and write, and a TTL index lets MongoDB reclaim the rest.
pub struct MongoDBStore {
    session_collection: Collection<SessionDocument>,
}

/// Document shape for storing sessions in MongoDB.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct SessionDocument {
    #[serde(rename = "_id")]
    key: String,
    payload: Binary,
    expires_at: DateTime,
}

impl MongoDBStore {
    /// Creates a new `MongoDBStore` from the given config.
    /// It initializes the client connection and sets up the TTL index.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB at URI: {}", config.uri);

        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to parse MongoDB URI: {}", e)))?;

        client_options.app_name = Some("Session-O-Tron".to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Backend(format!("Failed to create MongoDB client: {}", e)))?;

        info!("MongoDB connection established successfully.");

        let session_collection = client
            .database(&config.database)
            .collection::<SessionDocument>(&config.collection);

        // Documents are removed by MongoDB once `expires_at` has passed.
        let mut ttl_on_expiry = IndexModel::default();
        ttl_on_expiry.keys = doc! { "expires_at": 1 };
        ttl_on_expiry.options = Some(IndexOptions::builder().expire_after(Duration::ZERO).build());

        session_collection
            .create_index(ttl_on_expiry, None)
            .await
            .map_err(|e| {
                StoreError::Backend(format!("Failed to create TTL index on expires_at: {}", e))
            })?;

        Ok(Self { session_collection })
    }

    fn expiry_from_now(expires_in: Duration) -> DateTime {
        SystemTime::now()
            .checked_add(expires_in)
            .map(DateTime::from_system_time)
            .unwrap_or(DateTime::MAX)
    }

    fn to_binary(value: &[u8]) -> Binary {
        Binary {
            subtype: BinarySubtype::Generic,
            bytes: value.to_vec(),
        }
    }

    /// Build the document persisted for `key`.
    fn session_to_doc(key: &str, value: &[u8], expires_in: Duration) -> SessionDocument {
        SessionDocument {
            key: key.to_string(),
            payload: Self::to_binary(value),
            expires_at: Self::expiry_from_now(expires_in),
        }
    }

    /// Extract the payload, treating documents past their expiry as absent.
    /// The TTL monitor only runs periodically, so stale documents can still be returned.
    fn doc_to_payload(doc: SessionDocument, now: DateTime) -> Option<Vec<u8>> {
        if doc.expires_at <= now {
            return None;
        }
        Some(doc.payload.bytes)
    }
}

#[async_trait]
impl SessionStore for MongoDBStore {
    /// Upserts the session document.
    async fn save(&self, key: &str, value: &[u8], expires_in: Duration) -> Result<(), StoreError> {
        let document = Self::session_to_doc(key, value, expires_in);
        self.session_collection
            .replace_one(
                doc! { "_id": key },
                document,
                ReplaceOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to save session: {}", e)))?;
        Ok(())
    }

    /// Only touches documents that exist and have not expired.
    async fn update(
        &self,
        key: &str,
        value: &[u8],
        expires_in: Duration,
    ) -> Result<bool, StoreError> {
        let result = self
            .session_collection
            .update_one(
                doc! { "_id": key, "expires_at": { "$gt": DateTime::now() } },
                doc! { "$set": {
                    "payload": Self::to_binary(value),
                    "expires_at": Self::expiry_from_now(expires_in),
                } },
                None,
            )
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to update session: {}", e)))?;

        debug!("Session update matched {} document(s)", result.matched_count);
        Ok(result.matched_count > 0)
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let document = self
            .session_collection
            .find_one(doc! { "_id": key }, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query session document: {}", e)))?;

        Ok(document.and_then(|d| Self::doc_to_payload(d, DateTime::now())))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.session_collection
            .delete_one(doc! { "_id": key }, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to delete session: {}", e)))?;

        Ok(())
    }

    fn get_name(&self) -> &str {
        "mongodb"
    }
}
