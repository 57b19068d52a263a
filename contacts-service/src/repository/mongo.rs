use super::store::{ContactStore, StoreError};
use crate::config::MongoConfig;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure, RETRYABLE_WRITE_ERROR},
    options::{
        ClientOptions, FindOneAndReplaceOptions, FindOneAndUpdateOptions, ReturnDocument,
    },
    Client as MongoClient, Collection,
};
use service_core::error::AppError;

/// Server error codes raised while a node is unreachable, shutting down or
/// in the middle of a primary election.
const CONNECTIVITY_ERROR_CODES: &[i32] = &[
    6,     // HostUnreachable
    7,     // HostNotFound
    50,    // MaxTimeMSExpired
    89,    // NetworkTimeout
    91,    // ShutdownInProgress
    189,   // PrimarySteppedDown
    262,   // ExceededTimeLimit
    9001,  // SocketException
    10107, // NotWritablePrimary
    11600, // InterruptedAtShutdown
    11602, // InterruptedDueToReplStateChange
    13435, // NotPrimaryNoSecondaryOk
    13436, // NotPrimaryOrSecondary
];

/// MongoDB-backed contact storage.
///
/// Holds the process-wide driver client; the driver pools connections
/// internally, so clones share one pool.
#[derive(Clone)]
pub struct MongoContactStore {
    client: MongoClient,
    contacts: Collection<Document>,
    endpoint: String,
}

impl MongoContactStore {
    /// Build the client. The driver connects lazily, so an unreachable server
    /// surfaces on the first operation rather than here.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Invalid MONGODB_URI: {}", e))
        })?;
        options.server_selection_timeout = Some(config.server_selection_timeout());
        options.app_name = Some("contacts-service".to_string());

        let endpoint = format!(
            "mongodb://{}",
            options
                .hosts
                .iter()
                .map(|host| host.to_string())
                .collect::<Vec<_>>()
                .join(",")
        );

        tracing::info!(
            endpoint = %endpoint,
            server_selection_timeout_ms = config.server_selection_timeout_ms,
            "Connecting to MongoDB"
        );
        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client for {}: {}", endpoint, e);
            AppError::from(e)
        })?;
        let contacts = client
            .database(&config.database)
            .collection(&config.collection);
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB client ready"
        );

        Ok(Self {
            client,
            contacts,
            endpoint,
        })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

/// Whether a driver error means the datastore could not be reached.
pub fn is_connectivity_failure(err: &MongoError) -> bool {
    if err.contains_label(RETRYABLE_WRITE_ERROR) {
        return true;
    }
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => true,
        ErrorKind::Command(command_error) => {
            CONNECTIVITY_ERROR_CODES.contains(&command_error.code)
        }
        ErrorKind::Write(WriteFailure::WriteConcernError(wc_error)) => {
            CONNECTIVITY_ERROR_CODES.contains(&wc_error.code)
        }
        _ => false,
    }
}

fn classify(err: MongoError) -> StoreError {
    if is_connectivity_failure(&err) {
        StoreError::Connectivity(anyhow::Error::new(err))
    } else {
        StoreError::Other(anyhow::Error::new(err))
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn insert(&self, document: Document) -> Result<(), StoreError> {
        self.contacts
            .insert_one(document, None)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        self.contacts
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(classify)
    }

    async fn find_first(&self) -> Result<Option<Document>, StoreError> {
        self.contacts.find_one(None, None).await.map_err(classify)
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        let cursor = self.contacts.find(None, None).await.map_err(classify)?;
        cursor.try_collect().await.map_err(classify)
    }

    async fn update_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.contacts
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields }, options)
            .await
            .map_err(classify)
    }

    async fn replace(
        &self,
        id: ObjectId,
        document: Document,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOneAndReplaceOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.contacts
            .find_one_and_replace(doc! { "_id": id }, document, options)
            .await
            .map_err(classify)
    }

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        self.contacts
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!(endpoint = %self.endpoint, "Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}
