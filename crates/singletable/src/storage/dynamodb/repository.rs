//! DynamoDB store implementation.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{
    AttributeValue as SdkValue, KeysAndAttributes, PutRequest, ReturnValue, WriteRequest,
};
use aws_sdk_dynamodb::Client;

use singletable_core::attribute::AttributeMap;
use singletable_core::key::{Key, PK};
use singletable_core::query::QuerySpec;
use singletable_core::schema::TableConfig;
use singletable_core::storage::{
    primary_key_identity, ItemStore, QueryPage, RepositoryError, Result,
};

use super::client::{create_client, AwsConfig};
use super::conversions::{from_sdk_item, key_to_sdk, to_sdk_item};
use super::error::{
    map_batch_get_error, map_batch_write_error, map_build_error, map_delete_item_error,
    map_get_item_error, map_put_item_error, map_query_error,
};
use super::schema;
use crate::lock::backoff::retry_delay;
use crate::lock::TIME_TO_LIVE;

/// Keys per BatchGetItem request.
const BATCH_GET_LIMIT: usize = 100;
/// Items per BatchWriteItem request.
const BATCH_WRITE_LIMIT: usize = 25;
/// Resubmissions of unprocessed batch entries before giving up.
const BATCH_RETRY_ATTEMPTS: u32 = 8;
const BATCH_RETRY_INITIAL: Duration = Duration::from_millis(50);
const BATCH_RETRY_MAX: Duration = Duration::from_secs(2);

type SdkItem = HashMap<String, SdkValue>;

/// DynamoDB-backed [`ItemStore`] bound to one table.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a store from an explicit AWS configuration.
    pub async fn from_config(config: &AwsConfig) -> Self {
        let client = create_client(config).await;
        Self::new(client, config.table_name.clone())
    }

    /// Creates a store from environment configuration.
    ///
    /// See [`AwsConfig::from_env`] for the variables read.
    pub async fn from_env() -> Self {
        let config = AwsConfig::from_env();
        tracing::debug!(
            target_env = %config.target_display(),
            table = %config.table_name,
            "Connecting to DynamoDB"
        );
        Self::from_config(&config).await
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Provisions the single-table layout for this store's table, waits for it
    /// to become active and enables expiry on lock items.
    ///
    /// Returns `false` when the table already existed.
    pub async fn create_table(&self) -> Result<bool> {
        let config = TableConfig::single_table(self.table_name.clone());
        let created = schema::create_table(&self.client, &config).await?;
        if created {
            schema::wait_for_table_active(&self.client, &self.table_name).await?;
            schema::enable_time_to_live(&self.client, &self.table_name, TIME_TO_LIVE).await?;
        }
        Ok(created)
    }

    async fn batch_get_chunk(&self, keys: Vec<SdkItem>) -> Result<Vec<AttributeMap>> {
        let mut found = Vec::new();
        let mut pending = keys;
        let mut attempt = 0;

        while !pending.is_empty() {
            if attempt > BATCH_RETRY_ATTEMPTS {
                return Err(RepositoryError::QueryFailed(format!(
                    "{} keys unprocessed after retries",
                    pending.len()
                )));
            }
            if attempt > 0 {
                tokio::time::sleep(retry_delay(BATCH_RETRY_INITIAL, BATCH_RETRY_MAX, attempt - 1))
                    .await;
            }

            let request = KeysAndAttributes::builder()
                .set_keys(Some(pending))
                .build()
                .map_err(map_build_error)?;
            let output = self
                .client
                .batch_get_item()
                .request_items(&self.table_name, request)
                .send()
                .await
                .map_err(map_batch_get_error)?;

            if let Some(mut responses) = output.responses {
                for item in responses.remove(&self.table_name).unwrap_or_default() {
                    found.push(from_sdk_item(item)?);
                }
            }

            pending = output
                .unprocessed_keys
                .and_then(|mut unprocessed| unprocessed.remove(&self.table_name))
                .map(|keys| keys.keys().to_vec())
                .unwrap_or_default();
            attempt += 1;
        }

        Ok(found)
    }

    async fn batch_write_chunk(&self, requests: Vec<WriteRequest>) -> Result<()> {
        let mut pending = requests;
        let mut attempt = 0;

        while !pending.is_empty() {
            if attempt > BATCH_RETRY_ATTEMPTS {
                return Err(RepositoryError::WriteFailed(format!(
                    "{} items unprocessed after retries",
                    pending.len()
                )));
            }
            if attempt > 0 {
                tokio::time::sleep(retry_delay(BATCH_RETRY_INITIAL, BATCH_RETRY_MAX, attempt - 1))
                    .await;
            }

            let output = self
                .client
                .batch_write_item()
                .request_items(&self.table_name, pending)
                .send()
                .await
                .map_err(map_batch_write_error)?;

            pending = output
                .unprocessed_items
                .and_then(|mut unprocessed| unprocessed.remove(&self.table_name))
                .unwrap_or_default();
            attempt += 1;
        }

        Ok(())
    }
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get(&self, key: &Key) -> Result<Option<AttributeMap>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_sdk(key)))
            .send()
            .await
            .map_err(map_get_item_error)?;

        result.item.map(from_sdk_item).transpose()
    }

    async fn put(&self, item: AttributeMap) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_sdk_item(&item)))
            .send()
            .await
            .map_err(map_put_item_error)?;
        Ok(())
    }

    async fn put_if_absent_or_expired(
        &self,
        item: AttributeMap,
        expiry_attribute: &str,
        now: i64,
    ) -> Result<bool> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_sdk_item(&item)))
            .condition_expression("attribute_not_exists(#PK) OR #expiry < :now")
            .expression_attribute_names("#PK", PK)
            .expression_attribute_names("#expiry", expiry_attribute)
            .expression_attribute_values(":now", SdkValue::N(now.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(PutItemError::is_conditional_check_failed_exception) =>
            {
                Ok(false)
            }
            Err(err) => Err(map_put_item_error(err)),
        }
    }

    async fn delete(&self, key: &Key) -> Result<bool> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_sdk(key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(result
            .attributes()
            .is_some_and(|attributes| !attributes.is_empty()))
    }

    async fn query(&self, spec: &QuerySpec) -> Result<QueryPage> {
        let output = self
            .client
            .query()
            .table_name(spec.table_name())
            .set_index_name(spec.index_name().map(str::to_string))
            .key_condition_expression(spec.key_condition_expression())
            .set_expression_attribute_names(Some(spec.expression_attribute_names().clone()))
            .set_expression_attribute_values(Some(to_sdk_item(spec.expression_attribute_values())))
            .set_exclusive_start_key(spec.exclusive_start_key().map(to_sdk_item))
            .set_projection_expression(spec.projection_expression().map(str::to_string))
            .set_scan_index_forward(spec.scan_index_forward())
            .limit(spec.limit())
            .send()
            .await
            .map_err(map_query_error)?;

        let items = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(from_sdk_item)
            .collect::<Result<Vec<_>>>()?;
        let last_evaluated_key = output
            .last_evaluated_key
            .map(from_sdk_item)
            .transpose()?
            .filter(|key| !key.is_empty());

        tracing::trace!(
            table = %spec.table_name(),
            index = ?spec.index_name(),
            items = items.len(),
            "Query completed"
        );

        Ok(QueryPage {
            items,
            last_evaluated_key,
        })
    }

    async fn batch_get(&self, keys: &[Key]) -> Result<Vec<AttributeMap>> {
        // The service rejects duplicate keys within one request.
        let mut seen = HashSet::new();
        let unique: Vec<SdkItem> = keys
            .iter()
            .filter(|key| seen.insert((key.pk(), key.sk().unwrap_or_default())))
            .map(key_to_sdk)
            .collect();

        let mut by_identity = HashMap::new();
        for chunk in unique.chunks(BATCH_GET_LIMIT) {
            for item in self.batch_get_chunk(chunk.to_vec()).await? {
                if let Some(identity) = primary_key_identity(&item) {
                    by_identity.insert(identity, item);
                }
            }
        }

        Ok(keys
            .iter()
            .filter_map(|key| {
                by_identity
                    .get(&(
                        key.pk().to_string(),
                        key.sk().unwrap_or_default().to_string(),
                    ))
                    .cloned()
            })
            .collect())
    }

    async fn batch_write(&self, items: Vec<AttributeMap>) -> Result<()> {
        // The service rejects two writes to the same key within one request;
        // the last one wins.
        let mut latest = HashMap::new();
        for (position, item) in items.iter().enumerate() {
            let identity = primary_key_identity(item)
                .ok_or_else(|| RepositoryError::InvalidData(format!("Item is missing {PK}")))?;
            latest.insert(identity, position);
        }

        let requests = items
            .iter()
            .enumerate()
            .filter(|(position, item)| {
                primary_key_identity(item).and_then(|identity| latest.get(&identity).copied())
                    == Some(*position)
            })
            .map(|(_, item)| {
                let put = PutRequest::builder()
                    .set_item(Some(to_sdk_item(item)))
                    .build()
                    .map_err(map_build_error)?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        for chunk in requests.chunks(BATCH_WRITE_LIMIT) {
            self.batch_write_chunk(chunk.to_vec()).await?;
        }

        tracing::debug!(table = %self.table_name, items = items.len(), "Batch write completed");
        Ok(())
    }
}
