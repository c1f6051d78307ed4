//! Table provisioning from a [`TableConfig`].

use std::time::Duration;

use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode as SdkBillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, Projection, ProjectionType as SdkProjectionType, ScalarAttributeType, TableStatus,
    TimeToLiveSpecification,
};
use aws_sdk_dynamodb::Client;

use singletable_core::schema::{AttributeType, BillingMode, KeyAttribute, ProjectionType, TableConfig};
use singletable_core::storage::{RepositoryError, Result};

use super::error::{
    map_build_error, map_create_table_error, map_describe_table_error, map_update_ttl_error,
};

const ACTIVE_POLL_ATTEMPTS: u32 = 60;
const ACTIVE_POLL_DELAY: Duration = Duration::from_secs(2);

/// Creates the table. Returns `false` when it already exists.
pub async fn create_table(client: &Client, config: &TableConfig) -> Result<bool> {
    let mut key_schema = vec![key_element(&config.partition_key, KeyType::Hash)?];
    if let Some(sk) = &config.sort_key {
        key_schema.push(key_element(sk, KeyType::Range)?);
    }

    let attribute_definitions = config
        .attribute_definitions()
        .into_iter()
        .map(attribute_definition)
        .collect::<Result<Vec<_>>>()?;

    let mut request = client
        .create_table()
        .table_name(&config.table_name)
        .set_key_schema(Some(key_schema))
        .set_attribute_definitions(Some(attribute_definitions))
        .billing_mode(match config.billing_mode {
            BillingMode::PayPerRequest => SdkBillingMode::PayPerRequest,
        });

    for gsi in &config.gsis {
        let mut gsi_key_schema = vec![key_element(&gsi.partition_key, KeyType::Hash)?];
        if let Some(sk) = &gsi.sort_key {
            gsi_key_schema.push(key_element(sk, KeyType::Range)?);
        }

        request = request.global_secondary_indexes(
            GlobalSecondaryIndex::builder()
                .index_name(&gsi.name)
                .set_key_schema(Some(gsi_key_schema))
                .projection(
                    Projection::builder()
                        .projection_type(match gsi.projection {
                            ProjectionType::All => SdkProjectionType::All,
                            ProjectionType::KeysOnly => SdkProjectionType::KeysOnly,
                        })
                        .build(),
                )
                .build()
                .map_err(map_build_error)?,
        );
    }

    match request.send().await {
        Ok(_) => {
            tracing::info!(table = %config.table_name, "Created table");
            Ok(true)
        }
        Err(err)
            if err
                .as_service_error()
                .is_some_and(CreateTableError::is_resource_in_use_exception) =>
        {
            tracing::debug!(table = %config.table_name, "Table already exists");
            Ok(false)
        }
        Err(err) => Err(map_create_table_error(err)),
    }
}

/// Polls until the table and all its indexes are active.
pub async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    for _ in 0..ACTIVE_POLL_ATTEMPTS {
        let output = client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(map_describe_table_error)?;

        if let Some(table) = output.table() {
            let table_active = table.table_status() == Some(&TableStatus::Active);
            let indexes_active = table.global_secondary_indexes().iter().all(|gsi| {
                gsi.index_status() == Some(&aws_sdk_dynamodb::types::IndexStatus::Active)
            });
            if table_active && indexes_active {
                return Ok(());
            }
        }
        tokio::time::sleep(ACTIVE_POLL_DELAY).await;
    }

    Err(RepositoryError::ConnectionFailed(format!(
        "Table {table_name} did not become active"
    )))
}

/// Turns on store-side expiry driven by an epoch-seconds attribute.
pub async fn enable_time_to_live(client: &Client, table_name: &str, attribute: &str) -> Result<()> {
    client
        .update_time_to_live()
        .table_name(table_name)
        .time_to_live_specification(
            TimeToLiveSpecification::builder()
                .attribute_name(attribute)
                .enabled(true)
                .build()
                .map_err(map_build_error)?,
        )
        .send()
        .await
        .map_err(map_update_ttl_error)?;
    Ok(())
}

fn key_element(attribute: &KeyAttribute, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(&attribute.name)
        .key_type(key_type)
        .build()
        .map_err(map_build_error)
}

fn attribute_definition(attribute: &KeyAttribute) -> Result<AttributeDefinition> {
    AttributeDefinition::builder()
        .attribute_name(&attribute.name)
        .attribute_type(to_scalar_type(attribute.attribute_type))
        .build()
        .map_err(map_build_error)
}

fn to_scalar_type(attribute_type: AttributeType) -> ScalarAttributeType {
    match attribute_type {
        AttributeType::String => ScalarAttributeType::S,
    }
}
