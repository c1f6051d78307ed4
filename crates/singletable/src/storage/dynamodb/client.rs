//! AWS SDK client setup.

use aws_sdk_dynamodb::Client;

/// AWS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
    /// Table every store built from this configuration uses.
    pub table_name: String,
}

impl AwsConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AWS_ENDPOINT_URL` - Custom endpoint (default: none)
    /// - `AWS_REGION` - Region (default: "us-east-1")
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: "singletable")
    pub fn from_env() -> Self {
        Self {
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            table_name: std::env::var("DYNAMODB_TABLE_NAME")
                .unwrap_or_else(|_| "singletable".to_string()),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({url})"),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_display() {
        let local = AwsConfig {
            endpoint_url: Some("http://localhost:8000".to_string()),
            region: "us-east-1".to_string(),
            table_name: "docs".to_string(),
        };
        assert_eq!(local.target_display(), "Local DynamoDB (http://localhost:8000)");

        let remote = AwsConfig {
            endpoint_url: None,
            region: "eu-west-1".to_string(),
            table_name: "docs".to_string(),
        };
        assert_eq!(remote.target_display(), "AWS DynamoDB (region: eu-west-1)");
    }
}
