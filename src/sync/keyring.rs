use std::collections::HashMap;

use async_trait::async_trait;

pub(crate) const SERVICE_NAME: &str = "taskdesk";

/// Supplies the bearer token attached to outgoing requests.
///
/// `None` means "send the request unauthenticated"; the server decides.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn bearer_token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone()).filter(|t| !t.is_empty())
    }
}

/// Token kept in the system keyring via Secret Service, keyed by server.
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    server: String,
}

impl KeyringCredentials {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

#[async_trait]
impl CredentialProvider for KeyringCredentials {
    async fn bearer_token(&self) -> Option<String> {
        match load_token(&self.server).await {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Keyring lookup failed, sending request without token: {}", e);
                None
            }
        }
    }
}

fn attributes(server: &str) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);
    attrs
}

/// Store the API token in the system keyring.
pub async fn store_token(server: &str, token: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    keyring
        .create_item(
            &format!("taskdesk API token ({})", server),
            &attributes(server),
            token.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store token: {}", e))?;

    Ok(())
}

/// Load the API token from the system keyring.
pub async fn load_token(server: &str) -> Result<Option<String>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(server))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let token = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        if !token.is_empty() {
            return Ok(Some(token));
        }
    }

    Ok(None)
}

/// Delete the API token from the system keyring.
pub async fn delete_token(server: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(server))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete token: {}", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_ignores_empty() {
        assert_eq!(StaticToken("abc".to_string()).bearer_token().await.as_deref(), Some("abc"));
        assert_eq!(StaticToken(String::new()).bearer_token().await, None);
        assert_eq!(NoCredentials.bearer_token().await, None);
    }
}
