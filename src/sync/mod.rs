pub mod http;
pub mod keyring;

use async_trait::async_trait;

use crate::core::form::StagedFile;
use crate::core::person::Person;
use crate::core::task::{Task, TaskId, TaskPayload};
use crate::error::GatewayError;

pub use http::HttpTaskGateway;
pub use keyring::{CredentialProvider, KeyringCredentials, NoCredentials, StaticToken};

/// Remote source of truth for tasks and persons.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, GatewayError>;

    async fn list_persons(&self) -> Result<Vec<Person>, GatewayError>;

    /// Returns the server's canonical copy, including the assigned id.
    async fn create_task(
        &self,
        payload: &TaskPayload,
        files: &[StagedFile],
    ) -> Result<Task, GatewayError>;

    async fn update_task(
        &self,
        id: TaskId,
        payload: &TaskPayload,
        files: &[StagedFile],
    ) -> Result<Task, GatewayError>;

    async fn delete_task(&self, id: TaskId) -> Result<(), GatewayError>;
}
