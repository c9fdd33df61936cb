use std::sync::Arc;

use async_trait::async_trait;

use ephemera_common::{Intent, StoreError};

use crate::StateStore;

/// Ponto de substituição entre o store in-process e um store compartilhado
/// via rede.
///
/// `Ok(None)` significa ausente (inexistente, expirado ou já consumido) e o
/// fluxo deve recomeçar. `Err` é falha de infraestrutura e pode ser repetida;
/// nunca é tratada como ausência.
#[async_trait]
pub trait StateBackend: Send + Sync {
    async fn create(&self, intent: Intent) -> Result<String, StoreError>;

    async fn consume(&self, key: &str) -> Result<Option<Intent>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

#[async_trait]
impl StateBackend for StateStore<Intent> {
    async fn create(&self, intent: Intent) -> Result<String, StoreError> {
        Ok(StateStore::create(self, intent))
    }

    async fn consume(&self, key: &str) -> Result<Option<Intent>, StoreError> {
        Ok(StateStore::consume(self, key))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(StateStore::count(self))
    }
}

#[async_trait]
impl<B: StateBackend + ?Sized> StateBackend for Arc<B> {
    async fn create(&self, intent: Intent) -> Result<String, StoreError> {
        (**self).create(intent).await
    }

    async fn consume(&self, key: &str) -> Result<Option<Intent>, StoreError> {
        (**self).consume(key).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        (**self).count().await
    }
}
