use tokio::time::{Duration, Instant};

/// Entrada no store: valor + instante de criação.
#[derive(Debug)]
pub struct StateEntry<V> {
    pub value: V,
    pub created_at: Instant,
}

impl<V> StateEntry<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    /// Expirada quando `now - created_at > ttl`; no limite exato ainda é válida.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}
