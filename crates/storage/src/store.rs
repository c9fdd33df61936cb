use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::debug;

use ephemera_common::{ConfigError, StoreConfig};

use crate::entry::StateEntry;
use crate::key::{generate_key, redact};

/// Estado compartilhado entre todos os handles do store.
struct Shared<V> {
    entries: DashMap<String, StateEntry<V>>,
    config: StoreConfig,
}

impl<V> Shared<V> {
    fn sweep(&self) -> usize {
        let ttl = self.config.ttl;
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let live = !entry.is_expired(ttl);
            if !live {
                purged += 1;
            }
            live
        });
        purged
    }
}

/// Store de estado efêmero: cada entrada vive no máximo `ttl` e só pode
/// ser consumida uma vez.
///
/// Construído uma vez no start do processo e clonado para quem precisa;
/// todos os clones apontam para o mesmo mapa. Entradas expiradas são
/// removidas de forma preguiçosa em `create`/`count`, e opcionalmente por
/// uma task periódica (`spawn_sweeper`).
pub struct StateStore<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for StateStore<V> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<V> StateStore<V> {
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                entries: DashMap::new(),
                config,
            }),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.shared.config.ttl
    }

    /// Guarda `value` sob uma chave nova e imprevisível.
    pub fn create(&self, value: V) -> String {
        self.sweep();

        let slot = loop {
            match self
                .shared
                .entries
                .entry(generate_key(self.shared.config.key_bytes))
            {
                Entry::Vacant(slot) => break slot,
                Entry::Occupied(_) => debug!("colisão de chave, gerando outra"),
            }
        };

        let key = slot.key().clone();
        slot.insert(StateEntry::new(value));
        debug!("estado criado: {}", redact(&key));
        key
    }

    /// Remove a entrada e devolve o valor se ainda estiver dentro do TTL.
    ///
    /// A remoção acontece antes da checagem de expiração, então entre
    /// chamadas concorrentes com a mesma chave no máximo uma recebe o valor.
    pub fn consume(&self, key: &str) -> Option<V> {
        let Some((_, entry)) = self.shared.entries.remove(key) else {
            debug!("estado inexistente ou já consumido: {}", redact(key));
            return None;
        };

        if entry.is_expired(self.shared.config.ttl) {
            debug!("estado expirado descartado: {}", redact(key));
            return None;
        }

        debug!("estado consumido: {}", redact(key));
        Some(entry.value)
    }

    /// Entradas vivas, após a mesma varredura de `create`.
    pub fn count(&self) -> usize {
        self.sweep();
        self.shared.entries.len()
    }

    /// Remove todas as entradas expiradas. Retorna quantas foram purgadas.
    pub fn sweep(&self) -> usize {
        let purged = self.shared.sweep();
        if purged > 0 {
            debug!("{purged} estados expirados purgados");
        }
        purged
    }
}

impl<V: Send + Sync + 'static> StateStore<V> {
    /// Varredura ativa a cada `period`, complementando a preguiçosa.
    /// A task termina sozinha quando o último handle do store é dropado.
    /// Período zero não agenda nada e retorna `None`.
    pub fn spawn_sweeper(&self, period: Duration) -> Option<JoinHandle<()>> {
        if period.is_zero() {
            return None;
        }

        let weak = Arc::downgrade(&self.shared);
        Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tick.tick().await;

            loop {
                tick.tick().await;
                let Some(shared) = weak.upgrade() else {
                    debug!("store dropado, encerrando sweeper");
                    return;
                };
                let purged = shared.sweep();
                if purged > 0 {
                    debug!("sweeper purgou {purged} estados expirados");
                }
            }
        }))
    }
}

impl<V> Default for StateStore<V> {
    fn default() -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: DashMap::new(),
                config: StoreConfig::default(),
            }),
        }
    }
}
