use tracing::debug;
use url::Url;

use ephemera_common::{Intent, StoreError};

use crate::StateBackend;

/// Query parameter que carrega a chave pelo provedor de identidade.
pub const STATE_PARAM: &str = "state";

/// Cria o estado e devolve a URL de autorização com `state=<chave>`.
///
/// Um `state` já presente em `authorize_url` é substituído; os demais
/// parâmetros são preservados.
pub async fn authorize_redirect<B: StateBackend + ?Sized>(
    backend: &B,
    intent: Intent,
    authorize_url: &Url,
) -> Result<Url, StoreError> {
    let key = backend.create(intent).await?;

    let kept: Vec<(String, String)> = authorize_url
        .query_pairs()
        .filter(|(name, _)| *name != STATE_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut url = authorize_url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(STATE_PARAM, &key);
    Ok(url)
}

/// Consome o `state` recebido no callback.
///
/// `Ok(None)` quando o parâmetro falta ou a chave não é mais válida: o
/// chamador deve reiniciar o fluxo (pedir o papel de novo).
pub async fn resolve_callback<B: StateBackend + ?Sized>(
    backend: &B,
    callback_url: &Url,
) -> Result<Option<Intent>, StoreError> {
    let key = callback_url
        .query_pairs()
        .find(|(name, _)| *name == STATE_PARAM)
        .map(|(_, value)| value.into_owned());

    match key {
        Some(key) if !key.is_empty() => backend.consume(&key).await,
        _ => {
            debug!("callback sem parâmetro {STATE_PARAM}");
            Ok(None)
        }
    }
}
