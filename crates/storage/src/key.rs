use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Gera uma chave opaca a partir de `bytes` bytes do CSPRNG, em base64url sem padding.
pub(crate) fn generate_key(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Prefixo curto da chave para logs. A chave inteira é um bearer token.
pub(crate) fn redact(key: &str) -> String {
    let prefix: String = key.chars().take(6).collect();
    format!("{prefix}…")
}
