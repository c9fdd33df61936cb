/// Erros de parsing do protocolo RESP.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame incompleto")]
    Incomplete,
    #[error("byte de tipo inválido: {0:#x}")]
    InvalidFrameType(u8),
    #[error("inteiro inválido: {0}")]
    InvalidInteger(String),
    #[error("comprimento inválido: {0}")]
    InvalidLength(i64),
    #[error("frame excede tamanho máximo ({0} bytes)")]
    FrameTooLarge(usize),
    #[error("arrays aninhados além de {0} níveis")]
    TooDeep(usize),
    #[error("encoding inválido: {0}")]
    InvalidEncoding(String),
}

/// Erros de parsing/validação de comandos.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("número errado de argumentos para '{0}'")]
    WrongArity(String),
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),
    #[error("intenção desconhecida: '{0}' (use job_seeker ou employer)")]
    InvalidIntent(String),
}

/// Erros de conexão TCP.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("conexão resetada pelo peer")]
    ConnectionReset,
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Falha de infraestrutura do backend de estado.
///
/// Nunca representa "chave ausente": ausência é `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("servidor respondeu com erro: {0}")]
    Server(String),
    #[error("resposta inesperada do servidor: {0}")]
    UnexpectedReply(String),
}

/// Configuração inválida do store.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TTL deve ser maior que zero")]
    ZeroTtl,
    #[error("TTL de {0}s acima do máximo de {max}s", max = crate::MAX_TTL.as_secs())]
    TtlTooLong(u64),
    #[error("chave de {0} bytes é fraca demais (mínimo 16)")]
    WeakKey(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::Incomplete;
        assert_eq!(err.to_string(), "frame incompleto");
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::WrongArity("CONSUME".into());
        assert_eq!(err.to_string(), "número errado de argumentos para 'CONSUME'");
    }

    #[test]
    fn too_deep_display() {
        let err = ProtocolError::TooDeep(2);
        assert_eq!(err.to_string(), "arrays aninhados além de 2 níveis");
    }

    #[test]
    fn store_error_from_connection_is_retryable() {
        let err: StoreError = ConnectionError::ConnectionReset.into();
        assert!(err.is_retryable());
        assert!(!StoreError::Server("ERR x".into()).is_retryable());
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::TtlTooLong(90_000).to_string(),
            "TTL de 90000s acima do máximo de 86400s"
        );
    }
}
