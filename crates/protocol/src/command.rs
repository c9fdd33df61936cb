use ephemera_common::{CommandError, Intent};

use crate::{Frame, Parse};

/// Enum com todos os comandos suportados.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping(Option<String>),
    /// Cria uma entrada e devolve a chave gerada.
    Create(Intent),
    /// Lê e remove a entrada (uso único).
    Consume(String),
    /// Entradas vivas, após a varredura preguiçosa.
    Count,
    /// TTL configurado no servidor, em milissegundos.
    Ttl,
    Unknown(String),
}

impl Command {
    /// Faz o parse de um Frame em um Command.
    pub fn from_frame(frame: Frame) -> Result<Command, CommandError> {
        let mut parse = Parse::new(frame)?;

        let name = parse.command().to_string();

        let cmd = match name.as_str() {
            "PING" => {
                let msg = if parse.has_remaining() {
                    Some(parse.next_string()?)
                } else {
                    None
                };
                Command::Ping(msg)
            }
            "CREATE" => Command::Create(parse.next_intent()?),
            "CONSUME" => Command::Consume(parse.next_string()?),
            "COUNT" => Command::Count,
            "TTL" => Command::Ttl,
            _ => return Ok(Command::Unknown(name)),
        };

        parse.finish()?;
        Ok(cmd)
    }

    /// Encoda o comando como Frame para envio via RESP.
    pub fn to_frame(&self) -> Frame {
        match self {
            Command::Ping(None) => Frame::array_from_strs(&["PING"]),
            Command::Ping(Some(msg)) => Frame::array_from_strs(&["PING", msg.as_str()]),
            Command::Create(intent) => Frame::array_from_strs(&["CREATE", intent.as_str()]),
            Command::Consume(key) => Frame::array_from_strs(&["CONSUME", key.as_str()]),
            Command::Count => Frame::array_from_strs(&["COUNT"]),
            Command::Ttl => Frame::array_from_strs(&["TTL"]),
            Command::Unknown(name) => Frame::array_from_strs(&[name.as_str()]),
        }
    }
}
