use std::vec;

use ephemera_common::{CommandError, Intent};

use crate::Frame;

/// Cursor sobre um Frame::Array para extrair argumentos sequencialmente.
pub struct Parse {
    command: String,
    parts: vec::IntoIter<Frame>,
}

impl Parse {
    /// Cria um Parse a partir de um Frame e lê o nome do comando.
    pub fn new(frame: Frame) -> Result<Parse, CommandError> {
        let parts = match frame {
            Frame::Array(parts) if !parts.is_empty() => parts,
            Frame::Array(_) => {
                return Err(CommandError::InvalidArgument("comando vazio".into()));
            }
            _ => return Err(CommandError::InvalidArgument("esperado array".into())),
        };

        let mut parse = Parse {
            command: String::new(),
            parts: parts.into_iter(),
        };
        parse.command = parse.next_string()?.to_uppercase();
        Ok(parse)
    }

    /// Nome do comando em maiúsculas.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Retorna o próximo elemento como String (de Bulk ou Simple).
    pub fn next_string(&mut self) -> Result<String, CommandError> {
        match self.next()? {
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(data) => String::from_utf8(data.to_vec())
                .map_err(|_| CommandError::InvalidArgument("string UTF-8 inválida".into())),
            _ => Err(CommandError::InvalidArgument(
                "esperado string ou bulk".into(),
            )),
        }
    }

    /// Retorna o próximo elemento como Intent.
    pub fn next_intent(&mut self) -> Result<Intent, CommandError> {
        self.next_string()?.parse()
    }

    /// Verifica se todos os argumentos foram consumidos.
    pub fn finish(&mut self) -> Result<(), CommandError> {
        if self.has_remaining() {
            Err(CommandError::WrongArity(self.command.clone()))
        } else {
            Ok(())
        }
    }

    /// Verifica se ainda há argumentos restantes.
    pub fn has_remaining(&self) -> bool {
        self.parts.len() > 0
    }

    fn next(&mut self) -> Result<Frame, CommandError> {
        self.parts
            .next()
            .ok_or_else(|| CommandError::WrongArity(self.command.clone()))
    }
}
