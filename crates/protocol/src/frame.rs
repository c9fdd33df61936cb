use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use ephemera_common::{MAX_FRAME_DEPTH, MAX_FRAME_SIZE, ProtocolError};

/// Representação de um frame RESP2.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

impl Frame {
    /// Verifica se um frame completo está disponível no buffer sem alocar.
    /// Retorna Ok(()) se completo, Err(Incomplete) se precisa mais dados.
    ///
    /// O frame inteiro (não só cada linha) fica limitado a `MAX_FRAME_SIZE`
    /// e arrays aninham no máximo `MAX_FRAME_DEPTH` níveis.
    pub fn check(src: &mut Cursor<&[u8]>) -> Result<(), ProtocolError> {
        let start = src.position() as usize;
        check_nested(src, start, 1)
    }

    /// Faz o parse de um frame completo a partir do cursor.
    /// Deve ser chamado apenas após `check()` retornar Ok.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Frame, ProtocolError> {
        match get_u8(src)? {
            b'+' => Ok(Frame::Simple(get_text(src)?)),
            b'-' => Ok(Frame::Error(get_text(src)?)),
            b':' => Ok(Frame::Integer(get_decimal(src)?)),
            b'$' => {
                let Some(len) = get_length(src)? else {
                    return Ok(Frame::Null);
                };
                if src.remaining() < len + 2 {
                    return Err(ProtocolError::Incomplete);
                }
                let start = src.position() as usize;
                let data = Bytes::copy_from_slice(&src.get_ref()[start..start + len]);
                src.advance(len + 2);
                Ok(Frame::Bulk(data))
            }
            b'*' => {
                let Some(count) = get_length(src)? else {
                    return Ok(Frame::Null);
                };
                let mut frames = Vec::with_capacity(count.min(16));
                for _ in 0..count {
                    frames.push(Frame::parse(src)?);
                }
                Ok(Frame::Array(frames))
            }
            byte => Err(ProtocolError::InvalidFrameType(byte)),
        }
    }

    /// Encoda o frame no buffer de saída em formato RESP2.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Frame::Simple(s) => put_line(dst, b'+', s.as_bytes()),
            Frame::Error(s) => put_line(dst, b'-', s.as_bytes()),
            Frame::Integer(n) => put_line(dst, b':', n.to_string().as_bytes()),
            Frame::Bulk(data) => {
                put_line(dst, b'$', data.len().to_string().as_bytes());
                dst.put(data.as_ref());
                dst.put(&b"\r\n"[..]);
            }
            Frame::Null => dst.put(&b"$-1\r\n"[..]),
            Frame::Array(frames) => {
                put_line(dst, b'*', frames.len().to_string().as_bytes());
                for frame in frames {
                    frame.encode(dst);
                }
            }
        }
    }

    /// Helper: cria um Frame::Bulk a partir de &str.
    pub fn bulk(s: &str) -> Frame {
        Frame::Bulk(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Helper: cria um Array de Bulk strings a partir de &[&str].
    pub fn array_from_strs(strs: &[&str]) -> Frame {
        Frame::Array(strs.iter().map(|s| Frame::bulk(s)).collect())
    }

    /// Conteúdo textual de frames Simple/Bulk.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Frame::Simple(s) => Some(s),
            Frame::Bulk(data) => std::str::from_utf8(data).ok(),
            _ => None,
        }
    }
}

fn check_nested(src: &mut Cursor<&[u8]>, start: usize, depth: usize) -> Result<(), ProtocolError> {
    match get_u8(src)? {
        b'+' | b'-' | b':' => get_line(src).map(|_| ()),
        b'$' => match get_length(src)? {
            None => Ok(()),
            Some(len) => {
                // data + \r\n
                ensure_within(start, src.position() as usize + len + 2)?;
                skip(src, len + 2)
            }
        },
        b'*' => {
            if depth > MAX_FRAME_DEPTH {
                return Err(ProtocolError::TooDeep(MAX_FRAME_DEPTH));
            }
            if let Some(count) = get_length(src)? {
                for _ in 0..count {
                    check_nested(src, start, depth + 1)?;
                    ensure_within(start, src.position() as usize)?;
                }
            }
            Ok(())
        }
        byte => Err(ProtocolError::InvalidFrameType(byte)),
    }
}

fn ensure_within(start: usize, end: usize) -> Result<(), ProtocolError> {
    let size = end.saturating_sub(start);
    if size > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(size));
    }
    Ok(())
}

fn put_line(dst: &mut BytesMut, prefix: u8, body: &[u8]) {
    dst.put_u8(prefix);
    dst.put(body);
    dst.put(&b"\r\n"[..]);
}

fn get_u8(src: &mut Cursor<&[u8]>) -> Result<u8, ProtocolError> {
    if !src.has_remaining() {
        return Err(ProtocolError::Incomplete);
    }
    Ok(src.get_u8())
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], ProtocolError> {
    let buf: &'a [u8] = *src.get_ref();
    let start = src.position() as usize;

    let Some(offset) = buf[start..].windows(2).position(|w| w == b"\r\n") else {
        if buf.len() - start > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge(buf.len() - start));
        }
        return Err(ProtocolError::Incomplete);
    };

    src.set_position((start + offset + 2) as u64);
    Ok(&buf[start..start + offset])
}

fn get_text(src: &mut Cursor<&[u8]>) -> Result<String, ProtocolError> {
    let line = get_line(src)?;
    String::from_utf8(line.to_vec()).map_err(|e| ProtocolError::InvalidEncoding(e.to_string()))
}

fn get_decimal(src: &mut Cursor<&[u8]>) -> Result<i64, ProtocolError> {
    let line = get_line(src)?;
    let s = std::str::from_utf8(line).map_err(|e| ProtocolError::InvalidInteger(e.to_string()))?;
    s.parse::<i64>()
        .map_err(|e| ProtocolError::InvalidInteger(e.to_string()))
}

/// Comprimento de bulk/array; `None` para o nulo (-1).
fn get_length(src: &mut Cursor<&[u8]>) -> Result<Option<usize>, ProtocolError> {
    match get_decimal(src)? {
        -1 => Ok(None),
        n if n < 0 => Err(ProtocolError::InvalidLength(n)),
        n if n as usize > MAX_FRAME_SIZE => Err(ProtocolError::FrameTooLarge(n as usize)),
        n => Ok(Some(n as usize)),
    }
}

fn skip(src: &mut Cursor<&[u8]>, n: usize) -> Result<(), ProtocolError> {
    if src.remaining() < n {
        return Err(ProtocolError::Incomplete);
    }
    src.advance(n);
    Ok(())
}
