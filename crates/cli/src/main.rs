use std::io::{self, Write};

use clap::Parser;

use ephemera_client::RemoteStore;
use ephemera_common::{DEFAULT_HOST, DEFAULT_PORT};
use ephemera_protocol::Frame;

const HELP: &str = "\
comandos:
  CREATE <job_seeker|employer>   cria um estado e imprime a chave
  CONSUME <chave>                lê e remove o estado (uso único)
  COUNT                          estados vivos
  TTL                            TTL do servidor em ms
  PING [msg]
  help | quit";

#[derive(Parser, Debug)]
#[command(name = "ephemera-cli", about = "Cliente de linha de comando do Ephemera")]
struct Args {
    #[arg(long, env = "EPHEMERA_HOST", default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, short, env = "EPHEMERA_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Comando para executar diretamente (modo não interativo)
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let remote = RemoteStore::connect(addr.as_str()).await?;

    // Modo comando único (via argumentos)
    if !args.command.is_empty() {
        let reply = remote.send(&request_frame(&args.command)).await?;
        println!("{}", format_frame(&reply));
        return Ok(());
    }

    println!("Conectado a {addr} (digite help)");

    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        print!("ephemera> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break; // EOF
        }

        let tokens = tokenize(input.trim());
        let Some(first) = tokens.first() else {
            continue;
        };

        match first.to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }

        match remote.send(&request_frame(&tokens)).await {
            Ok(reply) => println!("{}", format_frame(&reply)),
            // A próxima chamada reconecta sozinha
            Err(e) => println!("(error) {e}"),
        }
    }

    Ok(())
}

fn request_frame(tokens: &[String]) -> Frame {
    Frame::Array(tokens.iter().map(|t| Frame::bulk(t)).collect())
}

/// Tokeniza a linha de input com suporte a strings entre aspas.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), '\\') => match chars.next() {
                Some('n') => current.push('\n'),
                Some('t') => current.push('\t'),
                Some(other) => current.push(other),
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Formata um frame para exibição humana.
fn format_frame(frame: &Frame) -> String {
    match frame {
        Frame::Simple(s) => s.clone(),
        Frame::Error(s) => format!("(error) {s}"),
        Frame::Integer(n) => format!("(integer) {n}"),
        Frame::Bulk(data) => match std::str::from_utf8(data) {
            Ok(s) => format!("\"{s}\""),
            Err(_) => format!("(binary) {} bytes", data.len()),
        },
        // CONSUME sem valor: inexistente, expirado ou já usado
        Frame::Null => "(nil)".to_string(),
        Frame::Array(frames) if frames.is_empty() => "(empty array)".to_string(),
        Frame::Array(frames) => frames
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{}) {}", i + 1, format_frame(f)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
