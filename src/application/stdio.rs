use super::bridge::{Bridge, QueryRequest};
use crate::infrastructure::model::ModelProvider;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

#[derive(Debug, Error)]
pub enum StdioError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
}

enum LoopControl {
    Continue,
    Exit,
}

/// Interactive chat over the process's own stdin/stdout.
pub async fn run<P>(bridge: Arc<Bridge<P>>) -> Result<(), StdioError>
where
    P: ModelProvider + 'static,
{
    run_with(bridge, BufReader::new(io::stdin()), io::stdout()).await
}

/// The chat loop over arbitrary streams. Returns when the input ends or the
/// user quits.
pub async fn run_with<P, R, W>(
    bridge: Arc<Bridge<P>>,
    input: R,
    mut output: W,
) -> Result<(), StdioError>
where
    P: ModelProvider + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    print_banner(&mut output).await?;

    loop {
        output.write_all(b"\nQuery: ").await?;
        output.flush().await?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => {
                write_line(&mut output, "\nInput closed. Exiting...").await?;
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let lowered = input.to_ascii_lowercase();
        if lowered == "quit" || lowered == "exit" {
            write_line(&mut output, "\nExiting...").await?;
            break;
        }

        if input.starts_with('/') {
            match handle_command(input, bridge.as_ref(), &mut output).await? {
                LoopControl::Continue => continue,
                LoopControl::Exit => break,
            }
        }

        write_line(&mut output, "\nThinking...").await?;
        let outcome = bridge.query_outcome(QueryRequest::new(input)).await;
        if outcome.success {
            write_line(&mut output, &format!("\nResponse: {}", outcome.response)).await?;
        } else {
            let message = outcome.error.unwrap_or_default();
            write_line(&mut output, &format!("\nError: {message}")).await?;
        }
    }

    output.flush().await?;
    Ok(())
}

async fn handle_command<P, W>(
    input: &str,
    bridge: &Bridge<P>,
    output: &mut W,
) -> Result<LoopControl, StdioError>
where
    P: ModelProvider,
    W: AsyncWrite + Unpin,
{
    let name = input
        .trim_start_matches('/')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    debug!(command = %name, "Processing STDIO command");

    match name.as_str() {
        "help" | "?" => print_help(output).await?,
        "quit" | "exit" | "q" => {
            write_line(output, "\nExiting...").await?;
            return Ok(LoopControl::Exit);
        }
        "tools" => match bridge.tools().await {
            Ok(tools) if tools.is_empty() => {
                write_line(output, "The server exposes no tools.").await?;
            }
            Ok(tools) => {
                write_line(output, &format!("Available tools ({}):", tools.len())).await?;
                for tool in tools {
                    write_line(output, &format!("  - {}: {}", tool.name, tool.description))
                        .await?;
                }
            }
            Err(err) => write_line(output, &format!("Error: {}", err.user_message())).await?,
        },
        "history" => {
            let turns = bridge.conversation();
            if turns.is_empty() {
                write_line(output, "No conversation yet.").await?;
            } else {
                for turn in &turns {
                    write_line(output, &turn.render()).await?;
                }
            }
        }
        "clear" | "reset" => {
            bridge.clear_conversation();
            write_line(output, "Conversation history cleared.").await?;
        }
        other => {
            write_line(
                output,
                &format!("Unknown command '/{other}'. Type /help for the list of commands."),
            )
            .await?;
        }
    }
    Ok(LoopControl::Continue)
}

async fn print_banner<W: AsyncWrite + Unpin>(output: &mut W) -> io::Result<()> {
    write_line(output, "\nGemini MCP Client Started!").await?;
    write_line(output, "Type your queries or 'quit' to exit. /help lists commands.").await
}

async fn print_help<W: AsyncWrite + Unpin>(output: &mut W) -> io::Result<()> {
    write_line(output, "\nAvailable commands:").await?;
    write_line(output, "  /tools      List the tools the server exposes").await?;
    write_line(output, "  /history    Show the conversation so far").await?;
    write_line(output, "  /clear      Forget the conversation").await?;
    write_line(output, "  /help       Show this help").await?;
    write_line(output, "  quit, exit  Leave the chat").await
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}
