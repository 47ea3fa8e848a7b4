//! CLI mode: a stdin/stdout REPL over a single intake session.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Error;
use crate::intake::DialogueController;

/// Session used for the local REPL.
pub const CLI_SESSION_ID: &str = "cli";

fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit" | "/quit")
}

/// Run the REPL on stdin and stdout until `exit`, `quit` or EOF.
pub async fn run(controller: &DialogueController) -> Result<(), Error> {
    let reader = BufReader::new(tokio::io::stdin());
    run_with(controller, reader, tokio::io::stdout()).await
}

/// Run the REPL over arbitrary streams.
pub async fn run_with<R, W>(controller: &DialogueController, reader: R, mut out: W) -> Result<(), Error>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let greeting = controller.greeting(CLI_SESSION_ID).await?;
    out.write_all(format!("BizMart: {greeting}\n\n").as_bytes()).await?;
    out.flush().await?;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }
        let reply = controller.handle_turn(CLI_SESSION_ID, line).await?;
        out.write_all(format!("BizMart: {}\n\n", reply.response).as_bytes())
            .await?;
        out.flush().await?;
    }
    Ok(())
}
