use anyhow::Result;
use moussaillon_core::{BackendChatClient, ChatMessage, ChatRole, ChatSession, McpClient};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub type Session = ChatSession<McpClient, BackendChatClient>;

pub async fn run(session: &mut Session, base_url: &str) -> Result<()> {
    println!(
        "moussAIllon ({}, IA: {}). Tapez 'help' pour l'aide, 'exit' pour quitter.",
        base_url,
        session.provider().display_name()
    );

    session.initialize().await;
    print_log(session.messages());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        if let Some(outcome) = session.submit(input).await {
            println!("{}", outcome.reply);
            if let Some(destination) = outcome.destination {
                println!("→ {}", destination);
            }
        }
    }

    Ok(())
}

/// Prints assistant messages already in the log (handshake warnings).
pub fn print_log(messages: &[ChatMessage]) {
    for message in messages.iter().filter(|m| m.role == ChatRole::Assistant) {
        println!("{}", message.content);
    }
}
