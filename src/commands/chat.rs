//! Interactive chat and one-shot questions

use crate::chat::RagChat;
use crate::error::Result;
use chrono::Local;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Answer a single question and exit
pub async fn ask(chat: &mut RagChat, question: &str) {
    let answer = chat.generate_response(question).await;
    println!("{answer}");
}

const REPL_HELP: &str = "Commands:\n\
  /docs     list indexed documents\n\
  /summary  show conversation summary\n\
  /suggest  suggest questions to ask\n\
  /export   save the transcript to a file\n\
  /clear    forget the conversation so far\n\
  /quit     leave the chat";

/// Interactive read-eval loop over stdin
pub async fn repl(chat: &mut RagChat) -> Result<()> {
    let info = chat.indexer().collection_info().await;
    println!(
        "Chatting over '{}' ({} chunks indexed). Type /help for commands.",
        info.collection_name, info.total_chunks
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/help" => println!("{REPL_HELP}"),
            "/clear" => {
                chat.clear_history();
                println!("Conversation cleared.");
            }
            "/summary" => {
                let summary = chat.summary();
                println!("Exchanges: {}", summary.total_exchanges);
                if let Some(last) = &summary.last_query {
                    println!("Last question: {last}");
                }
                if !summary.documents_referenced.is_empty() {
                    println!(
                        "Documents referenced: {}",
                        summary.documents_referenced.join(", ")
                    );
                }
            }
            "/docs" => {
                let docs = chat.indexer().list_documents().await;
                if docs.is_empty() {
                    println!("No documents indexed.");
                } else {
                    for doc in docs {
                        println!("  {doc}");
                    }
                }
            }
            "/suggest" => {
                for question in chat.suggest_questions(5).await {
                    println!("  {question}");
                }
            }
            "/export" => {
                let path = format!(
                    "conversation-{}.txt",
                    Local::now().format("%Y%m%d-%H%M%S")
                );
                std::fs::write(&path, chat.export())?;
                println!("Transcript written to {path}");
            }
            _ if input.starts_with('/') => {
                println!("Unknown command '{input}'. Type /help for commands.");
            }
            question => {
                let answer = chat.generate_response(question).await;
                println!("{answer}");
            }
        }
    }

    println!("Bye.");
    Ok(())
}
