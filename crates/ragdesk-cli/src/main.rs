//! ragdesk — terminal front-end for a remote RAG document API.

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;
mod session;

use ragdesk_client::RagClient;
use ragdesk_core::{AnswerStyle, GatewayConfig, GatewayError};
use session::{Session, SAMPLE_QUESTIONS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if matches!(
        args.get(1).map(String::as_str),
        Some("--help" | "-h" | "help")
    ) {
        print_usage();
        return Ok(());
    }

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.user_message());
            eprintln!("Set API_BASE_URL to the address of the RAG API, e.g. http://localhost:8000");
            std::process::exit(2);
        }
    };
    info!("API base URL: {}", config.api_base_url);

    let mut session = Session::new(RagClient::new(config));

    match args.get(1).map(String::as_str) {
        None | Some("repl") => repl(&mut session).await,
        Some("health") => run_health(&session).await,
        Some("ask") => run_ask(&mut session, &args[2..]).await,
        Some("upload") => run_upload(&mut session, &args[2..]).await,
        Some("documents") => run_documents(&mut session).await,
        Some("delete") => run_delete(&mut session, &args[2..]).await,
        Some("stats") => run_stats(&mut session).await,
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'ragdesk help' for usage.", other);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("ragdesk — terminal client for a remote RAG document API");
    println!();
    println!("Usage: ragdesk [command]");
    println!();
    println!("Commands:");
    println!("  (none) | repl             Interactive session");
    println!("  health                    Check API reachability");
    println!("  ask <question> [--top-k N] [--style concise|detailed|explanatory]");
    println!("                            Ask one question");
    println!("  upload <path> [--force]   Upload and process a document");
    println!("  documents                 List processed documents");
    println!("  delete <filename>         Delete a document");
    println!("  stats                     Show collection statistics");
    println!("  help                      Show this help message");
    println!();
    println!("Environment:");
    println!("  API_BASE_URL              Base URL of the RAG API (required)");
    println!("  APP_TITLE                 Title shown by the interactive session");
    println!("  MAX_FILE_SIZE             Upload size limit in MB (default 50)");
}

fn fail(err: &GatewayError) -> ! {
    eprintln!("{}", err.user_message());
    std::process::exit(1);
}

async fn run_health(session: &Session) -> anyhow::Result<()> {
    if session.check_health().await {
        println!("API connected: {}", session.base_url());
        Ok(())
    } else {
        eprintln!("API disconnected: {}", session.base_url());
        eprintln!("Please check if the API service is running and accessible.");
        std::process::exit(1);
    }
}

async fn run_ask(session: &mut Session, args: &[String]) -> anyhow::Result<()> {
    let parsed = match parse_ask_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    if let Some(top_k) = parsed.top_k {
        if let Err(err) = session.set_top_k(top_k) {
            fail(&err);
        }
    }
    if let Some(style) = parsed.style {
        session.set_style(style);
    }

    match session.ask(&parsed.question).await {
        Ok(resp) => {
            println!("{}", render::render_query(&resp));
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

async fn run_upload(session: &mut Session, args: &[String]) -> anyhow::Result<()> {
    let (path, force) = match parse_upload_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    println!("Processing document... This may take a few minutes.");
    let started = std::time::Instant::now();
    match session.upload(&path, force).await {
        Ok(receipt) => {
            println!("{}", render::render_receipt(&receipt, started.elapsed()));
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

async fn run_documents(session: &mut Session) -> anyhow::Result<()> {
    match session.documents().await {
        Ok(docs) => {
            println!("{}", render::render_documents(&docs));
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

async fn run_delete(session: &mut Session, args: &[String]) -> anyhow::Result<()> {
    let filename = match args.first() {
        Some(name) => name,
        None => {
            eprintln!("Usage: ragdesk delete <filename>");
            std::process::exit(2);
        }
    };

    match session.delete(filename).await {
        Ok(receipt) => {
            println!(
                "{}",
                receipt
                    .message
                    .unwrap_or_else(|| format!("Deleted {}", filename))
            );
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

async fn run_stats(session: &mut Session) -> anyhow::Result<()> {
    match session.stats().await {
        Ok(stats) => {
            println!("{}", render::render_stats(&stats));
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

// ---------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------

async fn repl(session: &mut Session) -> anyhow::Result<()> {
    use std::io::Write;

    println!("=== {} ===", session.title());
    if session.check_health().await {
        println!("API connected: {}", session.base_url());
    } else {
        println!("API disconnected: {}", session.base_url());
        println!("Actions will fail until the service is reachable.");
    }
    println!("Type 'help' for commands, 'quit' to exit. Anything else is asked as a question.");

    let stdin = std::io::stdin();
    loop {
        print!("ragdesk> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "exit" => break,
            "help" => print_repl_help(),
            "samples" => {
                for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
                    println!("  {}. {}", i + 1, question);
                }
            }
            "style" => {
                if rest.is_empty() {
                    println!("Answer style: {}", session.answer_style);
                } else {
                    match rest.parse::<AnswerStyle>() {
                        Ok(style) => {
                            session.set_style(style);
                            println!("Answer style set to {}", style);
                        }
                        Err(err) => println!("{}", err.user_message()),
                    }
                }
            }
            "topk" => {
                if rest.is_empty() {
                    println!("Number of sources: {}", session.top_k);
                } else {
                    match rest.parse::<u32>() {
                        Ok(value) => match session.set_top_k(value) {
                            Ok(()) => println!("Number of sources set to {}", value),
                            Err(err) => println!("{}", err.user_message()),
                        },
                        Err(_) => println!("topk expects a number, got '{}'", rest),
                    }
                }
            }
            "docs" | "documents" => match session.documents().await {
                Ok(docs) => println!("{}", render::render_documents(&docs)),
                Err(err) => println!("{}", err.user_message()),
            },
            "stats" => match session.stats().await {
                Ok(stats) => println!("{}", render::render_stats(&stats)),
                Err(err) => println!("{}", err.user_message()),
            },
            "upload" => {
                let words: Vec<String> = rest.split_whitespace().map(String::from).collect();
                match parse_upload_args(&words) {
                    Ok((path, force)) => {
                        println!("Processing document... This may take a few minutes.");
                        let started = std::time::Instant::now();
                        match session.upload(&path, force).await {
                            Ok(receipt) => {
                                println!("{}", render::render_receipt(&receipt, started.elapsed()))
                            }
                            Err(err) => println!("{}", err.user_message()),
                        }
                    }
                    Err(message) => println!("{}", message),
                }
            }
            "delete" => {
                if rest.is_empty() {
                    println!("Usage: delete <filename>");
                } else {
                    match session.delete(rest).await {
                        Ok(receipt) => println!(
                            "{}",
                            receipt.message.unwrap_or_else(|| format!("Deleted {}", rest))
                        ),
                        Err(err) => println!("{}", err.user_message()),
                    }
                }
            }
            "last" => match &session.last_result {
                Some(resp) => println!("{}", render::render_query(resp)),
                None => println!("No result yet."),
            },
            "ask" => ask_and_render(session, rest).await,
            _ => ask_and_render(session, line).await,
        }
    }
    Ok(())
}

async fn ask_and_render(session: &mut Session, question: &str) {
    if question.trim().is_empty() {
        println!("Usage: ask <question>");
        return;
    }
    println!("Searching documents...");
    match session.ask(question).await {
        Ok(resp) => println!("{}", render::render_query(&resp)),
        Err(err) => println!("{}", err.user_message()),
    }
}

fn print_repl_help() {
    println!("Commands:");
    println!("  ask <question>       Ask a question (bare text works too)");
    println!("  style [S]            Show or set the answer style");
    println!("  topk [N]             Show or set the number of sources (1-10)");
    println!("  samples              Show sample questions");
    println!("  docs                 List processed documents");
    println!("  stats                Show collection statistics");
    println!("  upload <path> [--force]");
    println!("                       Upload and process a document");
    println!("  delete <filename>    Delete a document");
    println!("  last                 Show the last answer again");
    println!("  quit                 Exit");
}

// ---------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------

struct AskArgs {
    question: String,
    top_k: Option<u32>,
    style: Option<AnswerStyle>,
}

fn parse_ask_args(args: &[String]) -> Result<AskArgs, String> {
    let mut words: Vec<&str> = Vec::new();
    let mut top_k = None;
    let mut style = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--top-k" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--top-k needs a value".to_string())?;
                top_k = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --top-k value: {}", value))?,
                );
            }
            "--style" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--style needs a value".to_string())?;
                style = Some(value.parse::<AnswerStyle>().map_err(|e| e.user_message())?);
            }
            word => words.push(word),
        }
    }

    if words.is_empty() {
        return Err(
            "Usage: ragdesk ask <question> [--top-k N] [--style concise|detailed|explanatory]"
                .to_string(),
        );
    }

    Ok(AskArgs {
        question: words.join(" "),
        top_k,
        style,
    })
}

fn parse_upload_args(args: &[String]) -> Result<(PathBuf, bool), String> {
    let mut path = None;
    let mut force = false;

    for arg in args {
        match arg.as_str() {
            "--force" => force = true,
            other if path.is_none() => path = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument: {}", other)),
        }
    }

    path.map(|p| (p, force))
        .ok_or_else(|| "Usage: ragdesk upload <path> [--force]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_ask_args_joins_question_words() {
        let parsed = parse_ask_args(&strings(&["What", "was", "net", "income?"])).unwrap();
        assert_eq!(parsed.question, "What was net income?");
        assert_eq!(parsed.top_k, None);
        assert_eq!(parsed.style, None);
    }

    #[test]
    fn test_parse_ask_args_flags_anywhere() {
        let parsed = parse_ask_args(&strings(&[
            "--top-k", "3", "capital", "ratios?", "--style", "detailed",
        ]))
        .unwrap();
        assert_eq!(parsed.question, "capital ratios?");
        assert_eq!(parsed.top_k, Some(3));
        assert_eq!(parsed.style, Some(AnswerStyle::Detailed));
    }

    #[test]
    fn test_parse_ask_args_rejects_missing_values() {
        assert!(parse_ask_args(&strings(&["question", "--top-k"])).is_err());
        assert!(parse_ask_args(&strings(&["question", "--style", "verbose"])).is_err());
        assert!(parse_ask_args(&strings(&[])).is_err());
    }

    #[test]
    fn test_parse_upload_args() {
        let (path, force) = parse_upload_args(&strings(&["q1.pdf"])).unwrap();
        assert_eq!(path, PathBuf::from("q1.pdf"));
        assert!(!force);

        let (_, force) = parse_upload_args(&strings(&["q1.pdf", "--force"])).unwrap();
        assert!(force);

        assert!(parse_upload_args(&strings(&[])).is_err());
        assert!(parse_upload_args(&strings(&["a.pdf", "b.pdf"])).is_err());
    }
}
