//! faq-chat: terminal chat for the FAQ assistant.
//! With a QUESTION argument, asks it once and prints the answer. Otherwise reads
//! questions and `/` commands from stdin until EOF or `/quit`.

use clap::Parser;
use faq_chat_client::config::{self, Config, ConfigSource};
use faq_chat_client::{
    Client, Command, ConversationStore, KnowledgeBrowser, Message, Role, SubmitOutcome,
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "faq-chat", about = "Ask the FAQ assistant from the terminal")]
struct Cli {
    /// Config file (defaults to $FAQ_CHAT_CONFIG, then ~/.faq-chat/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API root, overriding `api.base_url`
    #[arg(long, env = "FAQ_CHAT_BASE_URL")]
    base_url: Option<String>,

    /// Write the effective config (including --base-url) to the config file and exit
    #[arg(long)]
    save_config: bool,

    /// Ask this question once and exit
    question: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<(ConfigSource, Config), String> {
    let source = config::resolve_source(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let mut cfg = config::load_from(&source).map_err(|e| {
        format!(
            "failed to load config from {}: {}",
            source.path().display(),
            e
        )
    })?;
    if let Some(url) = &cli.base_url {
        cfg.api.base_url = Some(url.clone());
    }
    Ok((source, cfg))
}

/// Presentation layer: owns both stores and prints their state.
struct App {
    client: Client,
    conversation: ConversationStore,
    browser: KnowledgeBrowser,
    suggestion_count: usize,
}

enum Flow {
    Continue,
    Quit,
}

impl App {
    async fn ask(&mut self, text: &str) -> SubmitOutcome {
        let outcome = self.conversation.submit(&self.client, text).await;
        match outcome {
            SubmitOutcome::Answered | SubmitOutcome::Failed => {
                if let Some(reply) = self.conversation.history().last() {
                    print_reply(reply);
                }
            }
            SubmitOutcome::Ignored | SubmitOutcome::Stale => {}
        }
        outcome
    }

    async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Empty => {}
            Command::Ask(text) => {
                self.ask(&text).await;
            }
            Command::New => {
                self.conversation.reset();
                println!("Started a new conversation.");
            }
            Command::Browse(filter) => {
                self.browser.activate_and_load(&self.client).await;
                self.browser.set_query(&filter);
                self.print_browser();
            }
            Command::Filter(filter) => {
                if self.browser.is_active() {
                    self.browser.set_query(&filter);
                    self.print_browser();
                } else {
                    println!("The knowledge base is closed; open it with /faq.");
                }
            }
            Command::Pick(id) => match self.browser.select_entry(id) {
                Some(question) => {
                    println!("you> {question}");
                    self.ask(&question).await;
                }
                None if self.browser.entries().is_empty() => {
                    println!("Open the knowledge base with /faq first.");
                }
                None => println!("No knowledge base entry with id {id}."),
            },
            Command::Close => self.browser.deactivate(),
            Command::Topics => match self.client.categories().await {
                Ok(categories) => {
                    for category in categories {
                        println!("  {category}");
                    }
                }
                Err(e) => eprintln!("Could not load categories: {e}"),
            },
            Command::Suggest(n) => {
                let n = n.unwrap_or(self.suggestion_count);
                match self.client.suggestions(n).await {
                    Ok(questions) => {
                        for question in questions {
                            println!("  {question}");
                        }
                    }
                    Err(e) => eprintln!("Could not load suggestions: {e}"),
                }
            }
            Command::Status => match self.client.status().await {
                Ok(status) if status.is_online() => {
                    println!("{} is online.", self.client.base_url());
                }
                Ok(status) => println!("{} reports status {}.", self.client.base_url(), status.status),
                Err(e) => eprintln!("{} is unreachable: {e}", self.client.base_url()),
            },
            Command::History => {
                for message in self.conversation.history() {
                    match message.role {
                        Role::User => println!("you> {}", message.text),
                        Role::Assistant => print_reply(message),
                    }
                }
            }
            Command::Help => println!("{}", faq_chat_client::command::HELP),
            Command::Quit => return Flow::Quit,
            Command::Unknown(line) => println!("Unknown command {line}; try /help."),
        }
        Flow::Continue
    }

    fn print_browser(&self) {
        if !self.browser.is_loaded() {
            println!("Loading...");
            return;
        }
        let groups = self.browser.groups();
        if groups.is_empty() {
            println!("No questions found matching your search.");
            return;
        }
        for group in groups {
            println!("{}", group.category.to_uppercase());
            for entry in group.entries {
                println!("  [{}] {}", entry.id, entry.question);
            }
        }
    }
}

fn print_reply(message: &Message) {
    println!("faq> {}", message.text);
    if let Some(matched) = &message.matched_question {
        println!("     matched: {matched}");
    }
    if let (Some(score), Some(level)) = (message.confidence_score, message.confidence_level()) {
        println!(
            "     confidence: {}% ({})",
            (score * 100.0).round(),
            level.label()
        );
    }
    if message.is_low_confidence() {
        println!("     (low confidence, try rephrasing)");
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let (source, cfg) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.save_config {
        return match config::save(source.path(), &cfg) {
            Ok(()) => {
                println!("Saved config to {}", source.path().display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!(
                    "Error: failed to save config to {}: {}",
                    source.path().display(),
                    e
                );
                ExitCode::FAILURE
            }
        };
    }

    let client = match Client::from_config(&cfg.api) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // All state transitions run on this one thread.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App {
        client,
        conversation: ConversationStore::new(),
        browser: KnowledgeBrowser::new(),
        suggestion_count: cfg.chat.suggestion_count(),
    };

    if let Some(question) = cli.question {
        return match rt.block_on(app.ask(&question)) {
            SubmitOutcome::Answered => ExitCode::SUCCESS,
            SubmitOutcome::Ignored => {
                eprintln!("Error: no question provided");
                ExitCode::FAILURE
            }
            SubmitOutcome::Failed | SubmitOutcome::Stale => {
                eprintln!("Error: no answer from {}", app.client.base_url());
                ExitCode::FAILURE
            }
        };
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!("{}", faq_chat_client::command::HELP);
    }
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            let _ = io::stdout().flush();
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error: failed to read stdin: {e}");
                return ExitCode::FAILURE;
            }
            None => break,
        };
        if let Flow::Quit = rt.block_on(app.handle(Command::parse(&line))) {
            break;
        }
    }
    ExitCode::SUCCESS
}
