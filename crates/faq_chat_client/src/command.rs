//! Interactive input grammar: plain lines are questions, `/` starts a command.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the line as a question.
    Ask(String),
    /// Start a new conversation.
    New,
    /// Open the knowledge browser, optionally with a filter.
    Browse(String),
    /// Change the browser filter.
    Filter(String),
    /// Submit the question of the FAQ entry with this id.
    Pick(i64),
    Close,
    Topics,
    Suggest(Option<usize>),
    Status,
    History,
    Help,
    Quit,
    /// Blank line.
    Empty,
    Unknown(String),
}

pub const HELP: &str = "\
Type a question and press enter, or use a command:
  /new             start a new conversation
  /faq [filter]    browse the knowledge base
  /filter <text>   change the knowledge base filter
  /pick <id>       ask the question of a knowledge base entry
  /close           close the knowledge base
  /topics          list categories
  /suggest [n]     suggest questions
  /status          check the backend
  /history         show the conversation
  /help            show this help
  /quit            exit";

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Ask(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name.to_ascii_lowercase().as_str() {
            "new" | "home" => Command::New,
            "faq" | "browse" => Command::Browse(arg.to_string()),
            "filter" | "search" => Command::Filter(arg.to_string()),
            "pick" => match arg.parse() {
                Ok(id) => Command::Pick(id),
                Err(_) => Command::Unknown(line.to_string()),
            },
            "close" => Command::Close,
            "topics" | "categories" => Command::Topics,
            "suggest" if arg.is_empty() => Command::Suggest(None),
            "suggest" => match arg.parse() {
                Ok(n) => Command::Suggest(Some(n)),
                Err(_) => Command::Unknown(line.to_string()),
            },
            "status" => Command::Status,
            "history" => Command::History,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            Command::parse("  Where is my order? "),
            Command::Ask("Where is my order?".into())
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn browse_with_and_without_filter() {
        assert_eq!(Command::parse("/faq"), Command::Browse(String::new()));
        assert_eq!(
            Command::parse("/faq  ship ping "),
            Command::Browse("ship ping".into())
        );
    }

    #[test]
    fn pick_requires_numeric_id() {
        assert_eq!(Command::parse("/pick 12"), Command::Pick(12));
        assert_eq!(
            Command::parse("/pick twelve"),
            Command::Unknown("/pick twelve".into())
        );
    }

    #[test]
    fn suggest_count_is_optional() {
        assert_eq!(Command::parse("/suggest"), Command::Suggest(None));
        assert_eq!(Command::parse("/suggest 5"), Command::Suggest(Some(5)));
    }

    #[test]
    fn command_names_ignore_case() {
        assert_eq!(Command::parse("/NEW"), Command::New);
        assert_eq!(Command::parse("/Quit"), Command::Quit);
    }

    #[test]
    fn unknown_command() {
        assert_eq!(Command::parse("/frobnicate"), Command::Unknown("/frobnicate".into()));
    }
}
