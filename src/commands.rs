/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "guild",
    aliases: &["g", "server"],
    description: "Switch guild: guild <id>",
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Reload the block-list from the server",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit blockwatch",
  },
];

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  SwitchGuild(String),
  Refresh,
  Quit,
  /// Command is known but its argument is missing or malformed
  Usage(&'static str),
  Unknown(String),
}

/// Parse a submitted command line into an action
pub fn parse(line: &str) -> Action {
  let mut parts = line.split_whitespace();
  let Some(head) = parts.next() else {
    return Action::Unknown(String::new());
  };
  let arg = parts.next();

  let Some(cmd) = resolve(head) else {
    return Action::Unknown(head.to_string());
  };

  match cmd.name {
    "guild" => match arg {
      Some(id) if id.chars().all(|c| c.is_ascii_digit()) => Action::SwitchGuild(id.to_string()),
      _ => Action::Usage("guild <numeric id>"),
    },
    "refresh" => Action::Refresh,
    "quit" => Action::Quit,
    _ => Action::Unknown(head.to_string()),
  }
}

/// Find the command named or aliased exactly by `word`
pub fn resolve(word: &str) -> Option<&'static Command> {
  let word = word.to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == word || cmd.aliases.contains(&word.as_str()))
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  // Once an argument is being typed the command is settled
  if input_lower.contains(char::is_whitespace) {
    return Vec::new();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}
