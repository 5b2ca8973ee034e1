use std::{
    io::{stdin, stdout, BufRead, Write},
    path::PathBuf,
};

use clap::{error::ErrorKind, Parser, Subcommand};
use lib::{
    clock::LocalClock,
    config::Config,
    repository::{Error, Repository},
    work_tree::fs::FsWorkTree,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[clap(about = "a minimal interactive revision control shell")]
struct Arguments {
    #[arg(long, help = "initialize a repository at this path on startup")]
    path: Option<PathBuf>,
    #[arg(long, help = "print status, commits and the log as JSON")]
    json: bool,
    #[arg(long, help = "JSON configuration file")]
    config: Option<PathBuf>,
}

/// A single line typed at the prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_subcommand = true)]
struct Line {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(about = "initialize repository at path")]
    Init { path: PathBuf },
    #[clap(about = "show working tree status")]
    Status,
    #[clap(about = "commit changes with message")]
    Commit {
        #[arg(required = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    #[clap(about = "show commit history")]
    Log,
    #[clap(about = "show this help message")]
    Help,
    #[clap(about = "exit the program")]
    Exit,
}

const HELP: &str = "
Available commands:
  init <path>     - Initialize repository at path
  status          - Show working tree status
  commit <msg>    - Commit changes with message
  log             - Show commit history
  help            - Show this help message
  exit            - Exit the program
";

struct Shell {
    repo: Repository<FsWorkTree, LocalClock>,
    json: bool,
}

impl Shell {
    /// Runs one command. Returns `false` once the shell should stop.
    fn run(&mut self, cmd: Command) -> Result<bool, Error> {
        use Command::*;
        match cmd {
            Init { path } => {
                self.repo.init(&path)?;
                println!("Initialized mini-git repository in {}", path.display());
            }
            Status => {
                let status = self.repo.status()?;
                if self.json {
                    print_json(&status);
                } else {
                    println!("\n{}", status);
                }
            }
            Commit { message } => {
                let commit = self.repo.commit(&message.join(" "))?;
                if self.json {
                    print_json(commit);
                } else {
                    println!("{}", commit);
                }
            }
            Log => {
                let entries = self.repo.log()?;
                if self.json {
                    print_json(&entries);
                } else if entries.is_empty() {
                    println!("No commits yet.");
                } else {
                    println!("\n=== Commit History ===\n");
                    for entry in entries {
                        println!("{}", entry);
                    }
                }
            }
            Help => println!("{}", HELP),
            Exit => {
                println!("Goodbye!");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn print_json<A: Serialize + ?Sized>(thing: &A) {
    if let Err(err) = serde_json::to_writer_pretty(stdout(), thing) {
        log::error!("could not write JSON: {}", err);
    }
    println!();
}

fn main() {
    env_logger::init();
    let args = Arguments::parse();

    let config = match &args.config {
        Some(path) => match Config::read(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("could not read config {}: {}", path.display(), err);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    log::debug!("using {:?}", config);

    let mut shell = Shell {
        repo: Repository::new(FsWorkTree, LocalClock, config),
        json: args.json,
    };

    println!("=================================");
    println!("    Mini-Git Version Control     ");
    println!("=================================");
    println!("Commands: init, status, commit, log, help, exit\n");

    if let Some(path) = args.path {
        if let Err(err) = shell.run(Command::Init { path }) {
            eprintln!("{}", err);
        }
    }

    let mut lines = stdin().lock().lines();
    loop {
        print!("mini-git> ");
        if let Err(err) = stdout().flush() {
            log::error!("could not flush prompt: {}", err);
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                log::error!("could not read input: {}", err);
                break;
            }
            None => break,
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = words.first() else {
            continue;
        };
        match Line::try_parse_from(words.iter().copied()) {
            Ok(Line { cmd }) => match shell.run(cmd) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => println!("{}", err),
            },
            Err(err) if err.kind() == ErrorKind::InvalidSubcommand => {
                println!("Unknown command: {}", first);
                println!("Type 'help' for available commands.");
            }
            Err(err) => println!("{}", err),
        }
    }
}
