//! Sembrowse query shell - interactive semantic code browsing
//!
//! Usage: sembrowse [-l <language>] <program_path>
//!
//! Shell input is dot-terminated; multi-line input is concatenated until a
//! trailing `.` is seen. Built-in commands:
//!   help.                  - Show help
//!   exit.                  - Exit the shell
//!   shell info.            - Show session details
//!   program info.          - Dump the loaded program
//!   load program <path>.   - Parse and load a different program

use std::fs;
use std::path::PathBuf;
use std::process;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing_subscriber::EnvFilter;

use sembrowse::error::format_query_error;
use sembrowse::repl::{InputResult, ShellCommand, ShellState};
use sembrowse::Language;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = "scb> ";
const CONTINUATION: &str = "...> ";

/// Parse command line arguments.
///
/// Usage: sembrowse [-l <language>] <program_path>
///
/// Options:
///   -l, --language <lang>  Source language: prolog or c
///   -h, --help             Show help and exit
///   -v, --version          Show version and exit
///
/// Returns (language_override, program_path)
fn parse_args(args: &[String]) -> (Option<Language>, Option<PathBuf>) {
    let mut language = None;
    let mut program_path = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-l" | "--language" => {
                if i + 1 < args.len() {
                    language = match args[i + 1].to_lowercase().as_str() {
                        "prolog" => Some(Language::Prolog),
                        "c" => Some(Language::C),
                        other => {
                            eprintln!("Error: Unknown language '{}' (expected prolog or c)", other);
                            process::exit(1);
                        }
                    };
                    i += 2;
                } else {
                    eprintln!("Error: -l requires a language argument");
                    process::exit(1);
                }
            }
            "-h" | "--help" => {
                println!("sembrowse v{} - Semantic Code Browsing shell", VERSION);
                println!();
                println!("Usage: sembrowse [OPTIONS] <program_path>");
                println!();
                println!("Options:");
                println!("  -l, --language <lang>  Source language: prolog or c");
                println!("                         (default: inferred from the file extension,");
                println!("                         prolog for directories)");
                println!("  -h, --help             Show this help message");
                println!("  -v, --version          Show version");
                println!();
                println!("Examples:");
                println!("  sembrowse family.pl         Browse one Prolog source file");
                println!("  sembrowse -l c src/         Browse every .c file under src/");
                process::exit(0);
            }
            "-v" | "--version" => {
                println!("sembrowse v{}", VERSION);
                process::exit(0);
            }
            _ if arg.starts_with('-') => {
                eprintln!("Error: Unknown option '{}'", arg);
                eprintln!("Try 'sembrowse --help' for usage information");
                process::exit(1);
            }
            _ => {
                program_path = Some(PathBuf::from(arg));
                i += 1;
            }
        }
    }

    (language, program_path)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (language_flag, program_path) = parse_args(&args);

    println!("sembrowse v{} - Semantic Code Browsing shell", VERSION);
    println!("Type help. for help, exit. to quit\n");

    let Some(path) = program_path else {
        eprintln!("Error: No program path given");
        eprintln!("Try 'sembrowse --help' for usage information");
        process::exit(1);
    };

    let language = language_flag
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(Language::from_extension)
        })
        .unwrap_or(Language::Prolog);

    let mut state = ShellState::new(language);
    if let Err(e) = state.load(&path) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    println!("{}", state.representation.render());

    // Set up rustyline
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> =
        Editor::with_config(config).expect("Failed to create editor");

    let history_path = shell_history_path();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    // Main shell loop
    loop {
        let prompt = if state.has_pending_input() {
            CONTINUATION
        } else {
            PROMPT
        };

        match rl.readline(prompt) {
            Ok(line) => match state.process_line(&line) {
                InputResult::Command(command) => {
                    if !handle_command(&mut state, command) {
                        break;
                    }
                }
                InputResult::Query(text) => {
                    handle_query(&state, &text);
                }
                InputResult::Incomplete | InputResult::Empty => {}
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C - clear pending input
                if state.has_pending_input() {
                    state.clear_pending_input();
                    println!("^C");
                } else {
                    println!("Use exit. or Ctrl-D to exit");
                }
            }
            Err(ReadlineError::Eof) => {
                println!("\nExiting...");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }
}

/// Handle a built-in command. Returns false if the shell should exit.
fn handle_command(state: &mut ShellState, command: ShellCommand) -> bool {
    match command {
        ShellCommand::Help => {
            print_help();
        }
        ShellCommand::Exit => {
            println!("Exiting...");
            return false;
        }
        ShellCommand::ShellInfo => {
            println!("{}", state.shell_info());
        }
        ShellCommand::ProgramInfo => {
            println!("{}", state.representation.render());
        }
        ShellCommand::Load(path) => match state.load(&path) {
            Ok(()) => println!(
                "Loaded {} definition(s) from {}",
                state.representation.len(),
                path.display()
            ),
            Err(e) => eprintln!("Error: {}", e),
        },
    }
    true
}

fn handle_query(state: &ShellState, text: &str) {
    match state.execute_query(text) {
        Ok(result) => println!("{}", result.render()),
        Err(e) => {
            eprintln!("Syntax Error - the entered query was not parsable!");
            eprintln!("{}", format_query_error(text, &e));
        }
    }
}

fn print_help() {
    println!("Shell commands (all input ends with `.`):");
    println!();
    println!("  help.                 Show this help");
    println!("  exit.                 Exit the shell");
    println!("  shell info.           Show session details");
    println!("  program info.         Dump the loaded program");
    println!("  load program <path>.  Parse and load a different program");
    println!();
    println!("Queries:");
    println!();
    println!("  find <kind>[/<arity>] [where <assertions>].");
    println!();
    println!("  <kind>        predicate | function");
    println!("  <assertions>  <op>:<value>[,<value>...] joined by and/or");
    println!("  <op>          inputs | bodycontains | returns");
    println!();
    println!("Examples:");
    println!("  find predicate.");
    println!("  find predicate/2 where inputs:atom,var.");
    println!("  find function/1 where bodycontains:loop and returns:int.");
}

fn shell_history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("sembrowse");
        path.push("history");
        path
    })
}
