mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;


use std::process;

use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use domain::command::Command;
use ports::inbound::UseCaseRunner;
use wiring::{wire_wingman, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let cmd = config_to_command(config);
        let command_name = cmd_name_for_log(&cmd);
        self.app.logger.emit(
            LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name),
        );

        let result = match cmd {
            Command::Help => {
                print_help();
                Ok(0)
            }
            Command::Run => self.app.watch_loop().and_then(|mut watch| watch.run()),
            Command::Extract => {
                for message in self.app.inspect().extract() {
                    println!("[{}] {}", message.role.as_wire(), message.text);
                }
                Ok(0)
            }
            Command::Context { thread } => {
                let (thread, context) = self.app.inspect().context(thread.as_deref())?;
                let body = serde_json::to_string_pretty(&context.to_value())
                    .map_err(|e| Error::json(e.to_string()))?;
                println!("# {}", thread.storage_key());
                println!("{}", body);
                Ok(0)
            }
            Command::Unknown(name) => Err(Error::invalid_argument(format!(
                "Unknown command: {}",
                name
            ))),
        };

        let code = result.as_ref().copied().unwrap_or(0);
        self.app.logger.emit(
            LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            self.app.logger.emit(
                LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error"),
            );
        }
        result
    }
}

fn cmd_name_for_log(cmd: &Command) -> &'static str {
    match cmd {
        Command::Help => "help",
        Command::Run => "run",
        Command::Extract => "extract",
        Command::Context { .. } => "context",
        Command::Unknown(_) => "unknown",
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("wingman: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    if let Some(home) = &config.home_dir {
        std::env::set_var("WINGMAN_HOME", home);
    }
    let overrides = adapter::ConfigOverrides {
        api_base_url: config.api.clone(),
        page_snapshot: config.page.as_ref().map(std::path::PathBuf::from),
    };
    let app = wire_wingman(&overrides, config.verbose)?;
    let runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: wingman [options] [run | extract | context [thread]]");
}

fn print_help() {
    println!("Usage: wingman [options] [run | extract | context [thread]]");
    println!("Options:");
    println!("  -h, --help                 Show this help message");
    println!("  -d, --home <directory>     Home directory (overrides WINGMAN_HOME)");
    println!("      --api <url>            Base URL of the suggestion service (default: http://127.0.0.1:8000)");
    println!("      --page <file>          Page snapshot JSON written by the browser bridge");
    println!("  -v, --verbose              Also write logs to stderr");
    println!("      --generate <shell>     Generate shell completion script (bash, zsh, fish)");
    println!();
    println!("Commands:");
    println!("  run (default)              Watch the page and ask for suggestions when the other side writes");
    println!("  extract                    Print the messages found on the current page and exit");
    println!("  context [thread]           Print the stored context of a thread (default: current page)");
    println!();
    println!("While running, type on stdin:");
    println!("  suggest | s                Ask for suggestions now");
    println!("  up N | down N              Rate option N");
    println!("  copy N                     Copy option N (sent as a click)");
    println!("  commit                     Send the rated snapshot");
    println!("  reset                      Forget the context of this thread");
    println!("  quit | q                   Stop");
    println!();
    println!("Environment:");
    println!("  WINGMAN_HOME    Home directory. If unset, $XDG_CONFIG_HOME/wingman (e.g. ~/.config/wingman) is used.");
    println!("  WINGMAN_API     Base URL of the suggestion service (overridden by --api).");
    println!("  WINGMAN_PAGE    Page snapshot file (overridden by --page).");
}
