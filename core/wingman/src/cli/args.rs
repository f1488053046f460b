use crate::domain::command::Command;
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub help: bool,
    /// -d / --home: WINGMAN_HOME を上書きする
    pub home_dir: Option<String>,
    /// --api: 提案サービスのベース URL
    pub api: Option<String>,
    /// --page: ページスナップショットの JSON ファイル
    pub page: Option<String>,
    /// -v / --verbose: ログを stderr にも出す
    pub verbose: bool,
    pub command_name: Option<String>,
    pub command_args: Vec<String>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("wingman")
        .about("Watch a chat page and suggest replies")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("home")
                .short('d')
                .long("home")
                .value_name("directory")
                .help("Home directory (overrides WINGMAN_HOME)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("api")
                .long("api")
                .value_name("url")
                .help("Base URL of the suggestion service")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("page")
                .long("page")
                .value_name("file")
                .help("Page snapshot JSON written by the browser bridge")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Also write logs to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("positional")
                .index(1)
                .help("Command (run, extract, context) and its arguments")
                .num_args(0..)
                .trailing_var_arg(true),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let positional: Vec<String> = matches
        .get_many::<String>("positional")
        .map(|i| i.cloned().collect())
        .unwrap_or_default();
    let (command_name, command_args) = match positional.split_first() {
        Some((first, rest)) => (Some(first.clone()), rest.to_vec()),
        None => (None, vec![]),
    };

    Config {
        help: matches.get_flag("help"),
        home_dir: matches.get_one::<String>("home").cloned(),
        api: matches.get_one::<String>("api").cloned(),
        page: matches.get_one::<String>("page").cloned(),
        verbose: matches.get_flag("verbose"),
        command_name,
        command_args,
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[String]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let opts = "-h --help -d --home --api --page -v --verbose --generate";
    let commands = "run extract context help";
    match shell {
        Shell::Bash => {
            println!(
                r#"# Fallback completion for wingman
_wingman() {{
  local cur="${{COMP_WORDS[COMP_CWORD]}}"
  COMPREPLY=($(compgen -W "{commands} {opts}" -- "$cur"))
}}
complete -F _wingman wingman
"#,
                commands = commands,
                opts = opts
            );
        }
        Shell::Zsh => {
            println!(
                r#"#compdef wingman
local -a reply
reply=({commands} {opts})
_describe 'wingman' reply
"#,
                commands = commands,
                opts = opts
            );
        }
        Shell::Fish => {
            println!(
                r#"complete -c wingman -l help -s h -d "Show help"
complete -c wingman -l home -s d -d "Home directory" -r
complete -c wingman -l api -d "Suggestion service URL" -r
complete -c wingman -l page -d "Page snapshot file" -r
complete -c wingman -l verbose -s v -d "Log to stderr"
complete -c wingman -l generate -d "Generate completion script" -r -a "bash zsh fish"
complete -c wingman -f -a "{commands}"
"#,
                commands = commands
            );
        }
        _ => {}
    }
}

/// Config を Command に変換する
pub fn config_to_command(config: Config) -> Command {
    if config.help {
        return Command::Help;
    }
    match config.command_name {
        None => Command::Run,
        Some(name) => Command::parse_with_args(&name, &config.command_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_no_args_runs_loop() {
        let config = parse_args_from(&args(&["wingman"])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config_to_command(config), Command::Run);
    }

    #[test]
    fn test_parse_args_options() {
        let config = parse_args_from(&args(&[
            "wingman", "-v", "-d", "/tmp/wm", "--api", "http://svc", "--page", "/tmp/p.json",
        ]))
        .unwrap();
        assert!(config.verbose);
        assert_eq!(config.home_dir.as_deref(), Some("/tmp/wm"));
        assert_eq!(config.api.as_deref(), Some("http://svc"));
        assert_eq!(config.page.as_deref(), Some("/tmp/p.json"));
    }

    #[test]
    fn test_parse_args_command_with_args() {
        let config = parse_args_from(&args(&["wingman", "context", "/t/1"])).unwrap();
        assert_eq!(config.command_name.as_deref(), Some("context"));
        assert_eq!(
            config_to_command(config),
            Command::Context {
                thread: Some("/t/1".to_string())
            }
        );
    }

    #[test]
    fn test_help_wins_over_command() {
        let config = parse_args_from(&args(&["wingman", "-h", "extract"])).unwrap();
        assert_eq!(config_to_command(config), Command::Help);
    }

    #[test]
    fn test_parse_args_unknown_option() {
        let err = parse_args_from(&args(&["wingman", "--nope"])).unwrap_err();
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_unknown_command() {
        let config = parse_args_from(&args(&["wingman", "dance"])).unwrap();
        assert_eq!(
            config_to_command(config),
            Command::Unknown("dance".to_string())
        );
    }
}
