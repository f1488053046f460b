//! wingman コマンドの enum（Command Pattern）
//!
//! 引数解析の結果を enum に落とし、match でディスパッチする。

/// wingman のサブコマンド
///
/// コマンドなし = 監視ループ起動。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// ヘルプ表示
    Help,

    /// ページを監視して提案を要求するループ（コマンド未指定時）
    Run,

    /// 現在のページから抽出したメッセージを 1 回だけ表示する
    Extract,

    /// 保存済みコンテキストの表示（context [<thread>]、省略時は現在のスレッド）
    Context { thread: Option<String> },

    /// 未知のコマンド（エラー用）
    Unknown(String),
}

impl Command {
    /// コマンド名と引数から Command に解析する
    pub fn parse_with_args(name: &str, args: &[String]) -> Self {
        match name {
            "run" => Command::Run,
            "help" => Command::Help,
            "extract" => Command::Extract,
            "context" => Command::Context {
                thread: args.first().cloned(),
            },
            other => Command::Unknown(other.to_string()),
        }
    }
}
