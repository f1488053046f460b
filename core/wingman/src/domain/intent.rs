//! 提示層から届く利用者の操作

use crate::domain::snapshot::FeedbackLabel;

/// 利用者の操作（index は 0 始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// 手動での提案要求（自動トリガーと同じガードを通る）
    RequestSuggestion,
    /// 選択肢の評価（Up / Down のみ）
    Rate { index: usize, label: FeedbackLabel },
    /// 選択肢のコピー（clicked フィードバック）
    Copy { index: usize },
    Commit,
    Reset,
    Quit,
}

impl Intent {
    /// 1 行の入力を解析する。番号は画面表示どおり 1 始まり。
    ///
    /// 空行・未知の語・番号の欠落は None。
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?.to_lowercase();
        let index = words
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1));
        match verb.as_str() {
            "suggest" | "s" => Some(Intent::RequestSuggestion),
            "up" | "+" => index.map(|index| Intent::Rate {
                index,
                label: FeedbackLabel::Up,
            }),
            "down" | "-" => index.map(|index| Intent::Rate {
                index,
                label: FeedbackLabel::Down,
            }),
            "copy" | "c" => index.map(|index| Intent::Copy { index }),
            "commit" => Some(Intent::Commit),
            "reset" => Some(Intent::Reset),
            "quit" | "q" | "exit" => Some(Intent::Quit),
            _ => None,
        }
    }
}
