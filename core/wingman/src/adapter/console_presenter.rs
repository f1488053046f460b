//! 端末へ状態と提案を出す Presenter
//!
//! heat は表示時だけ 0..=4 に丸める。

use crate::domain::{RenderState, Status};
use crate::ports::outbound::Presenter;
use std::io::Write;
use std::sync::Mutex;

pub struct ConsolePresenter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsolePresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_lines(&self, lines: &[String]) {
        // 表示の失敗はループに影響させない
        if let Ok(mut out) = self.out.lock() {
            for line in lines {
                let _ = writeln!(out, "{}", line);
            }
            let _ = out.flush();
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// 1 回分の描画内容
pub fn format_render(state: &RenderState) -> Vec<String> {
    let heat = state.display_heat();
    let mut lines = vec![format!(
        "[heat H{} {}] [stage {}]",
        heat,
        "*".repeat(heat as usize),
        state.stage.to_uppercase()
    )];
    if state.options.is_empty() {
        lines.push("  (no suggestion)".to_string());
    }
    for (i, option) in state.options.iter().enumerate() {
        lines.push(format!("  {}) {}", i + 1, option));
    }
    lines
}

impl<W: Write + Send> Presenter for ConsolePresenter<W> {
    fn status(&self, status: Status) {
        self.write_lines(&[format!("status: {}", status)]);
    }

    fn render(&self, state: &RenderState) {
        self.write_lines(&format_render(state));
    }

    fn notice(&self, message: &str) {
        self.write_lines(&[format!("* {}", message)]);
    }
}
