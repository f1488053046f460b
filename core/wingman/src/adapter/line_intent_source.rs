//! 行単位の入力（標準入力など）を読んで Intent に変換する IntentSource
//!
//! 読み取りは専用スレッドで行い、監視ループは poll でチャネルから取り出す。

use crate::domain::Intent;
use crate::ports::outbound::IntentSource;
use std::io::BufRead;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

pub struct LineIntentSource {
    rx: Mutex<Receiver<Intent>>,
}

impl LineIntentSource {
    /// 読み取りスレッドを起動する。EOF で読み取りを終える（ループは止めない）。
    ///
    /// # Errors
    /// スレッドを起動できなければ `Error::System`。
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Result<Self, common::error::Error> {
        let (tx, rx) = channel();
        std::thread::Builder::new()
            .name("wingman-intents".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    if let Some(intent) = Intent::parse(&line) {
                        if tx.send(intent).is_err() {
                            break;
                        }
                    }
                }
            })
            .map_err(|e| common::error::Error::system(format!("Failed to start input reader: {}", e)))?;
        Ok(Self { rx: Mutex::new(rx) })
    }

    pub fn stdin() -> Result<Self, common::error::Error> {
        Self::spawn(std::io::BufReader::new(std::io::stdin()))
    }
}

impl IntentSource for LineIntentSource {
    fn poll(&self) -> Option<Intent> {
        self.rx.lock().ok()?.try_recv().ok()
    }
}
