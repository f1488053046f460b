//! テスト用: 各ポートのスタブ実装


#[cfg(test)]
pub use stub::*;
