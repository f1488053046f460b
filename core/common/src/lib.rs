//! Wingman 共通ライブラリ
//!
//! `wingman` アプリと将来の補助ツールで共有される機能を提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（Newtype・ディレクトリ）
pub mod domain;

/// Outbound ポート（trait）
pub mod ports;

/// ポートの標準実装
pub mod adapter;
