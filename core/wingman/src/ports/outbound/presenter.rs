//! 提示層（パネル描画）への Outbound ポート
//!
//! 描画やアニメーションは範囲外。状態と RenderState と短い通知だけを渡す。

use crate::domain::{RenderState, Status};

pub trait Presenter: Send + Sync {
    fn status(&self, status: Status);

    /// 内容が変わったときだけ呼ばれる
    fn render(&self, state: &RenderState);

    /// コミット結果・リセット完了などの一時的な通知
    fn notice(&self, message: &str);
}
