//! 単一スレッドの協調スケジューラ
//!
//! 名前付きの周期タスクと、同名なら置き換わる 1 回きりの遅延タスクを持つ。
//! 時刻は呼び出し側が渡す（Clock に依存しない）。

/// スケジュール対象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// スレッド切り替えの確認
    Rotation,
    /// メインの監視周期
    Tick,
    /// DOM が落ち着いたかの再確認
    Debounce,
    /// 起動直後の 1 回
    Boot,
    /// 応答の来ない要求の打ち切り
    Watchdog,
}

#[derive(Debug, Clone)]
struct Periodic {
    task: Task,
    interval_ms: u64,
    next_due_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    periodic: Vec<Periodic>,
    delayed: Vec<(Task, u64)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 周期タスクを登録する（初回は now + interval）
    pub fn every(&mut self, task: Task, interval_ms: u64, now_ms: u64) {
        let interval_ms = interval_ms.max(1);
        self.periodic.retain(|p| p.task != task);
        self.periodic.push(Periodic {
            task,
            interval_ms,
            next_due_ms: now_ms.saturating_add(interval_ms),
        });
    }

    /// 遅延タスクを設定する。同じタスクが待機中なら取り消して置き換える。
    pub fn once(&mut self, task: Task, delay_ms: u64, now_ms: u64) {
        self.cancel(task);
        self.delayed.push((task, now_ms.saturating_add(delay_ms)));
    }

    pub fn cancel(&mut self, task: Task) {
        self.delayed.retain(|(t, _)| *t != task);
    }

    /// 期限の来たタスクを期限順に返す
    ///
    /// 周期タスクは遅れても 1 回だけ返し、次回は now から数え直す。
    pub fn due(&mut self, now_ms: u64) -> Vec<Task> {
        let mut fired: Vec<(u64, usize, Task)> = Vec::new();
        for (i, p) in self.periodic.iter_mut().enumerate() {
            if p.next_due_ms <= now_ms {
                fired.push((p.next_due_ms, i, p.task));
                p.next_due_ms = p.next_due_ms.saturating_add(p.interval_ms);
                if p.next_due_ms <= now_ms {
                    p.next_due_ms = now_ms.saturating_add(p.interval_ms);
                }
            }
        }
        let offset = self.periodic.len();
        let mut remaining = Vec::with_capacity(self.delayed.len());
        for (i, (task, at)) in self.delayed.drain(..).enumerate() {
            if at <= now_ms {
                fired.push((at, offset + i, task));
            } else {
                remaining.push((task, at));
            }
        }
        self.delayed = remaining;
        fired.sort_by_key(|&(at, order, _)| (at, order));
        fired.into_iter().map(|(_, _, t)| t).collect()
    }

    /// 次に期限が来る時刻
    pub fn next_deadline(&self) -> Option<u64> {
        self.periodic
            .iter()
            .map(|p| p.next_due_ms)
            .chain(self.delayed.iter().map(|(_, at)| *at))
            .min()
    }
}
