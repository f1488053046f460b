//! ジョブごとに名前付きスレッドを起こす Spawner

use crate::ports::outbound::{Job, Spawner};
use common::error::Error;

#[derive(Debug, Default)]
pub struct ThreadSpawner;

impl Spawner for ThreadSpawner {
    fn spawn(&self, job: Job) -> Result<(), Error> {
        std::thread::Builder::new()
            .name("wingman-relay".to_string())
            .spawn(job)
            .map(|_| ())
            .map_err(|e| Error::system(format!("Failed to spawn relay thread: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn test_runs_job_off_thread() {
        let (tx, rx) = channel();
        ThreadSpawner
            .spawn(Box::new(move || {
                let _ = tx.send(std::thread::current().name().map(str::to_string));
            }))
            .unwrap();
        let name = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(name.as_deref(), Some("wingman-relay"));
    }
}
