use std::{path::PathBuf, time::Duration};
use tracing::info;

use crate::error::{Error, Result};

/// Splits `files` into consecutive groups of `size`. Only the last group may
/// be shorter.
pub fn make_batches(files: &[PathBuf], size: usize) -> Result<Vec<&[PathBuf]>> {
    if size == 0 {
        return Err(Error::config("batch size must be at least 1"));
    }
    Ok(files.chunks(size).collect())
}

/// Throttles requests by sleeping between batches.
#[derive(Debug)]
pub struct Pacer {
    wait: Duration,
    pauses: usize,
}

impl Pacer {
    pub fn new(wait: Duration) -> Self {
        Self { wait, pauses: 0 }
    }

    pub async fn pause(&mut self) {
        info!(
            "Waiting {:.1} seconds before processing the next batch...",
            self.wait.as_secs_f64()
        );
        tokio::time::sleep(self.wait).await;
        self.pauses += 1;
    }

    /// How many times `pause` has completed.
    pub fn pauses(&self) -> usize {
        self.pauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("f{i}"))).collect()
    }

    #[test]
    fn test_uneven_split() {
        let list = files(7);
        let batches = make_batches(&list, 3).unwrap();
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(batches.concat(), list);
    }

    #[test]
    fn test_even_split() {
        let list = files(6);
        let batches = make_batches(&list, 2).unwrap();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn test_batch_larger_than_list() {
        let list = files(2);
        let batches = make_batches(&list, 5).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], &list[..]);
    }

    #[test]
    fn test_counts_for_many_sizes() {
        for n in 0..20 {
            let list = files(n);
            for size in 1..8 {
                let batches = make_batches(&list, size).unwrap();
                assert_eq!(batches.len(), n.div_ceil(size));
                if let Some((last, rest)) = batches.split_last() {
                    assert!(rest.iter().all(|b| b.len() == size));
                    assert_eq!(last.len(), n - size * (batches.len() - 1));
                }
                assert_eq!(batches.concat(), list);
            }
        }
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let err = make_batches(&files(3), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_sleeps_for_wait() {
        let mut pacer = Pacer::new(Duration::from_millis(1500));
        let start = tokio::time::Instant::now();

        pacer.pause().await;
        pacer.pause().await;

        assert_eq!(pacer.pauses(), 2);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000));
        assert!(elapsed < Duration::from_millis(3100));
    }
}
