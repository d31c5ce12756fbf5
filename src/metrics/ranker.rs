use super::ProcessInfo;
use std::cmp::Ordering;

/// Top `limit` processes by CPU usage, highest first.
///
/// Entries without a CPU reading are skipped. The sort is stable, so equal
/// readings keep their enumeration order.
pub fn rank(all: Vec<ProcessInfo>, limit: usize) -> Vec<ProcessInfo> {
    let mut ranked: Vec<_> = all
        .into_iter()
        .filter(|p| p.cpu_percent.is_some_and(f32::is_finite))
        .collect();

    ranked.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, cpu: Option<f32>) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: format!("proc{pid}"),
            cpu_percent: cpu,
            mem_percent: 1.0,
        }
    }

    fn pids(ranked: &[ProcessInfo]) -> Vec<u32> {
        ranked.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn empty_listing() {
        assert!(rank(Vec::new(), 5).is_empty());
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let all = vec![
            proc(1, Some(10.0)),
            proc(2, Some(50.0)),
            proc(3, Some(30.0)),
            proc(4, Some(50.0)),
        ];
        let ranked = rank(all, 2);
        assert_eq!(pids(&ranked), vec![2, 4]);
    }

    #[test]
    fn unavailable_cpu_is_dropped() {
        let all = vec![
            proc(1, None),
            proc(2, Some(5.0)),
            proc(3, Some(f32::NAN)),
            proc(4, Some(7.0)),
        ];
        assert_eq!(pids(&rank(all, 9)), vec![4, 2]);
    }

    #[test]
    fn limit_larger_than_listing() {
        let all = vec![proc(1, Some(1.0)), proc(2, Some(2.0))];
        assert_eq!(pids(&rank(all, 9)), vec![2, 1]);
    }
}
