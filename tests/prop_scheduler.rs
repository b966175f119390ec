use proptest::prelude::*;
use strata::TaskQueue;

proptest! {
    #[test]
    fn slices_preserve_fifo_order(slice in 1usize..8, n in 0usize..100) {
        let mut q = TaskQueue::new(slice);
        for i in 0..n {
            q.push(i);
        }
        let mut seen = Vec::new();
        let mut ticks = 0u64;
        while !q.is_empty() {
            let batch = q.take_slice();
            prop_assert!(!batch.is_empty() && batch.len() <= slice);
            seen.extend(batch.into_iter().map(|t| t.kind));
            ticks += 1;
        }
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
        prop_assert_eq!(q.now, ticks);
        prop_assert_eq!(ticks as usize, n.div_ceil(slice));
    }
}
