use proptest::prelude::*;
use strata_grid::{Grid2, Grid3};

fn dim() -> impl Strategy<Value = usize> {
    1usize..=9
}

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 65536, ..ProptestConfig::default() })]

    // idx maps each in-range (x,y,z) to a unique in-range index
    #[test]
    fn grid3_idx_is_unique_and_in_range(sx in dim(), sy in dim(), sz in dim()) {
        let grid = Grid3::new(sx, sy, sz, 0u16);
        let mut seen = vec![false; sx * sy * sz];
        for z in 0..sz { for x in 0..sx { for y in 0..sy {
            let i = grid.idx(x, y, z);
            prop_assert!(i < seen.len());
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    #[test]
    fn grid3_idx_matches_stride_formula(sx in dim(), sy in dim(), sz in dim(), x in 0usize..9, y in 0usize..9, z in 0usize..9) {
        prop_assume!(x < sx && y < sy && z < sz);
        let grid = Grid3::new(sx, sy, sz, 0u8);
        prop_assert_eq!(grid.idx(x, y, z), y + x * sy + z * sy * sx);
        prop_assert_eq!(grid.pos(grid.idx(x, y, z)), (x, y, z));
    }

    #[test]
    fn grid2_idx_matches_stride_formula(sx in dim(), sz in dim(), x in 0usize..9, z in 0usize..9) {
        prop_assume!(x < sx && z < sz);
        let grid = Grid2::new(sx, sz, 0u8);
        prop_assert_eq!(grid.idx(x, z), x + z * sx);
    }

    // get_checked agrees with contains and with the panicking accessor
    #[test]
    fn grid3_checked_access_agrees(sx in dim(), sy in dim(), sz in dim(), x in -2i32..11, y in -2i32..11, z in -2i32..11) {
        let grid = Grid3::from_vec(sx, sy, sz, (0..(sx * sy * sz) as u32).collect()).unwrap();
        match grid.get_checked(x, y, z) {
            Some(v) => {
                prop_assert!(grid.contains(x, y, z));
                prop_assert_eq!(*v, *grid.get(x as usize, y as usize, z as usize));
            }
            None => prop_assert!(!grid.contains(x, y, z)),
        }
    }
}

#[test]
fn columns_are_contiguous() {
    let mut grid = Grid3::new(3, 4, 2, 0u16);
    for y in 0..4 {
        grid.set(1, y, 1, 10 + y as u16);
    }
    assert_eq!(grid.column(1, 1), &[10, 11, 12, 13]);
    assert_eq!(grid.column(0, 0), &[0, 0, 0, 0]);
}

#[test]
fn from_vec_rejects_wrong_length() {
    assert!(Grid3::from_vec(2, 2, 2, vec![0u8; 7]).is_none());
    assert!(Grid2::from_vec(3, 3, vec![0u8; 10]).is_none());
    assert!(Grid2::from_vec(3, 3, vec![0u8; 9]).is_some());
}

#[test]
#[should_panic]
fn grid3_out_of_range_panics() {
    let grid = Grid3::new(4, 4, 4, 0u8);
    // x = 4 would alias (0, 0, 1) without the bounds check
    let _ = grid.get(4, 0, 0);
}

#[test]
#[should_panic]
fn grid2_out_of_range_panics() {
    let grid = Grid2::new(4, 4, 0u8);
    let _ = grid[(0, 4)];
}

#[test]
fn grid2_from_fn_and_map() {
    let grid = Grid2::from_fn(3, 2, |x, z| (x * 10 + z) as u32);
    assert_eq!(*grid.get(2, 1), 21);
    let doubled = grid.map(|v| v * 2);
    assert_eq!(doubled[(2, 1)], 42);
    assert_eq!(doubled.len(), 6);
}
