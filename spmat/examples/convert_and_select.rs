//! Convert a full matrix to sparse, test it for diagonal structure, and
//! ask the selector how its transpose should run.

use spmat::{
    convert_full_to_sparse, is_diagonal, select_transpose_method, Context, Matrix, ShapeStats,
};

fn main() -> spmat_core::Result<()> {
    let ctx = Context::default();

    // a 4x4 full matrix, column order
    let values: Vec<f64> = (0..16).map(|p| p as f64).collect();
    let mut m = Matrix::new_full(4, 4, values)?;
    println!("before: {} storage, {} entries", m.kind(), m.entry_count());

    convert_full_to_sparse(&mut m, &ctx)?;
    let (starts, _) = m.sparse_layout().expect("sparse after conversion");
    println!("after:  {} storage, starts = {starts:?}", m.kind());

    println!("diagonal? {}", is_diagonal(&mut m, &ctx));

    let decision = select_transpose_method(&ShapeStats::of(&m), &ctx);
    if decision.use_builder {
        println!("transpose: builder (sort/merge)");
    } else {
        println!(
            "transpose: bucket with {} thread(s), {} workspace(s)",
            decision.nthreads, decision.nworkspaces
        );
    }
    Ok(())
}
