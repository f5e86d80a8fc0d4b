use lintrain::Matrix;

fn main() -> Result<(), lintrain::MatrixError> {
    env_logger::init();

    let a = Matrix::from_data(vec![
        vec![4.0, 1.0, 2.0],
        vec![1.0, 3.0, 0.0],
        vec![2.0, 0.0, 5.0],
    ])?;
    println!("A =\n{a}");

    let b = Matrix::column_vector(&[1.0, 2.0, 3.0]);
    let x = a.solve(&b)?;
    println!("solve(A, b) =\n{x}");
    println!("residual = {:e}", a.matmul(&x)?.sub(&b)?.norm());

    let qr = a.qr_decompose()?;
    println!("Q =\n{}", qr.q);
    println!("R =\n{}", qr.r);

    let eigen = a.eigen_decompose()?;
    println!(
        "eigenvalues {:?} after {} iterations (converged: {})",
        eigen.eigenvalues(),
        eigen.iterations,
        eigen.converged
    );
    println!("eigenvectors =\n{}", eigen.vectors);
    Ok(())
}
