//! Basic example of using the Gauss engine

use gauss_core::{estimate, generate, hint, Matrix, Rating};

fn main() {
    // Generate a puzzle
    println!("Generating a moderate puzzle...\n");
    let puzzle = generate(40, 30, None);
    let mut matrix = puzzle.matrix;

    println!("Generated puzzle (seed {}):", puzzle.seed);
    println!("{}\n", matrix);

    // Estimate the work needed
    let est = estimate(&matrix);
    println!(
        "Greedy estimate: {} moves ({})",
        est.move_count,
        est.rating(matrix.size())
    );
    for op in &est.operations {
        println!("  {}", op);
    }

    // A rejected move leaves everything as it was
    println!("\nTrying an invalid move...");
    if let Err(err) = matrix.apply_str("R1 = R1 * R2") {
        println!("Rejected ({}): {}", err.kind(), err);
    }

    // Play the plan one hint at a time
    println!("\nFollowing hints...\n");
    while let Some(op) = hint(&matrix) {
        if matrix.apply_str(&op).is_err() {
            break;
        }
        println!("{}  (move {})", op, matrix.move_count());
    }

    println!("\n{}", matrix);
    if matrix.is_solved() {
        println!("Solved in {} moves", matrix.move_count());
    } else {
        println!("The greedy plan stalled on a zero pivot");
    }

    // Rebuild a puzzle from its serialized record
    println!("\n--- Restoring a puzzle from JSON ---\n");
    let json = r#"{"size":2,"coefficients":[[2,1],[1,1]],"augmented":[5,3],"moveCount":0}"#;
    match serde_json::from_str::<Matrix>(json) {
        Ok(restored) => {
            println!("{}", restored);
            let est = estimate(&restored);
            println!("Estimate: {} moves", est.move_count);
            assert_ne!(est.rating(restored.size()), Rating::Solved);
        }
        Err(err) => println!("Could not restore: {}", err),
    }
}
