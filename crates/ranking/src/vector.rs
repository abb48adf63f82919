pub fn l2(vec: &[f64]) -> f64 {
    vec.iter().map(|v| v * v).sum::<f64>().sqrt()
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity; a zero vector on either side scores 0.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let norm_a = l2(a);
    let norm_b = l2(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [1.0, 0.0, 2.0, 3.0];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tiny_angles_stay_below_one() {
        assert!(cosine(&[1.0, 1e-7], &[1.0, 0.0]) < 1.0);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 5.0]), 0.0);
    }
}
