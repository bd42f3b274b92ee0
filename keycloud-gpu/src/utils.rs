//! Host-side helpers for the GPU radius search

use keycloud_core::{to_point3f, Point3d};

/// Columns packed into one adjacency word
pub const BITS_PER_WORD: usize = 32;

/// Pad points to `vec4<f32>` so the shader sees a 16 byte stride
pub fn pack_points(points: &[Point3d]) -> Vec<[f32; 4]> {
    points
        .iter()
        .map(|p| {
            let p = to_point3f(p);
            [p.x, p.y, p.z, 0.0]
        })
        .collect()
}

/// Index of the first packed point with a non-finite coordinate.
///
/// Finite doubles beyond the `f32` range narrow to infinity.
pub fn first_non_finite(packed: &[[f32; 4]]) -> Option<usize> {
    packed.iter().position(|p| !p[..3].iter().all(|c| c.is_finite()))
}

/// Number of `u32` words holding one adjacency row
pub fn words_per_row(num_points: usize) -> usize {
    num_points.div_ceil(BITS_PER_WORD)
}

/// Workgroups needed to cover `items` invocations
pub fn workgroup_count(items: usize, workgroup_size: usize) -> u32 {
    items.div_ceil(workgroup_size) as u32
}

/// Decode bit-packed adjacency rows into ascending neighbor lists.
///
/// Bit `b` of word `w` in a row marks column `w * 32 + b`; columns at or past
/// `num_points` are ignored.
pub fn decode_adjacency_rows(words: &[u32], words_per_row: usize, num_points: usize) -> Vec<Vec<usize>> {
    if words_per_row == 0 {
        return Vec::new();
    }

    words
        .chunks_exact(words_per_row)
        .map(|row| {
            let mut neighbors = Vec::new();
            for (w, &word) in row.iter().enumerate() {
                let mut bits = word;
                while bits != 0 {
                    let col = w * BITS_PER_WORD + bits.trailing_zeros() as usize;
                    if col < num_points {
                        neighbors.push(col);
                    }
                    bits &= bits - 1;
                }
            }
            neighbors
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_per_row() {
        assert_eq!(words_per_row(0), 0);
        assert_eq!(words_per_row(1), 1);
        assert_eq!(words_per_row(32), 1);
        assert_eq!(words_per_row(33), 2);
    }

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(1, 64), 1);
        assert_eq!(workgroup_count(64, 64), 1);
        assert_eq!(workgroup_count(65, 64), 2);
    }

    #[test]
    fn test_pack_points() {
        let packed = pack_points(&[Point3d::new(1.0, 2.0, 3.0)]);
        assert_eq!(packed, vec![[1.0, 2.0, 3.0, 0.0]]);
    }

    #[test]
    fn test_first_non_finite_catches_f32_overflow() {
        let packed = pack_points(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.5, 0.0, 0.0),
            Point3d::new(1e39, 0.0, 0.0),
        ]);
        assert_eq!(first_non_finite(&packed), Some(2));

        let packed = pack_points(&[Point3d::new(3.0e38, -3.0e38, 1.0)]);
        assert_eq!(first_non_finite(&packed), None);
    }

    #[test]
    fn test_decode_adjacency_rows() {
        // 34 points -> two words per row
        let words = vec![
            0b101, 0b10,         // row 0: columns 0, 2, 33
            0, 0b11,             // row 1: columns 32, 33
            u32::MAX, u32::MAX,  // row 2: everything, padding bits dropped
        ];
        let rows = decode_adjacency_rows(&words, 2, 34);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![0, 2, 33]);
        assert_eq!(rows[1], vec![32, 33]);
        assert_eq!(rows[2], (0..34).collect::<Vec<_>>());
    }
}
