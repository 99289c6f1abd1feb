//! Per-column aggregates used by the detection strategies.

use std::collections::HashMap;

use image::RgbaImage;

/// X positions of columns whose every pixel has alpha 0, left to right.
pub fn transparent_columns(image: &RgbaImage) -> Vec<u32> {
    let (width, height) = image.dimensions();
    (0..width).filter(|&x| (0..height).all(|y| image.get_pixel(x, y)[3] == 0)).collect()
}

/// Mean R, G, B of every column, averaged over all rows.
pub fn column_means(image: &RgbaImage) -> Vec<[f64; 3]> {
    let (width, height) = image.dimensions();
    let mut sums = vec![[0.0f64; 3]; width as usize];

    for (x, _y, pixel) in image.enumerate_pixels() {
        let sum = &mut sums[x as usize];
        sum[0] += pixel[0] as f64;
        sum[1] += pixel[1] as f64;
        sum[2] += pixel[2] as f64;
    }

    if height > 0 {
        let rows = height as f64;
        for sum in &mut sums {
            sum.iter_mut().for_each(|c| *c /= rows);
        }
    }
    sums
}

/// Most frequent value in `gaps`.
///
/// Ties go to the value that appears first in `gaps`. Returns `None` for an
/// empty slice.
pub fn modal_gap(gaps: &[u32]) -> Option<u32> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &gap in gaps {
        *counts.entry(gap).or_insert(0) += 1;
    }

    let mut best: Option<(u32, usize)> = None;
    for &gap in gaps {
        let count = counts[&gap];
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((gap, count)),
        }
    }
    best.map(|(gap, _)| gap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_transparent_columns_requires_whole_column() {
        let mut img = RgbaImage::from_pixel(4, 3, Rgba([0, 0, 0, 0]));
        // Column 1 has one opaque pixel
        img.put_pixel(1, 2, Rgba([9, 9, 9, 255]));
        // Column 3 is nearly transparent but not fully
        for y in 0..3 {
            img.put_pixel(3, y, Rgba([0, 0, 0, 1]));
        }

        assert_eq!(transparent_columns(&img), vec![0, 2]);
    }

    #[test]
    fn test_transparent_columns_opaque_image() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        assert!(transparent_columns(&img).is_empty());
    }

    #[test]
    fn test_column_means() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([100, 50, 10, 255]));
        img.put_pixel(1, 1, Rgba([200, 150, 30, 0]));

        let means = column_means(&img);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0], [0.0, 0.0, 0.0]);
        assert_eq!(means[1], [150.0, 100.0, 20.0]);
    }

    #[test]
    fn test_modal_gap_most_frequent() {
        assert_eq!(modal_gap(&[20, 32, 32, 20, 32]), Some(32));
    }

    #[test]
    fn test_modal_gap_tie_goes_to_first_seen() {
        assert_eq!(modal_gap(&[40, 25, 25, 40]), Some(40));
        assert_eq!(modal_gap(&[25, 40, 40, 25]), Some(25));
    }

    #[test]
    fn test_modal_gap_empty() {
        assert_eq!(modal_gap(&[]), None);
    }
}
