use crate::gan::{GanError, sample_grid, save_sample_grid};
use crate::tensor::Tensor;

#[test]
fn test_grid_layout() {
    // 10 张 2x3 的图，第 i 张像素恒为 i / 10
    let data: Vec<f32> = (0..10)
        .flat_map(|i| std::iter::repeat_n(i as f32 / 10.0, 6))
        .collect();
    let images = Tensor::from_vec(data, &[10, 1, 2, 3]);

    let grid = sample_grid(&images, 8).unwrap();
    assert_eq!(grid.dimensions(), (8 * 3, 2 * 2));
    assert_eq!(grid.get_pixel(0, 0).0, [0]);
    // 第 8 张位于第二行第一列
    assert_eq!(grid.get_pixel(0, 2).0, [204]);
    // 第二行没有图的位置保持黑色
    assert_eq!(grid.get_pixel(23, 3).0, [0]);
}

#[test]
fn test_grid_clamps_pixels() {
    let images = Tensor::new(&[-1.0, 2.0], &[2, 1, 1, 1]);
    let grid = sample_grid(&images, 8).unwrap();
    assert_eq!(grid.dimensions(), (2, 1));
    assert_eq!(grid.get_pixel(0, 0).0, [0]);
    assert_eq!(grid.get_pixel(1, 0).0, [255]);
}

#[test]
fn test_grid_rejects_bad_shape() {
    assert!(matches!(
        sample_grid(&Tensor::zeros(&[2, 3, 4, 4]), 8),
        Err(GanError::Config(_))
    ));
    assert!(matches!(
        sample_grid(&Tensor::zeros(&[2, 1, 4, 4]), 0),
        Err(GanError::Config(_))
    ));
}

#[test]
fn test_save_sample_grid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.png");
    save_sample_grid(&Tensor::full(0.5, &[16, 1, 28, 28]), &path).unwrap();

    let png = image::open(&path).unwrap();
    assert_eq!((png.width(), png.height()), (8 * 28, 2 * 28));
}
