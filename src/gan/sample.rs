/*
 * @Description  : 把一批生成的图像拼成网格并保存为 PNG
 */

use std::path::Path;

use image::{GrayImage, Luma};

use super::error::GanError;
use crate::tensor::Tensor;

/// 网格的默认列数
pub const SAMPLE_GRID_COLUMNS: usize = 8;

/// 把 [N, 1, H, W] 的图像（像素在 [0, 1] 内）拼成每行`columns`张的灰度网格图
pub fn sample_grid(images: &Tensor, columns: usize) -> Result<GrayImage, GanError> {
    let shape = images.shape();
    let (count, height, width) = match shape {
        [n, 1, h, w] if *n > 0 => (*n, *h, *w),
        _ => {
            return Err(GanError::Config(format!(
                "样本网格需要[N, 1, H, W]形状的图像，但得到{shape:?}"
            )));
        }
    };
    if columns == 0 {
        return Err(GanError::Config("样本网格的列数必须大于0".to_string()));
    }

    let columns = columns.min(count);
    let rows = count.div_ceil(columns);
    let mut grid = GrayImage::new((columns * width) as u32, (rows * height) as u32);
    let pixels = images.data_as_slice();
    let plane = height * width;

    for index in 0..count {
        let (origin_x, origin_y) = ((index % columns) * width, (index / columns) * height);
        for y in 0..height {
            for x in 0..width {
                let value = pixels[index * plane + y * width + x];
                let level = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
                grid.put_pixel((origin_x + x) as u32, (origin_y + y) as u32, Luma([level]));
            }
        }
    }
    Ok(grid)
}

/// 以 8 列网格保存生成的数字
pub fn save_sample_grid<P: AsRef<Path>>(images: &Tensor, path: P) -> Result<(), GanError> {
    sample_grid(images, SAMPLE_GRID_COLUMNS)?.save(path)?;
    Ok(())
}
