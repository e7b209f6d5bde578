
use crate::data::MnistDataset;
use crate::tensor::Tensor;

/// 构造 IDX 图像字节：第 i 张图的所有像素都等于 pixel(i)
fn idx_images_bytes(count: usize, pixel: impl Fn(usize) -> u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2051u32.to_be_bytes());
    bytes.extend_from_slice(&(count as u32).to_be_bytes());
    bytes.extend_from_slice(&28u32.to_be_bytes());
    bytes.extend_from_slice(&28u32.to_be_bytes());
    for i in 0..count {
        bytes.extend(std::iter::repeat_n(pixel(i), 28 * 28));
    }
    bytes
}

fn idx_labels_bytes(labels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2049u32.to_be_bytes());
    bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    bytes.extend_from_slice(labels);
    bytes
}

/// 第 i 张图的像素恒为 i，标签为 i % 10
fn synthetic_dataset(count: usize) -> MnistDataset {
    let data: Vec<f32> = (0..count)
        .flat_map(|i| std::iter::repeat_n(i as f32, 28 * 28))
        .collect();
    let labels = (0..count).map(|i| (i % 10) as u8).collect();
    MnistDataset::from_parts(Tensor::from_vec(data, &[count, 1, 28, 28]), labels).unwrap()
}
