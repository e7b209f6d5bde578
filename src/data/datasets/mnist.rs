//! MNIST 手写数字数据集
//!
//! 支持：
//! - IDX 二进制格式解析（支持 .gz 压缩）
//! - 像素归一化 (0-255 → 0-1)
//! - 划出前若干张作为验证集
//! - 可选自动下载（带 MD5 校验）

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::data::download::download_file;
use crate::data::error::DataError;
use crate::tensor::Tensor;

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

/// MNIST 文件（解压后的文件名）及其 .gz 文件的 MD5
const MNIST_FILES: [(&str, &str); 4] = [
    ("train-images-idx3-ubyte", "f68b3c2dcbeaaa9fbdd348bbdeb94873"),
    ("train-labels-idx1-ubyte", "d53e105ee54ea40749a09fcbcd1e9432"),
    ("t10k-images-idx3-ubyte", "9fb629c4189551a2d022fa330f9573f3"),
    ("t10k-labels-idx1-ubyte", "ec29112dd5afa0611ce80d1b7f02629c"),
];

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;
pub(crate) const IMAGE_SIDE: usize = 28;

/// MNIST 手写数字数据集
///
/// 训练集 60,000 张、测试集 10,000 张 28x28 灰度图，标签为 0-9。
/// 图像以 NCHW 格式 [N, 1, 28, 28] 存储，像素已归一化到 [0, 1]。
#[derive(Debug, Clone)]
pub struct MnistDataset {
    images: Tensor,
    labels: Vec<u8>,
}

impl MnistDataset {
    /// 完整加载 API
    ///
    /// # 参数
    /// - `root`: 数据目录，None 则使用 [`default_data_dir`]`/mnist`
    /// - `train`: true=训练集(60000), false=测试集(10000)
    /// - `download`: true=自动下载缺失文件
    pub fn load(root: Option<&Path>, train: bool, download: bool) -> Result<Self, DataError> {
        let data_dir = root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_data_dir().join("mnist"));

        let (images_entry, labels_entry) = if train {
            (MNIST_FILES[0], MNIST_FILES[1])
        } else {
            (MNIST_FILES[2], MNIST_FILES[3])
        };

        let images_path = ensure_file(&data_dir, images_entry, download)?;
        let labels_path = ensure_file(&data_dir, labels_entry, download)?;

        let images = parse_idx_images(&read_idx_file(&images_path)?)?;
        let labels = parse_idx_labels(&read_idx_file(&labels_path)?)?;
        let dataset = Self::from_parts(images, labels)?;

        info!(
            "已加载 MNIST {}集：{} 张图像（{}）",
            if train { "训练" } else { "测试" },
            dataset.len(),
            data_dir.display()
        );
        Ok(dataset)
    }

    /// 便捷 API：加载训练集（默认路径，自动下载）
    pub fn train() -> Result<Self, DataError> {
        Self::load(None, true, true)
    }

    /// 便捷 API：加载测试集（默认路径，自动下载）
    pub fn test() -> Result<Self, DataError> {
        Self::load(None, false, true)
    }

    /// 由已归一化的图像 [N, 1, 28, 28] 与对应标签组装数据集
    pub fn from_parts(images: Tensor, labels: Vec<u8>) -> Result<Self, DataError> {
        let expected = [labels.len(), 1, IMAGE_SIDE, IMAGE_SIDE];
        if images.shape() != expected {
            return Err(DataError::ShapeMismatch {
                expected: expected.to_vec(),
                got: images.shape().to_vec(),
            });
        }
        Ok(Self { images, labels })
    }

    /// 按原顺序把前`validation_size`张划为验证集，返回 (验证集, 剩余训练集)
    pub fn split_validation(self, validation_size: usize) -> Result<(Self, Self), DataError> {
        let len = self.len();
        if validation_size > len {
            return Err(DataError::IndexOutOfBounds {
                index: validation_size,
                len,
            });
        }
        let head: Vec<usize> = (0..validation_size).collect();
        let tail: Vec<usize> = (validation_size..len).collect();

        let validation = Self {
            images: self.images.select_batch(&head),
            labels: self.labels[..validation_size].to_vec(),
        };
        let train = Self {
            images: self.images.select_batch(&tail),
            labels: self.labels[validation_size..].to_vec(),
        };
        debug!("划分验证集：验证 {} 张，训练 {} 张", validation.len(), train.len());
        Ok((validation, train))
    }

    /// 返回数据集中的样本数量
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 数据集是否为空
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 获取第 index 个样本：([1, 28, 28] 的图像, 标签)
    pub fn get(&self, index: usize) -> Result<(Tensor, u8), DataError> {
        let label = *self.labels.get(index).ok_or(DataError::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        let image = self
            .images
            .select_batch(&[index])
            .reshape(&[1, IMAGE_SIDE, IMAGE_SIDE]);
        Ok((image, label))
    }

    /// 所有图像 [N, 1, 28, 28]
    pub fn images(&self) -> &Tensor {
        &self.images
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }
}

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("digit_gan")
        .join("datasets")
}

/// 确保文件存在，必要时下载 .gz 版本
fn ensure_file(
    data_dir: &Path,
    (base_name, md5): (&str, &str),
    download: bool,
) -> Result<PathBuf, DataError> {
    // 优先使用解压后的文件
    let uncompressed_path = data_dir.join(base_name);
    if uncompressed_path.exists() {
        return Ok(uncompressed_path);
    }

    let gz_path = data_dir.join(format!("{base_name}.gz"));
    if gz_path.exists() {
        return Ok(gz_path);
    }

    if download {
        std::fs::create_dir_all(data_dir)?;
        let url = format!("{MNIST_BASE_URL}{base_name}.gz");
        download_file(&url, &gz_path, Some(md5))?;
        Ok(gz_path)
    } else {
        Err(DataError::FileNotFound(uncompressed_path))
    }
}

/// 读取 IDX 文件的全部字节；扩展名为 .gz 时先解压
pub(crate) fn read_idx_file(path: &Path) -> Result<Vec<u8>, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    let mut bytes = Vec::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(BufReader::new(file))
            .read_to_end(&mut bytes)
            .map_err(|e| DataError::DecompressionError(format!("{}: {e}", path.display())))?;
    } else {
        BufReader::new(file).read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

fn read_be_u32(bytes: &[u8], offset: usize) -> Result<u32, DataError> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| DataError::FormatError(format!("读取头部失败：文件只有{}字节", bytes.len())))
}

fn check_magic(bytes: &[u8], expected: u32) -> Result<(), DataError> {
    let magic = read_be_u32(bytes, 0)?;
    if magic != expected {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {expected})"
        )));
    }
    Ok(())
}

/// 解析 IDX 图像数据，返回归一化后的 [N, 1, 28, 28]
///
/// IDX 格式（大端序）：
/// - [0-3] magic number (0x00000803 = 2051)
/// - [4-7] 图像数
/// - [8-11] 行数
/// - [12-15] 列数
/// - [16+] 像素 (u8)
pub(crate) fn parse_idx_images(bytes: &[u8]) -> Result<Tensor, DataError> {
    check_magic(bytes, IMAGES_MAGIC)?;
    let num_images = read_be_u32(bytes, 4)? as usize;
    let num_rows = read_be_u32(bytes, 8)? as usize;
    let num_cols = read_be_u32(bytes, 12)? as usize;

    if num_rows != IMAGE_SIDE || num_cols != IMAGE_SIDE {
        return Err(DataError::FormatError(format!(
            "无效的图像尺寸: {num_rows}x{num_cols} (期望 28x28)"
        )));
    }

    let pixel_count = num_images * IMAGE_SIDE * IMAGE_SIDE;
    let pixels = bytes.get(16..16 + pixel_count).ok_or_else(|| {
        DataError::FormatError(format!(
            "像素数据不完整：需要{pixel_count}字节，实际{}字节",
            bytes.len().saturating_sub(16)
        ))
    })?;

    let data: Vec<f32> = pixels.iter().map(|&p| f32::from(p) / 255.0).collect();
    Ok(Tensor::from_vec(data, &[num_images, 1, IMAGE_SIDE, IMAGE_SIDE]))
}

/// 解析 IDX 标签数据
///
/// IDX 格式（大端序）：
/// - [0-3] magic number (0x00000801 = 2049)
/// - [4-7] 标签数
/// - [8+] 标签 (u8, 0-9)
pub(crate) fn parse_idx_labels(bytes: &[u8]) -> Result<Vec<u8>, DataError> {
    check_magic(bytes, LABELS_MAGIC)?;
    let num_labels = read_be_u32(bytes, 4)? as usize;
    bytes
        .get(8..8 + num_labels)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| {
            DataError::FormatError(format!(
                "标签数据不完整：需要{num_labels}字节，实际{}字节",
                bytes.len().saturating_sub(8)
            ))
        })
}
