/*
 * @Description  : GraphInner 高层模型 I/O（save_model/load_model）
 *
 * 与 serialization.rs 的区别：
 * - serialization.rs：底层二进制序列化（只处理参数的原始读写）
 * - model_io.rs：拓扑描述 JSON + 参数 bin
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::descriptor::GraphDescriptor;
use std::path::Path;

impl GraphInner {
    /// 保存完整模型，生成两个文件：
    /// - `{path}.json`: 图的拓扑描述（可读）
    /// - `{path}.bin`: 参数数据
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");
        let bin_path = path.with_extension("bin");

        self.save_params(&bin_path)?;

        let mut descriptor = self.describe();
        descriptor.params_file = Some(bin_path.file_name().map_or_else(
            || "params.bin".to_string(),
            |s| s.to_string_lossy().to_string(),
        ));
        let json = descriptor
            .to_json()
            .map_err(|e| GraphError::Io(format!("序列化图描述失败: {e}")))?;
        std::fs::write(&json_path, json)
            .map_err(|e| GraphError::Io(format!("写入 JSON 文件失败: {e}")))?;
        Ok(())
    }

    /// 把模型参数加载进当前图。
    ///
    /// 图结构需先用代码构建；加载前会核对 JSON 中的拓扑与当前图是否一致
    pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GraphError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");

        let json = std::fs::read_to_string(&json_path)
            .map_err(|e| GraphError::Io(format!("读取 JSON 文件失败: {e}")))?;
        let saved = GraphDescriptor::from_json(&json)
            .map_err(|e| GraphError::Io(format!("解析图描述失败: {e}")))?;
        if !saved.same_topology(&self.describe()) {
            return Err(GraphError::InvalidOperation(format!(
                "{}中的图结构与当前图{}不一致",
                json_path.display(),
                self.name()
            )));
        }

        let bin_path = match &saved.params_file {
            Some(params_file) => path.parent().map_or_else(
                || Path::new(params_file).to_path_buf(),
                |p| p.join(params_file),
            ),
            None => path.with_extension("bin"),
        };
        self.load_params(&bin_path)
    }
}
