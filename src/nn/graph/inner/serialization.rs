/*
 * @Description  : GraphInner 底层参数序列化（save_params/load_params）
 *
 * 文件格式（小端）：
 *   magic "DGPR" | version u32 | entry_count u32 |
 *   每个条目：name_len u32 | name | ndim u32 | dims u32 * ndim | data f32 * Π(dims)
 *
 * 条目包括所有参数节点（以节点名为键）以及 BatchNorm 等节点的缓冲状态
 * （以`{节点名}/{缓冲名}`为键，如`generator/bn_1/moving_mean`）
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::TraitNode;
use crate::tensor::Tensor;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

fn io_error(context: &str, e: std::io::Error) -> GraphError {
    GraphError::Io(format!("{context}: {e}"))
}

fn write_u32<W: Write>(writer: &mut W, value: usize, context: &str) -> Result<(), GraphError> {
    let value = u32::try_from(value)
        .map_err(|_| GraphError::Io(format!("{context}: {value}超出u32范围")))?;
    writer
        .write_all(&value.to_le_bytes())
        .map_err(|e| io_error(context, e))
}

fn read_u32<R: Read>(reader: &mut R, context: &str) -> Result<usize, GraphError> {
    let mut bytes = [0u8; 4];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| io_error(context, e))?;
    Ok(u32::from_le_bytes(bytes) as usize)
}

/// 读取一个条目：名称与张量
fn read_entry<R: Read>(reader: &mut R) -> Result<(String, Tensor), GraphError> {
    let name_len = read_u32(reader, "读取名称长度失败")?;
    let name_bytes = read_bytes(reader, name_len, "读取名称失败")?;
    let name =
        String::from_utf8(name_bytes).map_err(|e| GraphError::Io(format!("名称编码无效: {e}")))?;

    let ndim = read_u32(reader, "读取形状维度失败")?;
    let shape = (0..ndim)
        .map(|_| read_u32(reader, "读取形状失败"))
        .collect::<Result<Vec<_>, _>>()?;
    let byte_len = shape
        .iter()
        .try_fold(4usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| GraphError::Io(format!("条目{name}的形状{shape:?}过大")))?;
    let bytes = read_bytes(reader, byte_len, "读取数据失败")?;
    let data: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok((name, Tensor::from_vec(data, &shape)))
}

/// 读取恰好`len`个字节；按实际读到的数据增长缓冲区，损坏的长度字段不会导致巨量预分配
fn read_bytes<R: Read>(reader: &mut R, len: usize, context: &str) -> Result<Vec<u8>, GraphError> {
    let mut bytes = Vec::new();
    Read::take(&mut *reader, len as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| io_error(context, e))?;
    if bytes.len() != len {
        return Err(GraphError::Io(format!(
            "{context}: 期望{len}字节，文件只剩{}字节",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// 参数文件中的一个条目
enum Slot {
    Parameter(NodeId),
    Buffer(NodeId, &'static str),
}

impl GraphInner {
    /// 参数文件魔数
    const PARAMS_MAGIC: &'static [u8; 4] = b"DGPR";
    /// 参数文件版本
    const PARAMS_VERSION: u32 = 1;

    /// 所有需要持久化的条目（按节点创建顺序）
    fn persistent_slots(&self) -> Vec<(String, Slot)> {
        let mut slots = Vec::new();
        for id in self.nodes() {
            let node = &self.nodes[&id];
            if node.is_parameter() {
                slots.push((node.name().to_string(), Slot::Parameter(id)));
            }
            for (key, _) in node.raw_node().buffers() {
                slots.push((format!("{}/{key}", node.name()), Slot::Buffer(id, key)));
            }
        }
        slots
    }

    fn slot_tensor(&self, slot: &Slot) -> Result<&Tensor, GraphError> {
        match *slot {
            Slot::Parameter(id) => {
                let node = self.get_node(id)?;
                node.value()
                    .ok_or_else(|| GraphError::ComputationError(format!("参数{node}没有值")))
            }
            Slot::Buffer(id, key) => self
                .get_node(id)?
                .raw_node()
                .buffers()
                .into_iter()
                .find(|(k, _)| *k == key)
                .map(|(_, t)| t)
                .ok_or_else(|| GraphError::ComputationError(format!("缓冲状态{key}不存在"))),
        }
    }

    /// 写出所有参数与缓冲状态
    pub fn write_params<W: Write>(&self, writer: &mut W) -> Result<(), GraphError> {
        let slots = self.persistent_slots();

        writer
            .write_all(Self::PARAMS_MAGIC)
            .map_err(|e| io_error("写入魔数失败", e))?;
        writer
            .write_all(&Self::PARAMS_VERSION.to_le_bytes())
            .map_err(|e| io_error("写入版本失败", e))?;
        write_u32(writer, slots.len(), "写入条目数量失败")?;

        for (name, slot) in &slots {
            let tensor = self.slot_tensor(slot)?;
            write_u32(writer, name.len(), "写入名称长度失败")?;
            writer
                .write_all(name.as_bytes())
                .map_err(|e| io_error("写入名称失败", e))?;
            write_u32(writer, tensor.dimension(), "写入形状维度失败")?;
            for &dim in tensor.shape() {
                write_u32(writer, dim, "写入形状失败")?;
            }
            let bytes: Vec<u8> = tensor
                .data_as_slice()
                .iter()
                .flat_map(|v| v.to_le_bytes())
                .collect();
            writer
                .write_all(&bytes)
                .map_err(|e| io_error("写入数据失败", e))?;
        }
        Ok(())
    }

    /// 读入参数与缓冲状态。文件中多出的条目会被忽略，图中缺失的条目保持原值。
    /// 先完整解析并校验所有条目再写入图，出错时图保持不变
    pub fn read_params<R: Read>(&mut self, reader: &mut R) -> Result<(), GraphError> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| io_error("读取魔数失败", e))?;
        if &magic != Self::PARAMS_MAGIC {
            return Err(GraphError::Io(
                "无效的参数文件：请确保使用 save_params() 保存的文件".to_string(),
            ));
        }
        let version = read_u32(reader, "读取版本失败")?;
        if version != Self::PARAMS_VERSION as usize {
            return Err(GraphError::Io(format!("不支持的参数文件版本: {version}")));
        }

        let slots: HashMap<String, Slot> = self.persistent_slots().into_iter().collect();
        let count = read_u32(reader, "读取条目数量失败")?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let (name, tensor) = read_entry(reader)?;
            if let Some(slot) = slots.get(&name) {
                let expected = self.slot_tensor(slot)?.shape();
                if expected != tensor.shape() {
                    return Err(GraphError::ShapeMismatch {
                        expected: expected.to_vec(),
                        got: tensor.shape().to_vec(),
                        message: format!("参数文件中{name}的形状与图中不一致"),
                    });
                }
                entries.push((slot, tensor));
            }
        }

        for (slot, tensor) in entries {
            match *slot {
                Slot::Parameter(id) => self.set_node_value(id, Some(&tensor))?,
                Slot::Buffer(id, key) => {
                    self.get_node_mut(id)?
                        .raw_node_mut()
                        .load_buffer(key, &tensor)?;
                }
            }
        }
        Ok(())
    }

    /// 保存所有参数（含 BatchNorm 滑动统计量）到二进制文件
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let file = File::create(path.as_ref()).map_err(|e| io_error("无法创建参数文件", e))?;
        let mut writer = BufWriter::new(file);
        self.write_params(&mut writer)?;
        writer.flush().map_err(|e| io_error("刷新缓冲区失败", e))
    }

    /// 从二进制文件加载参数
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GraphError> {
        let file = File::open(path.as_ref()).map_err(|e| io_error("无法打开参数文件", e))?;
        self.read_params(&mut BufReader::new(file))
    }
}
