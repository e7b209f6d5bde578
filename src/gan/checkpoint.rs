/*
 * @Description  : 训练检查点
 *
 * 一个检查点由同一基础路径下的三个文件组成：
 * - `{name}.bin`: 所有参数与 BatchNorm 滑动统计量
 * - `{name}.json`: 图的拓扑描述
 * - `{name}.state`: 迭代计数与两个优化器的状态（bincode）
 */

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::GanError;
use crate::nn::{Graph, RmsPropState};

/// 参数以外需要恢复的训练进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    /// 已完成的迭代次数
    pub iteration: usize,
    pub discriminator: RmsPropState,
    pub generator: RmsPropState,
}

#[derive(Debug, Clone)]
pub struct Checkpoint {
    base: PathBuf,
}

impl Checkpoint {
    pub fn new<P: AsRef<Path>>(dir: P, name: &str) -> Self {
        Self {
            base: dir.as_ref().join(name),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base
    }

    pub fn params_path(&self) -> PathBuf {
        self.base.with_extension("bin")
    }

    pub fn graph_path(&self) -> PathBuf {
        self.base.with_extension("json")
    }

    pub fn state_path(&self) -> PathBuf {
        self.base.with_extension("state")
    }

    /// 三个文件都存在才算完整的检查点
    pub fn exists(&self) -> bool {
        self.params_path().exists() && self.graph_path().exists() && self.state_path().exists()
    }

    pub fn save(&self, graph: &Graph, state: &TrainingState) -> Result<(), GanError> {
        if let Some(dir) = self.base.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        graph.save_model(&self.base)?;
        let writer = BufWriter::new(File::create(self.state_path())?);
        bincode::serialize_into(writer, state)?;
        info!(
            "已保存检查点 {}（第{}次迭代）",
            self.base.display(),
            state.iteration
        );
        Ok(())
    }

    /// 把参数载入`graph`（图需已按相同配置构建好），并返回训练进度
    pub fn restore(&self, graph: &Graph) -> Result<TrainingState, GanError> {
        if !self.exists() {
            return Err(GanError::Checkpoint(format!(
                "检查点{}不完整或不存在",
                self.base.display()
            )));
        }
        graph.load_model(&self.base)?;
        let reader = BufReader::new(File::open(self.state_path())?);
        let state: TrainingState = bincode::deserialize_from(reader)?;
        info!(
            "已从检查点 {} 恢复（第{}次迭代）",
            self.base.display(),
            state.iteration
        );
        Ok(state)
    }
}
