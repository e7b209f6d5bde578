/*
 * @Description  : 数值梯度检验的公共工具
 *
 * 以 L = 0.5 * Σ y² 作为检验用损失（dL/dy = y），
 * 对每个参数逐元素做中心差分，与反向传播得到的梯度比较。
 */

use crate::nn::{GraphInner, Init, NodeId};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

const H: f32 = 1e-2;
const TOLERANCE: f32 = 2e-2;

/// [-1, 1) 上的均匀随机张量
pub(super) fn random_tensor(shape: &[usize], seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    Tensor::uniform_with_rng(-1.0, 1.0, shape, &mut rng)
}

/// 创建一个参数节点并直接写入给定值
pub(super) fn parameter_with_value(graph: &mut GraphInner, value: &Tensor, name: &str) -> NodeId {
    let id = graph
        .new_parameter_node(value.shape(), Init::Zeros, Some(name))
        .unwrap();
    graph.set_node_value(id, Some(value)).unwrap();
    id
}

fn loss_value(graph: &mut GraphInner, loss: NodeId) -> f32 {
    graph.forward(loss).unwrap();
    graph
        .get_node_value(loss)
        .unwrap()
        .unwrap()
        .get_data_number()
        .unwrap()
}

/// 检验`output`对`params`中每个参数的梯度
pub(super) fn assert_gradients_match(graph: &mut GraphInner, output: NodeId, params: &[NodeId]) {
    let loss = graph.new_l2_penalty_node(&[output], 1.0, None).unwrap();
    graph.zero_grad();
    graph.forward(loss).unwrap();
    graph.backward(loss).unwrap();

    for &param in params {
        let analytic = graph.get_node_grad(param).unwrap().unwrap().clone();
        let base = graph.get_node_value(param).unwrap().unwrap().clone();
        assert_eq!(analytic.shape(), base.shape());

        for i in 0..base.size() {
            let mut shifted = |delta: f32| {
                let mut data = base.data_as_slice().to_vec();
                data[i] += delta;
                graph
                    .set_node_value(param, Some(&Tensor::new(&data, base.shape())))
                    .unwrap();
                loss_value(graph, loss)
            };
            let numeric = (shifted(H) - shifted(-H)) / (2.0 * H);
            let expected = analytic.data_as_slice()[i];
            assert!(
                (numeric - expected).abs() <= TOLERANCE * expected.abs().max(1.0),
                "参数{param:?}第{i}个元素的梯度不符：数值梯度{numeric}，反向传播{expected}"
            );
        }
        graph.set_node_value(param, Some(&base)).unwrap();
    }
}
