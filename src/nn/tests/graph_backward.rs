/*
 * @Description  : 反向传播测试（梯度累积、限定参数范围、错误情形）
 */

use crate::assert_err;
use crate::nn::{GraphError, GraphInner, Init};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

/// y = sigmoid(x·w1)·w2，两组参数
fn two_stage_graph() -> (GraphInner, [crate::nn::NodeId; 4]) {
    let mut graph = GraphInner::new_with_seed(9);
    let x = graph.new_input_node(&[2, 3], Some("x")).unwrap();
    graph
        .set_node_value(
            x,
            Some(&Tensor::new(&[0.1, -0.2, 0.3, 0.4, 0.5, -0.6], &[2, 3])),
        )
        .unwrap();
    let w1 = graph
        .new_parameter_node(&[3, 4], Init::GlorotUniform { fan_in: 3, fan_out: 4 }, Some("w1"))
        .unwrap();
    let w2 = graph
        .new_parameter_node(&[4, 1], Init::GlorotUniform { fan_in: 4, fan_out: 1 }, Some("w2"))
        .unwrap();
    let h = graph.new_mat_mul_node(x, w1, None).unwrap();
    let s = graph.new_sigmoid_node(h, None).unwrap();
    let y = graph.new_mat_mul_node(s, w2, None).unwrap();
    let p = graph.new_sigmoid_node(y, None).unwrap();
    let loss = graph.new_bce_loss_node(p, 1.0, Some("loss")).unwrap();
    (graph, [w1, w2, h, loss])
}

#[test]
fn test_backward_reaches_all_parameters() {
    let (mut graph, [w1, w2, h, loss]) = two_stage_graph();
    graph.forward(loss).unwrap();
    let loss_value = graph.backward(loss).unwrap();

    assert!(loss_value > 0.0);
    assert_eq!(graph.get_node_grad(w1).unwrap().unwrap().shape(), &[3, 4]);
    assert_eq!(graph.get_node_grad(w2).unwrap().unwrap().shape(), &[4, 1]);
    // 中间节点也保存本次的梯度
    assert_eq!(graph.get_node_grad(h).unwrap().unwrap().shape(), &[2, 4]);
    assert_eq!(graph.last_backward_pass_id(), 1);
}

#[test]
fn test_backward_for_restricts_targets() {
    let (mut graph, [w1, w2, h, loss]) = two_stage_graph();
    graph.forward(loss).unwrap();
    graph.backward_for(loss, Some(&[w2])).unwrap();

    assert!(graph.get_node_grad(w2).unwrap().is_some());
    assert!(graph.get_node_grad(w1).unwrap().is_none());
    // 通往 w1 的分支完全没有计算
    assert!(graph.get_node_grad(h).unwrap().is_none());
}

#[test]
fn test_gradients_accumulate_until_cleared() {
    let (mut graph, [w1, _, _, loss]) = two_stage_graph();
    graph.forward(loss).unwrap();
    graph.backward(loss).unwrap();
    let once = graph.get_node_grad(w1).unwrap().unwrap().clone();

    graph.backward(loss).unwrap();
    let twice = graph.get_node_grad(w1).unwrap().unwrap().clone();
    for (a, b) in once.data_as_slice().iter().zip(twice.data_as_slice()) {
        assert_abs_diff_eq!(a * 2.0, *b, epsilon = 1e-6);
    }

    graph.clear_grads(&[w1]).unwrap();
    assert!(graph.get_node_grad(w1).unwrap().is_none());

    graph.backward(loss).unwrap();
    graph.zero_grad();
    assert!(graph.get_node_grad(w1).unwrap().is_none());
}

#[test]
fn test_shared_parameter_gradient_sums_both_paths() {
    // y = x·w + x·w，w 被两条路径共享
    let mut graph = GraphInner::new();
    let x = graph.new_input_node(&[1, 2], None).unwrap();
    graph
        .set_node_value(x, Some(&Tensor::new(&[1.0, 2.0], &[1, 2])))
        .unwrap();
    let w = graph.new_parameter_node(&[2, 1], Init::Ones, None).unwrap();
    let a = graph.new_mat_mul_node(x, w, None).unwrap();
    let b = graph.new_mat_mul_node(x, w, None).unwrap();
    let y = graph.new_add_node(a, b, None).unwrap();

    graph.forward(y).unwrap();
    graph.backward(y).unwrap();
    let grad = graph.get_node_grad(w).unwrap().unwrap();
    assert_abs_diff_eq!(grad[[0, 0]], 2.0);
    assert_abs_diff_eq!(grad[[1, 0]], 4.0);
}

#[test]
fn test_backward_errors() {
    let mut graph = GraphInner::new();
    let x = graph.new_parameter_node(&[2, 2], Init::Ones, None).unwrap();
    let y = graph.new_sigmoid_node(x, Some("y")).unwrap();

    // 尚未前向传播
    assert_err!(
        graph.backward(y),
        GraphError::ComputationError("损失节点[id=2, name=y, type=Sigmoid]没有值，请先执行 forward")
    );

    // 非标量
    graph.forward(y).unwrap();
    assert_err!(graph.backward(y), GraphError::InvalidOperation(_));
}
