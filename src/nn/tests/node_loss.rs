/*
 * @Description  : BceLoss / L2Penalty 节点测试
 */

use super::gradient_check::{assert_gradients_match, parameter_with_value, random_tensor};
use crate::assert_err;
use crate::nn::{GraphError, GraphInner};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_bce_loss_forward() {
    let mut graph = GraphInner::new();
    let p = parameter_with_value(&mut graph, &Tensor::new(&[0.9, 0.2], &[2, 1]), "p");
    let real = graph.new_bce_loss_node(p, 1.0, None).unwrap();
    let fake = graph.new_bce_loss_node(p, 0.0, None).unwrap();
    graph.forward_many(&[real, fake]).unwrap();

    let expected_real = -(0.9f32.ln() + 0.2f32.ln()) / 2.0;
    let expected_fake = -(0.1f32.ln() + 0.8f32.ln()) / 2.0;
    let real_value = graph.get_node_value(real).unwrap().unwrap();
    assert_eq!(real_value.shape(), &[1, 1]);
    assert_abs_diff_eq!(real_value[[0, 0]], expected_real, epsilon = 1e-5);
    assert_abs_diff_eq!(
        graph.get_node_value(fake).unwrap().unwrap()[[0, 0]],
        expected_fake,
        epsilon = 1e-5
    );
}

#[test]
fn test_bce_loss_is_finite_at_saturation() {
    let mut graph = GraphInner::new();
    let p = parameter_with_value(&mut graph, &Tensor::new(&[0.0, 1.0], &[1, 2]), "p");
    let loss = graph.new_bce_loss_node(p, 1.0, None).unwrap();
    graph.forward(loss).unwrap();
    let value = graph.get_node_value(loss).unwrap().unwrap()[[0, 0]];
    assert!(value.is_finite());
    // -ln(1e-12) / 2
    assert_abs_diff_eq!(value, 12.0 * 10f32.ln() / 2.0, epsilon = 1e-2);
}

#[test]
fn test_bce_loss_gradient() {
    let mut graph = GraphInner::new();
    let x = parameter_with_value(&mut graph, &random_tensor(&[4, 1], 71), "x");
    let p = graph.new_sigmoid_node(x, None).unwrap();
    let real = graph.new_bce_loss_node(p, 1.0, None).unwrap();
    assert_gradients_match(&mut graph, real, &[x]);

    let mut graph = GraphInner::new();
    let x = parameter_with_value(&mut graph, &random_tensor(&[4, 1], 72), "x");
    let p = graph.new_sigmoid_node(x, None).unwrap();
    let fake = graph.new_bce_loss_node(p, 0.0, None).unwrap();
    assert_gradients_match(&mut graph, fake, &[x]);
}

#[test]
fn test_bce_loss_target_validation() {
    let mut graph = GraphInner::new();
    let p = graph.new_input_node(&[2, 1], None).unwrap();
    assert_err!(
        graph.new_bce_loss_node(p, 1.5, None),
        GraphError::InvalidOperation("BceLoss 的目标值必须在[0, 1]内，得到 1.5")
    );
}

#[test]
fn test_l2_penalty() {
    let mut graph = GraphInner::new();
    let a = parameter_with_value(&mut graph, &Tensor::new(&[1.0, 2.0], &[1, 2]), "a");
    let b = parameter_with_value(&mut graph, &Tensor::new(&[3.0], &[1, 1]), "b");
    let reg = graph.new_l2_penalty_node(&[a, b], 1e-6, None).unwrap();
    graph.forward(reg).unwrap();
    // 1e-6 * (1 + 4 + 9) / 2
    assert_abs_diff_eq!(
        graph.get_node_value(reg).unwrap().unwrap()[[0, 0]],
        7e-6,
        epsilon = 1e-9
    );

    graph.backward(reg).unwrap();
    let grad = graph.get_node_grad(a).unwrap().unwrap();
    assert_abs_diff_eq!(grad[[0, 1]], 2e-6, epsilon = 1e-10);

    assert_err!(graph.new_l2_penalty_node(&[], 1.0, None), GraphError::InvalidOperation(_));
}

#[test]
fn test_l2_penalty_gradient() {
    let mut graph = GraphInner::new();
    let a = parameter_with_value(&mut graph, &random_tensor(&[2, 3], 73), "a");
    let b = parameter_with_value(&mut graph, &random_tensor(&[1, 3], 74), "b");
    let reg = graph.new_l2_penalty_node(&[a, b], 0.5, None).unwrap();
    assert_gradients_match(&mut graph, reg, &[a, b]);
}
