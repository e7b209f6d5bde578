/*
 * @Description  : 前向传播测试
 */

use crate::nn::{GraphInner, Init};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_forward_chain() {
    let mut graph = GraphInner::new();
    let x = graph.new_input_node(&[1, 2], Some("x")).unwrap();
    let w = graph.new_parameter_node(&[2, 1], Init::Ones, Some("w")).unwrap();
    let b = graph.new_parameter_node(&[1, 1], Init::Ones, Some("b")).unwrap();
    let h = graph.new_mat_mul_node(x, w, None).unwrap();
    let y = graph.new_bias_add_node(h, b, None).unwrap();

    graph
        .set_node_value(x, Some(&Tensor::new(&[2.0, 3.0], &[1, 2])))
        .unwrap();
    graph.forward(y).unwrap();
    assert_abs_diff_eq!(graph.get_node_value(y).unwrap().unwrap()[[0, 0]], 6.0);
    assert_eq!(graph.last_forward_pass_id(), 1);

    // 修改输入后重新前向传播
    graph
        .set_node_value(x, Some(&Tensor::new(&[-1.0, 1.0], &[1, 2])))
        .unwrap();
    graph.forward(y).unwrap();
    assert_abs_diff_eq!(graph.get_node_value(y).unwrap().unwrap()[[0, 0]], 1.0);
    assert_eq!(graph.last_forward_pass_id(), 2);
}

#[test]
fn test_forward_many_shares_dropout_mask() {
    let mut graph = GraphInner::new_with_seed(11);
    let x = graph.new_input_node(&[8, 16], None).unwrap();
    graph.set_node_value(x, Some(&Tensor::ones(&[8, 16]))).unwrap();
    let d = graph.new_dropout_node(x, 0.5, None).unwrap();
    let a = graph.new_scalar_multiply_node(d, 1.0, None).unwrap();
    let b = graph.new_scalar_multiply_node(d, 2.0, None).unwrap();

    graph.forward_many(&[a, b]).unwrap();
    let a_value = graph.get_node_value(a).unwrap().unwrap().clone();
    let b_value = graph.get_node_value(b).unwrap().unwrap().clone();
    assert_eq!(&a_value * 2.0, b_value);

    // 分两次前向传播，掩码重新采样
    graph.forward(a).unwrap();
    graph.forward(b).unwrap();
    let a_value = graph.get_node_value(a).unwrap().unwrap().clone();
    let b_value = graph.get_node_value(b).unwrap().unwrap().clone();
    assert_ne!(&a_value * 2.0, b_value);
}

#[test]
fn test_forward_only_computes_ancestors() {
    let mut graph = GraphInner::new();
    let x = graph.new_input_node(&[1, 1], None).unwrap();
    let unrelated = graph.new_input_node(&[1, 1], None).unwrap();
    let y = graph.new_sigmoid_node(x, None).unwrap();
    let z = graph.new_sigmoid_node(unrelated, None).unwrap();

    graph.set_node_value(x, Some(&Tensor::zeros(&[1, 1]))).unwrap();
    // unrelated 没有值，但不在 y 的祖先中，不影响前向传播
    graph.forward(y).unwrap();
    assert_abs_diff_eq!(graph.get_node_value(y).unwrap().unwrap()[[0, 0]], 0.5);
    assert!(graph.get_node_value(z).unwrap().is_none());
}

#[test]
fn test_train_and_eval_mode() {
    let mut graph = GraphInner::new_with_seed(5);
    let x = graph.new_input_node(&[4, 32], None).unwrap();
    graph.set_node_value(x, Some(&Tensor::ones(&[4, 32]))).unwrap();
    let d = graph.new_dropout_node(x, 0.4, None).unwrap();

    graph.forward(d).unwrap();
    let train_out = graph.get_node_value(d).unwrap().unwrap().clone();
    // 存活元素按 1/(1-rate) 放大
    for &v in train_out.data_as_slice() {
        assert!(v == 0.0 || (v - 1.0 / 0.6).abs() < 1e-6);
    }
    assert!(train_out.data_as_slice().contains(&0.0));

    graph.set_eval_mode();
    assert!(!graph.is_train_mode());
    graph.forward(d).unwrap();
    assert_eq!(graph.get_node_value(d).unwrap().unwrap(), &Tensor::ones(&[4, 32]));

    graph.set_train_mode();
    // 切回训练模式后新建的节点也处于训练模式
    let d2 = graph.new_dropout_node(x, 0.9, None).unwrap();
    graph.forward(d2).unwrap();
    assert!(graph.get_node_value(d2).unwrap().unwrap().data_as_slice().contains(&0.0));
}
