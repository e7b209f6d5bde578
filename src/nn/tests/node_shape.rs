/*
 * @Description  : Reshape / ResizeBilinear 节点测试
 */

use super::gradient_check::{assert_gradients_match, parameter_with_value, random_tensor};
use crate::assert_err;
use crate::nn::{GraphError, GraphInner};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_reshape() {
    let mut graph = GraphInner::new();
    let x = parameter_with_value(&mut graph, &random_tensor(&[2, 16], 21), "x");
    let y = graph.new_reshape_node(x, &[2, 1, 4, 4], None).unwrap();
    graph.forward(y).unwrap();
    let y_value = graph.get_node_value(y).unwrap().unwrap();
    assert_eq!(y_value.shape(), &[2, 1, 4, 4]);
    assert_eq!(
        y_value.data_as_slice(),
        graph.get_node_value(x).unwrap().unwrap().data_as_slice()
    );
    assert_gradients_match(&mut graph, y, &[x]);

    assert_err!(
        graph.new_reshape_node(x, &[3, 10], None),
        GraphError::ShapeMismatch([2, 16], [3, 10], "Reshape前后元素个数不一致：32 vs 30")
    );
}

#[test]
fn test_resize_bilinear_upsample() {
    let mut graph = GraphInner::new();
    let x = parameter_with_value(&mut graph, &Tensor::new(&[0.0, 1.0, 2.0, 3.0], &[1, 1, 2, 2]), "x");
    let y = graph.new_resize_bilinear_node(x, (4, 4), None).unwrap();
    graph.forward(y).unwrap();

    // src = dst * in / out，不对齐角点，越界取边缘
    #[rustfmt::skip]
    let expected = [
        0.0, 0.5, 1.0, 1.0,
        1.0, 1.5, 2.0, 2.0,
        2.0, 2.5, 3.0, 3.0,
        2.0, 2.5, 3.0, 3.0,
    ];
    let output = graph.get_node_value(y).unwrap().unwrap();
    assert_eq!(output.shape(), &[1, 1, 4, 4]);
    for (a, b) in output.data_as_slice().iter().zip(expected) {
        assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
    }
}

#[test]
fn test_resize_bilinear_4_to_7_gradient() {
    let mut graph = GraphInner::new();
    let x = parameter_with_value(&mut graph, &random_tensor(&[2, 1, 4, 4], 22), "x");
    let y = graph.new_resize_bilinear_node(x, (7, 7), None).unwrap();
    assert_eq!(graph.get_node_value_expected_shape(y).unwrap(), &[2, 1, 7, 7]);
    assert_gradients_match(&mut graph, y, &[x]);

    let flat = graph.new_input_node(&[2, 16], None).unwrap();
    assert_err!(
        graph.new_resize_bilinear_node(flat, (7, 7), None),
        GraphError::DimensionMismatch(4, 2)
    );
}
