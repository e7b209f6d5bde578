/*
 * @Description  : Layer 与 Module trait 测试
 */

use crate::assert_err;
use crate::nn::{
    BatchNorm, Conv2d, ConvTranspose2d, Dropout, Graph, GraphError, Linear, Module, Padding,
    VarActivationOps,
};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_linear_layer() {
    let graph = Graph::new_with_seed(1);
    let fc = Linear::new(&graph, 4, 3, true, "fc").unwrap();
    assert_eq!(fc.in_features(), 4);
    assert_eq!(fc.out_features(), 3);
    assert_eq!(fc.num_params(), 2);
    assert_eq!(fc.num_scalars(), 4 * 3 + 3);
    assert_eq!(fc.weights().name().unwrap(), "fc/kernel");
    assert_eq!(fc.bias().unwrap().name().unwrap(), "fc/bias");

    let x = graph.input(&Tensor::ones(&[2, 4])).unwrap();
    let y = fc.forward(&x).unwrap();
    assert_eq!(y.value_expected_shape().unwrap(), vec![2, 3]);
    y.forward().unwrap();

    // 偏置为零，全 1 输入时输出为权重按列求和
    let w = fc.weights().value().unwrap().unwrap();
    let out = y.value().unwrap().unwrap();
    for j in 0..3 {
        let col: f32 = (0..4).map(|i| w[[i, j]]).sum();
        assert_abs_diff_eq!(out[[0, j]], col, epsilon = 1e-6);
        assert_abs_diff_eq!(out[[1, j]], col, epsilon = 1e-6);
    }

    let no_bias = Linear::new(&graph, 4, 3, false, "fc_no_bias").unwrap();
    assert_eq!(no_bias.parameters().len(), 1);

    // 同名层会造成参数名重复
    assert_err!(Linear::new(&graph, 4, 3, true, "fc"), GraphError::DuplicateNodeName(_));
}

#[test]
fn test_conv_layers_shapes() {
    let graph = Graph::new_with_seed(2);
    let x = graph.input(&Tensor::zeros(&[2, 1, 28, 28])).unwrap();
    let conv = Conv2d::new(&graph, 1, 8, (5, 5), (2, 2), Padding::Same, "conv").unwrap();
    let h = conv.forward(&x).unwrap();
    assert_eq!(h.value_expected_shape().unwrap(), vec![2, 8, 14, 14]);
    assert_eq!(conv.kernel().value_expected_shape().unwrap(), vec![8, 1, 5, 5]);
    assert_eq!(conv.num_scalars(), 8 * 25 + 8);

    let up = ConvTranspose2d::new(&graph, 8, 4, (5, 5), (2, 2), Padding::Same, "up").unwrap();
    let u = up.forward(&h).unwrap();
    assert_eq!(u.value_expected_shape().unwrap(), vec![2, 4, 28, 28]);
    assert_eq!(up.parameters()[0].value_expected_shape().unwrap(), vec![8, 4, 5, 5]);

    u.forward().unwrap();
    // 零输入、零偏置
    assert!(u.value().unwrap().unwrap().data_as_slice().iter().all(|v| *v == 0.0));
}

#[test]
fn test_batch_norm_layer() {
    let graph = Graph::new();
    let bn = BatchNorm::new(&graph, 3, 0.99, 1e-3, false, "bn").unwrap();
    assert_eq!(bn.num_params(), 1);
    assert_eq!(bn.parameters()[0].name().unwrap(), "bn/beta");

    let scaled = BatchNorm::new(&graph, 3, 0.99, 1e-3, true, "bn_scaled").unwrap();
    let names: Vec<String> = scaled.parameters().iter().map(|p| p.name().unwrap()).collect();
    assert_eq!(names, vec!["bn_scaled/beta", "bn_scaled/gamma"]);

    let x = graph.input(&Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])).unwrap();
    let y = scaled.forward(&x).unwrap();
    y.forward().unwrap();
    let out = y.value().unwrap().unwrap();
    // 每个通道只有两个样本：归一化后约为 ±1
    assert_abs_diff_eq!(out[[0, 0]], -1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(out[[1, 2]], 1.0, epsilon = 1e-3);
}

#[test]
fn test_dropout_layer() {
    let graph = Graph::new_with_seed(3);
    let dropout = Dropout::new(0.4).unwrap();
    assert_abs_diff_eq!(dropout.rate(), 0.4);
    assert_err!(Dropout::new(1.0), GraphError::InvalidOperation(_));

    let x = graph.input(&Tensor::ones(&[4, 10])).unwrap();
    let y = dropout.forward(&x).unwrap();
    graph.eval();
    y.forward().unwrap();
    assert_eq!(y.value().unwrap().unwrap(), Tensor::ones(&[4, 10]));
    graph.train();
}

#[test]
fn test_layers_chain_with_activation_and_backward() {
    let graph = Graph::new_with_seed(4);
    let fc1 = Linear::new(&graph, 6, 5, true, "fc1").unwrap();
    let fc2 = Linear::new(&graph, 5, 1, true, "fc2").unwrap();
    let x = graph.input(&Tensor::ones(&[3, 6])).unwrap();
    let p = fc2
        .forward(&fc1.forward(&x).unwrap().leaky_relu(0.2).unwrap())
        .unwrap()
        .sigmoid()
        .unwrap();
    let loss = crate::nn::VarLossOps::bce_loss(&p, 1.0).unwrap();
    let value = loss.backward().unwrap();
    assert!(value > 0.0);
    for param in fc1.parameters().iter().chain(fc2.parameters().iter()) {
        let grad = param.grad().unwrap().unwrap();
        assert_eq!(grad.shape(), param.value_expected_shape().unwrap().as_slice());
    }
}
