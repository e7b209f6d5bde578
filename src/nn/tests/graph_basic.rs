/*
 * @Description  : 计算图基础功能测试（节点创建、命名、取值/设值）
 */

use crate::assert_err;
use crate::nn::{GraphError, GraphInner, Init, NodeId};
use crate::tensor::Tensor;

#[test]
fn test_new_graph() {
    let graph = GraphInner::new();
    assert_eq!(graph.name(), "default_graph");
    assert_eq!(graph.nodes_count(), 0);
    assert!(graph.is_train_mode());
    assert!(!graph.has_seed());

    let graph = GraphInner::with_name_and_seed("gan", 7);
    assert_eq!(graph.name(), "gan");
    assert!(graph.has_seed());
}

#[test]
fn test_node_naming() {
    let mut graph = GraphInner::new();
    let x = graph.new_input_node(&[2, 3], Some("x")).unwrap();
    assert_eq!(graph.get_node_name(x).unwrap(), "x");

    // 自动命名：{小写类型名}_{序号}
    let s1 = graph.new_sigmoid_node(x, None).unwrap();
    let s2 = graph.new_sigmoid_node(x, None).unwrap();
    assert_eq!(graph.get_node_name(s1).unwrap(), "sigmoid_1");
    assert_eq!(graph.get_node_name(s2).unwrap(), "sigmoid_2");
    assert_eq!(graph.find_node_by_name("sigmoid_2"), Some(s2));
    assert_eq!(graph.find_node_by_name("nothing"), None);

    assert_err!(
        graph.new_sigmoid_node(x, Some("x")),
        GraphError::DuplicateNodeName("节点x在图default_graph中重复")
    );
}

#[test]
fn test_node_ids_and_edges() {
    let mut graph = GraphInner::new();
    let a = graph.new_input_node(&[2, 2], None).unwrap();
    let b = graph.new_parameter_node(&[2, 2], Init::Ones, None).unwrap();
    let c = graph.new_add_node(a, b, None).unwrap();

    assert_eq!(a, NodeId(1));
    assert_eq!(graph.nodes(), vec![a, b, c]);
    assert_eq!(graph.get_node_parents(c).unwrap(), vec![a, b]);
    assert_eq!(graph.get_node_children(a).unwrap(), vec![c]);
    assert!(graph.get_node_children(c).unwrap().is_empty());
    assert_eq!(graph.get_all_parameter_nodes(), vec![b]);
    assert!(graph.is_node_parameter(b).unwrap());
    assert!(!graph.is_node_parameter(c).unwrap());

    assert_err!(graph.get_node_parents(NodeId(99)), GraphError::NodeNotFound(NodeId(99)));
}

#[test]
fn test_input_node_shape_validation() {
    let mut graph = GraphInner::new();
    assert_err!(graph.new_input_node(&[], None), GraphError::InvalidOperation(_));
    assert_err!(graph.new_input_node(&[3, 0], None), GraphError::InvalidOperation(_));
    assert_err!(
        graph.new_parameter_node(&[1, 2, 3, 4, 5], Init::Zeros, None),
        GraphError::DimensionMismatch(2, 5)
    );
}

#[test]
fn test_set_node_value() {
    let mut graph = GraphInner::new();
    let x = graph.new_input_node(&[2, 2], Some("x")).unwrap();
    let y = graph.new_sigmoid_node(x, Some("y")).unwrap();

    let value = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    graph.set_node_value(x, Some(&value)).unwrap();
    assert_eq!(graph.get_node_value(x).unwrap(), Some(&value));

    // 形状不符
    let wrong = Tensor::new(&[1.0, 2.0, 3.0], &[1, 3]);
    assert_err!(
        graph.set_node_value(x, Some(&wrong)),
        GraphError::ShapeMismatch(
            [2, 2],
            [1, 3],
            "节点[id=1, name=x, type=Input]的新值形状与节点形状不一致"
        )
    );

    // 运算节点不能手动设值
    assert_err!(
        graph.set_node_value(y, Some(&value)),
        GraphError::InvalidOperation(
            "节点[id=2, name=y, type=Sigmoid]的值只能由前向传播计算得到，不能手动设置"
        )
    );

    // 清空
    graph.set_node_value(x, None).unwrap();
    assert_eq!(graph.get_node_value(x).unwrap(), None);
}

#[test]
fn test_parameter_initialisation() {
    let mut graph = GraphInner::new_with_seed(1);
    let zeros = graph.new_parameter_node(&[2, 3], Init::Zeros, None).unwrap();
    let ones = graph.new_parameter_node(&[1, 3], Init::Ones, None).unwrap();
    let glorot = graph
        .new_parameter_node(
            &[64, 32],
            Init::GlorotUniform {
                fan_in: 64,
                fan_out: 32,
            },
            None,
        )
        .unwrap();

    assert_eq!(graph.get_node_value(zeros).unwrap().unwrap(), &Tensor::zeros(&[2, 3]));
    assert_eq!(graph.get_node_value(ones).unwrap().unwrap(), &Tensor::ones(&[1, 3]));

    let limit = (6.0f32 / 96.0).sqrt();
    let w = graph.get_node_value(glorot).unwrap().unwrap();
    assert!(w.data_as_slice().iter().all(|v| v.abs() <= limit));
    // 不应全为同一个值
    assert!(w.data_as_slice().iter().any(|&v| v != w.data_as_slice()[0]));
}

#[test]
fn test_seeded_graphs_are_reproducible() {
    let build = |seed| {
        let mut graph = GraphInner::new_with_seed(seed);
        let w = graph
            .new_parameter_node(
                &[4, 4],
                Init::GlorotUniform {
                    fan_in: 4,
                    fan_out: 4,
                },
                None,
            )
            .unwrap();
        graph.get_node_value(w).unwrap().unwrap().clone()
    };
    assert_eq!(build(3), build(3));
    assert_ne!(build(3), build(4));
}

#[test]
fn test_forward_requires_input_value() {
    let mut graph = GraphInner::new();
    let x = graph.new_input_node(&[1, 2], Some("x")).unwrap();
    let y = graph.new_sigmoid_node(x, None).unwrap();
    assert_err!(
        graph.forward(y),
        GraphError::InvalidOperation(
            "节点[id=1, name=x, type=Input]没有值，无法前向传播。请先通过set_node_value设置"
        )
    );
}
