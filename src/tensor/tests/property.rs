use crate::tensor::Tensor;

#[test]
fn test_shape_properties() {
    let t = Tensor::zeros(&[2, 1, 3]);
    assert_eq!(t.shape(), &[2, 1, 3]);
    assert_eq!(t.dimension(), 3);
    assert_eq!(t.size(), 6);
    assert!(!t.is_scalar());
    assert!(t.is_same_shape(&Tensor::ones(&[2, 1, 3])));
    assert!(!t.is_same_shape(&Tensor::ones(&[6])));
}

#[test]
fn test_get_data_number() {
    assert_eq!(Tensor::full(3.5, &[1, 1]).get_data_number(), Some(3.5));
    assert_eq!(Tensor::new(&[1., 2.], &[2]).get_data_number(), None);
}

#[test]
#[should_panic(expected = "数据长度3与形状[2, 2]不符")]
fn test_new_with_wrong_data_len() {
    let _ = Tensor::new(&[1., 2., 3.], &[2, 2]);
}
