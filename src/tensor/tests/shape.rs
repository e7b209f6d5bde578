use crate::tensor::Tensor;

#[test]
fn test_reshape_and_index() {
    let t = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let r = t.reshape(&[3, 2]);
    assert_eq!(r.shape(), &[3, 2]);
    assert_eq!(r[[2, 1]], 6.);
    assert_eq!(r.reshape(&[1, 1, 2, 3])[[0, 0, 1, 0]], 4.);
}

#[test]
#[should_panic(expected = "张量形状不兼容")]
fn test_reshape_with_wrong_size() {
    let _ = Tensor::zeros(&[2, 3]).reshape(&[4]);
}

#[test]
fn test_transpose() {
    let t = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let tt = t.transpose();
    assert_eq!(tt, Tensor::new(&[1., 4., 2., 5., 3., 6.], &[3, 2]));
    // 转置后仍是标准布局，可以直接取切片
    assert_eq!(tt.data_as_slice(), &[1., 4., 2., 5., 3., 6.]);
}

#[test]
fn test_select_batch() {
    let t = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]);
    let picked = t.select_batch(&[2, 0]);
    assert_eq!(picked, Tensor::new(&[5., 6., 1., 2.], &[2, 2]));
}

#[test]
fn test_index_mut() {
    let mut t = Tensor::zeros(&[2, 2]);
    t[[1, 0]] = 9.;
    assert_eq!(t, Tensor::new(&[0., 0., 9., 0.], &[2, 2]));
}
