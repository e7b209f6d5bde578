use crate::tensor::Tensor;

#[test]
fn test_add_with_or_without_ownership() {
    let tensor1 = Tensor::new(&[1., 2., 3.], &[3]);
    let tensor2 = Tensor::new(&[4., 5., 6.], &[3]);

    // f32 + 不带引用的张量
    assert_eq!(5. + tensor1.clone(), Tensor::new(&[6., 7., 8.], &[3]));
    // f32 + 带引用的张量
    assert_eq!(5. + &tensor1, Tensor::new(&[6., 7., 8.], &[3]));
    // 带引用的张量 + f32
    assert_eq!(&tensor1 + 5., Tensor::new(&[6., 7., 8.], &[3]));
    // 不带引用的张量 + 带引用的张量
    assert_eq!(tensor1.clone() + &tensor2, Tensor::new(&[5., 7., 9.], &[3]));
    // 带引用的张量 + 带引用的张量
    assert_eq!(&tensor1 + &tensor2, Tensor::new(&[5., 7., 9.], &[3]));
}

#[test]
fn test_sub_mul_div() {
    let a = Tensor::new(&[2., 4., 6., 8.], &[2, 2]);
    let b = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);

    assert_eq!(&a - &b, Tensor::new(&[1., 2., 3., 4.], &[2, 2]));
    assert_eq!(1. - &b, Tensor::new(&[0., -1., -2., -3.], &[2, 2]));
    assert_eq!(&a * &b, Tensor::new(&[2., 8., 18., 32.], &[2, 2]));
    assert_eq!(&a * 0.5, Tensor::new(&[1., 2., 3., 4.], &[2, 2]));
    assert_eq!(&a / &b, Tensor::new(&[2., 2., 2., 2.], &[2, 2]));
    assert_eq!(12. / &a, Tensor::new(&[6., 3., 2., 1.5], &[2, 2]));
}

#[test]
fn test_assign_ops() {
    let mut a = Tensor::new(&[1., 2., 3.], &[3]);
    a += &Tensor::new(&[1., 1., 1.], &[3]);
    assert_eq!(a, Tensor::new(&[2., 3., 4.], &[3]));
    a -= &Tensor::new(&[2., 2., 2.], &[3]);
    assert_eq!(a, Tensor::new(&[0., 1., 2.], &[3]));
    a *= 3.;
    assert_eq!(a, Tensor::new(&[0., 3., 6.], &[3]));
    a *= &Tensor::new(&[5., 2., 0.5], &[3]);
    assert_eq!(a, Tensor::new(&[0., 6., 3.], &[3]));
    a += 1.;
    assert_eq!(a, Tensor::new(&[1., 7., 4.], &[3]));
}

#[test]
#[should_panic(expected = "形状不一致，故无法相加")]
fn test_add_with_mismatched_shapes() {
    let a = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let b = Tensor::new(&[1., 2., 3., 4.], &[4]);
    let _ = &a + &b;
}
