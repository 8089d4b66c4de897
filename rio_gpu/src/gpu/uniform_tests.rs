//! Unit tests for uniform.rs

use crate::gpu::{Mtx23f, Mtx44f, UniformArrayData, UniformData, UniformValue};
use glam::{IVec3, Mat3, UVec2, Vec2, Vec4};

#[test]
fn test_scalars() {
    assert_eq!(1.5f32.to_uniform(), UniformValue::Float(&[1.5]));
    assert_eq!((-3i32).to_uniform(), UniformValue::Int(&[-3]));
    assert_eq!(7u32.to_uniform(), UniformValue::Uint(&[7]));
}

#[test]
fn test_vectors_keep_component_count() {
    assert_eq!(Vec2::new(1.0, 2.0).to_uniform(), UniformValue::Float(&[1.0, 2.0]));
    assert_eq!(IVec3::new(1, -2, 3).to_uniform(), UniformValue::Int(&[1, -2, 3]));
    assert_eq!(UVec2::new(4, 5).to_uniform().word_count(), 2);
}

#[test]
fn test_glam_matrix_is_column_major() {
    let m = Mat3::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    let UniformValue::Matrix(matrix) = m.to_uniform() else { panic!("not a matrix") };
    assert_eq!((matrix.columns, matrix.rows), (3, 3));
    assert_eq!(matrix.column(1), [4.0, 5.0, 6.0, 0.0]);
    assert_eq!(matrix.to_column_major(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
}

#[test]
fn test_row_major_non_square_transposes_into_columns() {
    // 2 rows, 3 columns
    let m = Mtx23f::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let matrix = m.to_uniform_matrix();
    assert_eq!((matrix.columns, matrix.rows), (3, 2));
    assert_eq!(matrix.column(0), [1.0, 4.0, 0.0, 0.0]);
    assert_eq!(matrix.column(2), [3.0, 6.0, 0.0, 0.0]);
    assert_eq!(matrix.to_column_major(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    assert_eq!(m.to_uniform().word_count(), 6);
}

#[test]
fn test_row_major_identity() {
    let mut rows = [[0.0; 4]; 4];
    for (i, row) in rows.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    let matrix = Mtx44f::new(rows).to_uniform_matrix();
    assert_eq!(matrix.column(3), [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_vec4_array() {
    let values = [Vec4::ONE, Vec4::ZERO];
    let value = Vec4::to_uniform_array(&values);
    assert_eq!(value.word_count(), 8);
    assert!(matches!(value, UniformValue::Vec4Array(v) if v.len() == 2));
}
