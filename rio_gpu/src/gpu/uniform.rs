//! Uniform values accepted by `Shader::set_uniform`
//!
//! Anything implementing `UniformData` can be written: f32/i32/u32 scalars, glam vectors
//! (2 to 4 components of each), glam column-major matrices and the row-major
//! `RowMajorMatrix<R, C>` family (`Mtx22f` .. `Mtx44f`).

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

/// Matrix in column-major storage, `data[column][row]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformMatrix {
    pub columns: u32,
    pub rows: u32,
    pub data: [[f32; 4]; 4],
}

impl UniformMatrix {
    /// Column `c` padded to four floats
    pub fn column(&self, c: usize) -> [f32; 4] {
        self.data[c]
    }

    /// `columns * rows` floats, column after column (GL layout)
    pub fn to_column_major(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity((self.columns * self.rows) as usize);
        for column in self.data.iter().take(self.columns as usize) {
            values.extend_from_slice(&column[..self.rows as usize]);
        }
        values
    }
}

/// Uniform payload, already reduced to backend-friendly shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    Float(&'a [f32]),
    Int(&'a [i32]),
    Uint(&'a [u32]),
    Matrix(UniformMatrix),
    /// `count` vec4s of floats
    Vec4Array(&'a [Vec4]),
    IVec4Array(&'a [IVec4]),
    UVec4Array(&'a [UVec4]),
}

impl UniformValue<'_> {
    /// Number of 32-bit words carried (before any register padding)
    pub fn word_count(&self) -> usize {
        match self {
            UniformValue::Float(v) => v.len(),
            UniformValue::Int(v) => v.len(),
            UniformValue::Uint(v) => v.len(),
            UniformValue::Matrix(m) => (m.columns * m.rows) as usize,
            UniformValue::Vec4Array(v) => v.len() * 4,
            UniformValue::IVec4Array(v) => v.len() * 4,
            UniformValue::UVec4Array(v) => v.len() * 4,
        }
    }
}

/// Types that can be written as a single uniform
pub trait UniformData {
    fn to_uniform(&self) -> UniformValue<'_>;
}

impl UniformData for f32 {
    fn to_uniform(&self) -> UniformValue<'_> {
        UniformValue::Float(std::slice::from_ref(self))
    }
}

impl UniformData for i32 {
    fn to_uniform(&self) -> UniformValue<'_> {
        UniformValue::Int(std::slice::from_ref(self))
    }
}

impl UniformData for u32 {
    fn to_uniform(&self) -> UniformValue<'_> {
        UniformValue::Uint(std::slice::from_ref(self))
    }
}

macro_rules! impl_vector_uniform {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl UniformData for $ty {
                fn to_uniform(&self) -> UniformValue<'_> {
                    UniformValue::$variant(bytemuck::cast_slice(std::slice::from_ref(self)))
                }
            }
        )*
    };
}

impl_vector_uniform!(
    Vec2 => Float, Vec3 => Float, Vec4 => Float,
    IVec2 => Int, IVec3 => Int, IVec4 => Int,
    UVec2 => Uint, UVec3 => Uint, UVec4 => Uint,
);

fn column_major_matrix<const N: usize>(columns: [[f32; N]; N]) -> UniformMatrix {
    let mut data = [[0.0; 4]; 4];
    for (c, column) in columns.iter().enumerate() {
        data[c][..N].copy_from_slice(column);
    }
    UniformMatrix { columns: N as u32, rows: N as u32, data }
}

impl UniformData for Mat2 {
    fn to_uniform(&self) -> UniformValue<'_> {
        UniformValue::Matrix(column_major_matrix(self.to_cols_array_2d()))
    }
}

impl UniformData for Mat3 {
    fn to_uniform(&self) -> UniformValue<'_> {
        UniformValue::Matrix(column_major_matrix(self.to_cols_array_2d()))
    }
}

impl UniformData for Mat4 {
    fn to_uniform(&self) -> UniformValue<'_> {
        UniformValue::Matrix(column_major_matrix(self.to_cols_array_2d()))
    }
}

/// Row-major matrix with `R` rows and `C` columns (`m[row][column]`), 2..=4 each
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMajorMatrix<const R: usize, const C: usize> {
    pub m: [[f32; C]; R],
}

pub type Mtx22f = RowMajorMatrix<2, 2>;
pub type Mtx23f = RowMajorMatrix<2, 3>;
pub type Mtx24f = RowMajorMatrix<2, 4>;
pub type Mtx32f = RowMajorMatrix<3, 2>;
pub type Mtx33f = RowMajorMatrix<3, 3>;
pub type Mtx34f = RowMajorMatrix<3, 4>;
pub type Mtx42f = RowMajorMatrix<4, 2>;
pub type Mtx43f = RowMajorMatrix<4, 3>;
pub type Mtx44f = RowMajorMatrix<4, 4>;

impl<const R: usize, const C: usize> RowMajorMatrix<R, C> {
    pub fn new(m: [[f32; C]; R]) -> Self {
        Self { m }
    }

    /// Column-major copy, `data[column][row]`, rows and columns past 4 dropped
    pub fn to_uniform_matrix(&self) -> UniformMatrix {
        let rows = R.min(4);
        let columns = C.min(4);
        let mut data = [[0.0; 4]; 4];
        for (c, column) in data.iter_mut().enumerate().take(columns) {
            for (r, value) in column.iter_mut().enumerate().take(rows) {
                *value = self.m[r][c];
            }
        }
        UniformMatrix { columns: columns as u32, rows: rows as u32, data }
    }
}

impl<const R: usize, const C: usize> UniformData for RowMajorMatrix<R, C> {
    fn to_uniform(&self) -> UniformValue<'_> {
        UniformValue::Matrix(self.to_uniform_matrix())
    }
}

/// Element types `Shader::set_uniform_array` accepts
pub trait UniformArrayData: Sized {
    fn to_uniform_array(values: &[Self]) -> UniformValue<'_>;
}

impl UniformArrayData for Vec4 {
    fn to_uniform_array(values: &[Self]) -> UniformValue<'_> {
        UniformValue::Vec4Array(values)
    }
}

impl UniformArrayData for IVec4 {
    fn to_uniform_array(values: &[Self]) -> UniformValue<'_> {
        UniformValue::IVec4Array(values)
    }
}

impl UniformArrayData for UVec4 {
    fn to_uniform_array(values: &[Self]) -> UniformValue<'_> {
        UniformValue::UVec4Array(values)
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;
