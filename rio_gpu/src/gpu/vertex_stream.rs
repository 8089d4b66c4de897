//! Vertex attribute formats and streams
//!
//! A `VertexStream` describes one attribute: where the shader reads it (location), how it is
//! encoded (format) and where it sits inside a vertex (byte offset).

/// Numeric interpretation of a vertex attribute's components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexComponentKind {
    /// Unsigned, normalized to 0..1
    Unorm,
    /// Unsigned, read as integers
    Uint,
    /// Unsigned, converted to float without normalization
    UintToFloat,
    /// Signed, normalized to -1..1
    Snorm,
    /// Signed, read as integers
    Sint,
    /// Signed, converted to float without normalization
    SintToFloat,
    Float,
}

/// Vertex attribute format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum VertexFormat {
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8A8_UNORM,
    R8_UINT,
    R8G8_UINT,
    R8G8B8A8_UINT,
    R8_UINT_TO_FLOAT,
    R8G8_UINT_TO_FLOAT,
    R8G8B8A8_UINT_TO_FLOAT,
    R8_SNORM,
    R8G8_SNORM,
    R8G8B8A8_SNORM,
    R8_SINT,
    R8G8_SINT,
    R8G8B8A8_SINT,
    R8_SINT_TO_FLOAT,
    R8G8_SINT_TO_FLOAT,
    R8G8B8A8_SINT_TO_FLOAT,
    R10G11B11_FLOAT,
    R10G10B10A2_UNORM,
    R10G10B10A2_UINT,
    R10G10B10A2_SNORM,
    R10G10B10A2_SINT,
    R16_UNORM,
    R16G16_UNORM,
    R16G16B16A16_UNORM,
    R16_UINT,
    R16G16_UINT,
    R16G16B16A16_UINT,
    R16_UINT_TO_FLOAT,
    R16G16_UINT_TO_FLOAT,
    R16G16B16A16_UINT_TO_FLOAT,
    R16_SNORM,
    R16G16_SNORM,
    R16G16B16A16_SNORM,
    R16_SINT,
    R16G16_SINT,
    R16G16B16A16_SINT,
    R16_SINT_TO_FLOAT,
    R16G16_SINT_TO_FLOAT,
    R16G16B16A16_SINT_TO_FLOAT,
    R16_FLOAT,
    R16G16_FLOAT,
    R16G16B16A16_FLOAT,
    R32_UINT,
    R32G32_UINT,
    R32G32B32_UINT,
    R32G32B32A32_UINT,
    R32_SINT,
    R32G32_SINT,
    R32G32B32_SINT,
    R32G32B32A32_SINT,
    R32_FLOAT,
    R32G32_FLOAT,
    R32G32B32_FLOAT,
    R32G32B32A32_FLOAT,
}

impl VertexFormat {
    pub const ALL: [VertexFormat; 56] = {
        use VertexFormat::*;
        [
            R8_UNORM, R8G8_UNORM, R8G8B8A8_UNORM,
            R8_UINT, R8G8_UINT, R8G8B8A8_UINT,
            R8_UINT_TO_FLOAT, R8G8_UINT_TO_FLOAT, R8G8B8A8_UINT_TO_FLOAT,
            R8_SNORM, R8G8_SNORM, R8G8B8A8_SNORM,
            R8_SINT, R8G8_SINT, R8G8B8A8_SINT,
            R8_SINT_TO_FLOAT, R8G8_SINT_TO_FLOAT, R8G8B8A8_SINT_TO_FLOAT,
            R10G11B11_FLOAT,
            R10G10B10A2_UNORM, R10G10B10A2_UINT, R10G10B10A2_SNORM, R10G10B10A2_SINT,
            R16_UNORM, R16G16_UNORM, R16G16B16A16_UNORM,
            R16_UINT, R16G16_UINT, R16G16B16A16_UINT,
            R16_UINT_TO_FLOAT, R16G16_UINT_TO_FLOAT, R16G16B16A16_UINT_TO_FLOAT,
            R16_SNORM, R16G16_SNORM, R16G16B16A16_SNORM,
            R16_SINT, R16G16_SINT, R16G16B16A16_SINT,
            R16_SINT_TO_FLOAT, R16G16_SINT_TO_FLOAT, R16G16B16A16_SINT_TO_FLOAT,
            R16_FLOAT, R16G16_FLOAT, R16G16B16A16_FLOAT,
            R32_UINT, R32G32_UINT, R32G32B32_UINT, R32G32B32A32_UINT,
            R32_SINT, R32G32_SINT, R32G32B32_SINT, R32G32B32A32_SINT,
            R32_FLOAT, R32G32_FLOAT, R32G32B32_FLOAT, R32G32B32A32_FLOAT,
        ]
    };

    /// Number of components the shader sees
    pub fn component_count(self) -> u32 {
        use VertexFormat::*;
        match self {
            R8_UNORM | R8_UINT | R8_UINT_TO_FLOAT | R8_SNORM | R8_SINT | R8_SINT_TO_FLOAT
            | R16_UNORM | R16_UINT | R16_UINT_TO_FLOAT | R16_SNORM | R16_SINT
            | R16_SINT_TO_FLOAT | R16_FLOAT
            | R32_UINT | R32_SINT | R32_FLOAT => 1,

            R8G8_UNORM | R8G8_UINT | R8G8_UINT_TO_FLOAT | R8G8_SNORM | R8G8_SINT
            | R8G8_SINT_TO_FLOAT
            | R16G16_UNORM | R16G16_UINT | R16G16_UINT_TO_FLOAT | R16G16_SNORM | R16G16_SINT
            | R16G16_SINT_TO_FLOAT | R16G16_FLOAT
            | R32G32_UINT | R32G32_SINT | R32G32_FLOAT => 2,

            R10G11B11_FLOAT | R32G32B32_UINT | R32G32B32_SINT | R32G32B32_FLOAT => 3,

            _ => 4,
        }
    }

    /// Whether all components share one 32-bit word (10/11-bit packings)
    pub fn is_packed(self) -> bool {
        use VertexFormat::*;
        matches!(
            self,
            R10G11B11_FLOAT | R10G10B10A2_UNORM | R10G10B10A2_UINT | R10G10B10A2_SNORM
                | R10G10B10A2_SINT
        )
    }

    /// Bytes per component, `None` for packed formats
    pub fn component_byte_size(self) -> Option<u32> {
        use VertexFormat::*;
        match self {
            R8_UNORM | R8G8_UNORM | R8G8B8A8_UNORM
            | R8_UINT | R8G8_UINT | R8G8B8A8_UINT
            | R8_UINT_TO_FLOAT | R8G8_UINT_TO_FLOAT | R8G8B8A8_UINT_TO_FLOAT
            | R8_SNORM | R8G8_SNORM | R8G8B8A8_SNORM
            | R8_SINT | R8G8_SINT | R8G8B8A8_SINT
            | R8_SINT_TO_FLOAT | R8G8_SINT_TO_FLOAT | R8G8B8A8_SINT_TO_FLOAT => Some(1),

            R10G11B11_FLOAT
            | R10G10B10A2_UNORM | R10G10B10A2_UINT | R10G10B10A2_SNORM | R10G10B10A2_SINT => None,

            R16_UNORM | R16G16_UNORM | R16G16B16A16_UNORM
            | R16_UINT | R16G16_UINT | R16G16B16A16_UINT
            | R16_UINT_TO_FLOAT | R16G16_UINT_TO_FLOAT | R16G16B16A16_UINT_TO_FLOAT
            | R16_SNORM | R16G16_SNORM | R16G16B16A16_SNORM
            | R16_SINT | R16G16_SINT | R16G16B16A16_SINT
            | R16_SINT_TO_FLOAT | R16G16_SINT_TO_FLOAT | R16G16B16A16_SINT_TO_FLOAT
            | R16_FLOAT | R16G16_FLOAT | R16G16B16A16_FLOAT => Some(2),

            _ => Some(4),
        }
    }

    /// Bytes one attribute occupies in the vertex
    pub fn byte_size(self) -> u32 {
        match self.component_byte_size() {
            Some(size) => size * self.component_count(),
            None => 4,
        }
    }

    pub fn kind(self) -> VertexComponentKind {
        use VertexFormat::*;
        match self {
            R8_UNORM | R8G8_UNORM | R8G8B8A8_UNORM
            | R10G10B10A2_UNORM
            | R16_UNORM | R16G16_UNORM | R16G16B16A16_UNORM => VertexComponentKind::Unorm,

            R8_UINT | R8G8_UINT | R8G8B8A8_UINT
            | R10G10B10A2_UINT
            | R16_UINT | R16G16_UINT | R16G16B16A16_UINT
            | R32_UINT | R32G32_UINT | R32G32B32_UINT | R32G32B32A32_UINT => VertexComponentKind::Uint,

            R8_UINT_TO_FLOAT | R8G8_UINT_TO_FLOAT | R8G8B8A8_UINT_TO_FLOAT
            | R16_UINT_TO_FLOAT | R16G16_UINT_TO_FLOAT
            | R16G16B16A16_UINT_TO_FLOAT => VertexComponentKind::UintToFloat,

            R8_SNORM | R8G8_SNORM | R8G8B8A8_SNORM
            | R10G10B10A2_SNORM
            | R16_SNORM | R16G16_SNORM | R16G16B16A16_SNORM => VertexComponentKind::Snorm,

            R8_SINT | R8G8_SINT | R8G8B8A8_SINT
            | R10G10B10A2_SINT
            | R16_SINT | R16G16_SINT | R16G16B16A16_SINT
            | R32_SINT | R32G32_SINT | R32G32B32_SINT | R32G32B32A32_SINT => VertexComponentKind::Sint,

            R8_SINT_TO_FLOAT | R8G8_SINT_TO_FLOAT | R8G8B8A8_SINT_TO_FLOAT
            | R16_SINT_TO_FLOAT | R16G16_SINT_TO_FLOAT
            | R16G16B16A16_SINT_TO_FLOAT => VertexComponentKind::SintToFloat,

            R10G11B11_FLOAT
            | R16_FLOAT | R16G16_FLOAT | R16G16B16A16_FLOAT
            | R32_FLOAT | R32G32_FLOAT | R32G32B32_FLOAT | R32G32B32A32_FLOAT => VertexComponentKind::Float,
        }
    }
}

/// One vertex attribute: shader location, format and byte offset within the vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexStream {
    location: u32,
    format: VertexFormat,
    offset: u32,
}

impl VertexStream {
    pub fn new(location: u32, format: VertexFormat, offset: u32) -> Self {
        Self { location, format, offset }
    }

    pub fn set_layout(&mut self, location: u32, format: VertexFormat, offset: u32) {
        self.location = location;
        self.format = format;
        self.offset = offset;
    }

    pub fn location(&self) -> u32 {
        self.location
    }

    pub fn format(&self) -> VertexFormat {
        self.format
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

#[cfg(test)]
#[path = "vertex_stream_tests.rs"]
mod tests;
