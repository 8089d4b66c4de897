//! Draw-call descriptors passed to the device

/// How vertices are assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleFan,
    TriangleStrip,
    LinesAdjacency,
    LineStripAdjacency,
    TrianglesAdjacency,
    TriangleStripAdjacency,
}

/// Width of one index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    pub fn byte_size(self) -> u32 {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Index data of an indexed draw, borrowed from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indices<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl<'a> Indices<'a> {
    pub fn format(&self) -> IndexFormat {
        match self {
            Indices::U16(_) => IndexFormat::U16,
            Indices::U32(_) => IndexFormat::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::U16(indices) => indices.len(),
            Indices::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `count` indices, `None` if there are fewer
    pub fn first(self, count: usize) -> Option<Indices<'a>> {
        match self {
            Indices::U16(indices) => indices.get(..count).map(Indices::U16),
            Indices::U32(indices) => indices.get(..count).map(Indices::U32),
        }
    }

    /// Index bytes in big-endian (GX2 CPU) or little-endian order
    pub fn to_bytes(&self, big_endian: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len() * self.format().byte_size() as usize);
        match (self, big_endian) {
            (Indices::U16(indices), true) => indices.iter().for_each(|i| bytes.extend_from_slice(&i.to_be_bytes())),
            (Indices::U16(indices), false) => indices.iter().for_each(|i| bytes.extend_from_slice(&i.to_le_bytes())),
            (Indices::U32(indices), true) => indices.iter().for_each(|i| bytes.extend_from_slice(&i.to_be_bytes())),
            (Indices::U32(indices), false) => indices.iter().for_each(|i| bytes.extend_from_slice(&i.to_le_bytes())),
        }
        bytes
    }
}

impl<'a> From<&'a [u16]> for Indices<'a> {
    fn from(indices: &'a [u16]) -> Self {
        Indices::U16(indices)
    }
}

impl<'a> From<&'a [u32]> for Indices<'a> {
    fn from(indices: &'a [u32]) -> Self {
        Indices::U32(indices)
    }
}
