/// Declarative description of one vertex buffer.
///
/// The same descriptor drives buffer setup (`buffer_layout`) and the
/// program linker, which checks every `@location` input of a vertex stage
/// against it before a pipeline is built.
#[derive(Debug, Clone, Copy)]
pub struct VertexLayout {
    pub label: &'static str,
    pub stride: wgpu::BufferAddress,
    pub attributes: &'static [wgpu::VertexAttribute],
}

impl VertexLayout {
    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: self.attributes,
        }
    }

    pub fn attribute(&self, location: u32) -> Option<&wgpu::VertexAttribute> {
        self.attributes.iter().find(|a| a.shader_location == location)
    }
}

/// Interleaved chair vertex: 8 floats.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ChairVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl ChairVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x3,  // normal
        2 => Float32x2,  // tex_coords
    ];

    pub const LAYOUT: VertexLayout = VertexLayout {
        label: "ChairVertex",
        stride: std::mem::size_of::<ChairVertex>() as wgpu::BufferAddress,
        attributes: &Self::ATTRIBUTES,
    };
}

/// Light marker vertex: position only.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerVertex {
    pub position: [f32; 3],
}

impl MarkerVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
    ];

    pub const LAYOUT: VertexLayout = VertexLayout {
        label: "MarkerVertex",
        stride: std::mem::size_of::<MarkerVertex>() as wgpu::BufferAddress,
        attributes: &Self::ATTRIBUTES,
    };
}
