//! WGSL compilation and program linking.
//!
//! Each stage is parsed and validated on its own with naga. Linking then
//! checks the stage interfaces against each other and against the vertex
//! buffer layout the program will be fed with, so a mismatch is reported
//! by name before any GPU object exists.

mod interface;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{ShaderError, StageKind};
use crate::model::{ChairVertex, MarkerVertex, VertexLayout};

pub use interface::IoSlot;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Vertex and fragment WGSL text of one program, plus the vertex layout
/// its buffers use.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource {
    pub label: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub layout: VertexLayout,
}

pub const CHAIR: ProgramSource = ProgramSource {
    label: "Chair",
    vertex: include_str!("../shaders/chair.vert.wgsl"),
    fragment: include_str!("../shaders/chair.frag.wgsl"),
    layout: ChairVertex::LAYOUT,
};

pub const KEY_LIGHT: ProgramSource = ProgramSource {
    label: "Key Light",
    vertex: include_str!("../shaders/marker.vert.wgsl"),
    fragment: include_str!("../shaders/key_light.frag.wgsl"),
    layout: MarkerVertex::LAYOUT,
};

pub const FILL_LIGHT: ProgramSource = ProgramSource {
    label: "Fill Light",
    vertex: include_str!("../shaders/marker.vert.wgsl"),
    fragment: include_str!("../shaders/fill_light.frag.wgsl"),
    layout: MarkerVertex::LAYOUT,
};

/// A stage that parsed and validated.
#[derive(Debug)]
pub struct CompiledStage {
    pub label: String,
    pub stage: StageKind,
    pub source: String,
    pub module: naga::Module,
}

/// Both stages of a program whose interfaces agree.
#[derive(Debug)]
pub struct LinkedProgram {
    pub label: String,
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
    pub layout: VertexLayout,
}

impl ProgramSource {
    pub fn compile_and_link(&self) -> Result<LinkedProgram, ShaderError> {
        let vertex = compile_stage(self.label, StageKind::Vertex, self.vertex)?;
        let fragment = compile_stage(self.label, StageKind::Fragment, self.fragment)?;
        link(self.label, vertex, fragment, self.layout)
    }
}

pub fn compile_stage(
    label: &str,
    stage: StageKind,
    source: &str,
) -> Result<CompiledStage, ShaderError> {
    let compile_error = |log: String| ShaderError::Compile {
        label: label.to_string(),
        stage,
        log,
    };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    log::debug!("Compiled {} stage of '{}'", stage, label);

    Ok(CompiledStage {
        label: label.to_string(),
        stage,
        source: source.to_string(),
        module,
    })
}

pub fn link(
    label: &str,
    vertex: CompiledStage,
    fragment: CompiledStage,
    layout: VertexLayout,
) -> Result<LinkedProgram, ShaderError> {
    let link_error = |reason: String| ShaderError::Link {
        label: label.to_string(),
        reason,
    };

    let vs = interface::entry_point(&vertex.module, naga::ShaderStage::Vertex, VERTEX_ENTRY)
        .ok_or_else(|| link_error(format!("vertex stage has no `{}` entry point", VERTEX_ENTRY)))?;
    let fs = interface::entry_point(&fragment.module, naga::ShaderStage::Fragment, FRAGMENT_ENTRY)
        .ok_or_else(|| {
            link_error(format!("fragment stage has no `{}` entry point", FRAGMENT_ENTRY))
        })?;

    let vertex_inputs = interface::inputs(&vertex.module, vs);
    let varyings = interface::outputs(&vertex.module, vs);
    let fragment_inputs = interface::inputs(&fragment.module, fs);

    if !interface::writes_position(&vertex.module, vs) {
        return Err(link_error(
            "vertex stage does not write @builtin(position)".to_string(),
        ));
    }

    for input in &fragment_inputs {
        match varyings.iter().find(|out| out.location == input.location) {
            None => {
                return Err(link_error(format!(
                    "fragment input `{}` at location {} is not written by the vertex stage",
                    input.name, input.location
                )))
            }
            Some(out) if out.ty != input.ty => {
                return Err(link_error(format!(
                    "location {}: vertex stage writes {:?} but fragment stage reads {:?}",
                    input.location, out.ty, input.ty
                )))
            }
            Some(_) => {}
        }
    }

    interface::check_vertex_layout(&vertex_inputs, &layout).map_err(|reason| {
        ShaderError::LayoutMismatch {
            label: label.to_string(),
            layout: layout.label.to_string(),
            reason,
        }
    })?;

    log::debug!(
        "Linked '{}' ({} vertex inputs, {} varyings)",
        label,
        vertex_inputs.len(),
        varyings.len()
    );

    Ok(LinkedProgram {
        label: label.to_string(),
        vertex,
        fragment,
        layout,
    })
}
