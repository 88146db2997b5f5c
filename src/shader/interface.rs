use naga::{Binding, BuiltIn, EntryPoint, Module, ScalarKind, ShaderStage, TypeInner, VectorSize};

use crate::model::VertexLayout;

/// One `@location` slot of an entry point's inputs or outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct IoSlot {
    pub name: String,
    pub location: u32,
    pub ty: TypeInner,
}

pub fn entry_point<'a>(module: &'a Module, stage: ShaderStage, name: &str) -> Option<&'a EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
}

pub fn inputs(module: &Module, ep: &EntryPoint) -> Vec<IoSlot> {
    let mut slots = Vec::new();
    for arg in &ep.function.arguments {
        let name = arg.name.clone().unwrap_or_default();
        collect_slots(module, &name, arg.ty, arg.binding.as_ref(), &mut slots);
    }
    slots.sort_by_key(|s| s.location);
    slots
}

pub fn outputs(module: &Module, ep: &EntryPoint) -> Vec<IoSlot> {
    let mut slots = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_slots(module, "", result.ty, result.binding.as_ref(), &mut slots);
    }
    slots.sort_by_key(|s| s.location);
    slots
}

pub fn writes_position(module: &Module, ep: &EntryPoint) -> bool {
    let Some(result) = &ep.function.result else {
        return false;
    };
    let is_position = |binding: Option<&Binding>| {
        matches!(binding, Some(Binding::BuiltIn(BuiltIn::Position { .. })))
    };

    if is_position(result.binding.as_ref()) {
        return true;
    }
    match &module.types[result.ty].inner {
        TypeInner::Struct { members, .. } => members.iter().any(|m| is_position(m.binding.as_ref())),
        _ => false,
    }
}

fn collect_slots(
    module: &Module,
    name: &str,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<IoSlot>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(IoSlot {
            name: name.to_string(),
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    let member_name = member.name.clone().unwrap_or_default();
                    collect_slots(module, &member_name, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Shader type a vertex attribute of `format` is read as.
pub fn attribute_type(format: wgpu::VertexFormat) -> Option<TypeInner> {
    use wgpu::VertexFormat as F;

    let (kind, size) = match format {
        F::Float32 => (ScalarKind::Float, None),
        F::Float32x2 => (ScalarKind::Float, Some(VectorSize::Bi)),
        F::Float32x3 => (ScalarKind::Float, Some(VectorSize::Tri)),
        F::Float32x4 => (ScalarKind::Float, Some(VectorSize::Quad)),
        F::Uint32 => (ScalarKind::Uint, None),
        F::Uint32x2 => (ScalarKind::Uint, Some(VectorSize::Bi)),
        F::Uint32x3 => (ScalarKind::Uint, Some(VectorSize::Tri)),
        F::Uint32x4 => (ScalarKind::Uint, Some(VectorSize::Quad)),
        F::Sint32 => (ScalarKind::Sint, None),
        F::Sint32x2 => (ScalarKind::Sint, Some(VectorSize::Bi)),
        F::Sint32x3 => (ScalarKind::Sint, Some(VectorSize::Tri)),
        F::Sint32x4 => (ScalarKind::Sint, Some(VectorSize::Quad)),
        _ => return None,
    };

    let scalar = naga::Scalar { kind, width: 4 };
    Some(match size {
        None => TypeInner::Scalar(scalar),
        Some(size) => TypeInner::Vector { size, scalar },
    })
}

pub fn check_vertex_layout(inputs: &[IoSlot], layout: &VertexLayout) -> Result<(), String> {
    for input in inputs {
        let attribute = layout.attribute(input.location).ok_or_else(|| {
            format!(
                "input `{}` at location {} has no attribute in the buffer",
                input.name, input.location
            )
        })?;

        match attribute_type(attribute.format) {
            Some(ty) if ty == input.ty => {}
            Some(ty) => {
                return Err(format!(
                    "input `{}` at location {} is {:?} but the buffer provides {:?} ({:?})",
                    input.name, input.location, input.ty, ty, attribute.format
                ))
            }
            None => {
                return Err(format!(
                    "attribute format {:?} at location {} is not supported",
                    attribute.format, input.location
                ))
            }
        }
    }
    Ok(())
}
