use std::collections::BTreeMap;

use wgpu::naga;
use naga::{AddressSpace, Binding, TypeInner, VectorSize};

use crate::gpu::{ScalarClass, ShaderKind, UniformKind};

/// A named `@location` on a stage interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVar {
    pub name: String,
    pub location: u32,
    pub scalar: ScalarClass,
}

/// A `var<uniform>` declared in bind group 0.
///
/// `kind` is `None` when the declared type is not one the binder can drive
/// (anything other than `vec2<f32>` / `vec4<f32>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub binding: u32,
    pub kind: Option<UniformKind>,
    /// Byte size of the declared type.
    pub size: u32,
}

/// Interface of one successfully compiled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReflection {
    pub kind: ShaderKind,
    pub entry_point: String,
    pub inputs: Vec<InterfaceVar>,
    pub outputs: Vec<InterfaceVar>,
    pub uniforms: Vec<UniformDecl>,
}

/// Interface of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramReflection {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Vertex stage inputs (attributes).
    pub attributes: Vec<InterfaceVar>,
    /// Uniforms of both stages, sorted by binding.
    pub uniforms: Vec<UniformDecl>,
}

impl ProgramReflection {
    pub fn attribute(&self, name: &str) -> Option<&InterfaceVar> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the uniform's index in `uniforms` along with its declaration.
    pub fn uniform(&self, name: &str) -> Option<(u32, &UniformDecl)> {
        self.uniforms
            .iter()
            .enumerate()
            .find(|(_, u)| u.name == name)
            .map(|(i, u)| (i as u32, u))
    }
}

/// Parses, validates and reflects one WGSL stage.
///
/// The error string is the diagnostic log (rendered with source spans where
/// naga provides them).
pub(crate) fn reflect_stage(kind: ShaderKind, source: &str) -> Result<StageReflection, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match kind {
        ShaderKind::Vertex => naga::ShaderStage::Vertex,
        ShaderKind::Fragment => naga::ShaderStage::Fragment,
    };
    let mut entries = module.entry_points.iter().filter(|ep| ep.stage == wanted);
    let entry = entries
        .next()
        .ok_or_else(|| format!("no @{kind} entry point found in {kind} shader source"))?;
    if let Some(extra) = entries.next() {
        log::warn!(
            "{kind} shader declares several entry points; using `{}`, ignoring `{}`",
            entry.name,
            extra.name
        );
    }

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut uniforms = Vec::new();
    for (_, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };
        let name = var
            .name
            .clone()
            .unwrap_or_else(|| format!("<binding {}>", rb.binding));

        if !matches!(var.space, AddressSpace::Uniform) {
            return Err(format!(
                "`{name}` (group {}, binding {}) is not a uniform buffer; only uniform buffers can be bound",
                rb.group, rb.binding
            ));
        }
        if rb.group != 0 {
            return Err(format!(
                "uniform `{name}` lives in bind group {}; only group 0 is supported",
                rb.group
            ));
        }

        let inner = &module.types[var.ty].inner;
        uniforms.push(UniformDecl {
            name,
            binding: rb.binding,
            kind: uniform_kind(inner),
            size: inner.size(module.to_ctx()),
        });
    }

    Ok(StageReflection {
        kind,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniforms,
    })
}

/// Checks a vertex and a fragment interface against each other.
pub(crate) fn link_stages(
    vertex: &StageReflection,
    fragment: &StageReflection,
) -> Result<ProgramReflection, String> {
    if vertex.kind != ShaderKind::Vertex || fragment.kind != ShaderKind::Fragment {
        return Err(format!(
            "a program needs one vertex and one fragment stage, got {} and {}",
            vertex.kind, fragment.kind
        ));
    }

    for input in &fragment.inputs {
        if !vertex.outputs.iter().any(|o| o.location == input.location) {
            return Err(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            ));
        }
    }

    let mut by_binding: BTreeMap<u32, UniformDecl> = BTreeMap::new();
    for decl in vertex.uniforms.iter().chain(&fragment.uniforms) {
        match by_binding.get(&decl.binding) {
            None => {
                if let Some(other) = by_binding.values().find(|u| u.name == decl.name) {
                    return Err(format!(
                        "uniform `{}` is declared at bindings {} and {}",
                        decl.name, other.binding, decl.binding
                    ));
                }
                by_binding.insert(decl.binding, decl.clone());
            }
            Some(existing) if existing == decl => {}
            Some(existing) => {
                return Err(format!(
                    "binding {} is `{}` in the vertex stage but `{}` in the fragment stage",
                    decl.binding, existing.name, decl.name
                ));
            }
        }
    }

    Ok(ProgramReflection {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.entry_point.clone(),
        attributes: vertex.inputs.clone(),
        uniforms: by_binding.into_values().collect(),
    })
}

fn collect_locations(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            scalar: scalar_class(&module.types[ty].inner),
        }),
        Some(_) => {} // builtins
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn scalar_class(inner: &TypeInner) -> ScalarClass {
    let scalar = match *inner {
        TypeInner::Scalar(scalar) | TypeInner::Vector { scalar, .. } => scalar,
        _ => return ScalarClass::Other,
    };
    match scalar.kind {
        naga::ScalarKind::Float => ScalarClass::Float,
        naga::ScalarKind::Uint => ScalarClass::Uint,
        naga::ScalarKind::Sint => ScalarClass::Sint,
        _ => ScalarClass::Other,
    }
}

fn uniform_kind(inner: &TypeInner) -> Option<UniformKind> {
    match *inner {
        TypeInner::Vector { size: VectorSize::Bi, scalar } if scalar == naga::Scalar::F32 => {
            Some(UniformKind::Vec2)
        }
        TypeInner::Vector { size: VectorSize::Quad, scalar } if scalar == naga::Scalar::F32 => {
            Some(UniformKind::Vec4)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
        @group(0) @binding(0) var<uniform> u_resolution: vec2<f32>;

        struct VertexOut {
            @builtin(position) position: vec4<f32>,
            @location(0) color: vec4<f32>,
        };

        @vertex
        fn vs_main(@location(0) a_position: vec2<f32>, @location(1) a_color: vec4<f32>) -> VertexOut {
            var out: VertexOut;
            out.position = vec4<f32>(a_position / u_resolution, 0.0, 1.0);
            out.color = a_color;
            return out;
        }
    "#;

    const FS: &str = r#"
        @group(0) @binding(1) var<uniform> u_tint: vec4<f32>;

        @fragment
        fn fs_main(@location(0) v_color: vec4<f32>) -> @location(0) vec4<f32> {
            return v_color * u_tint;
        }
    "#;

    #[test]
    fn vertex_inputs_are_reflected_by_name() {
        let r = reflect_stage(ShaderKind::Vertex, VS).unwrap();
        assert_eq!(r.entry_point, "vs_main");
        assert_eq!(
            r.inputs,
            vec![
                InterfaceVar { name: "a_position".into(), location: 0, scalar: ScalarClass::Float },
                InterfaceVar { name: "a_color".into(), location: 1, scalar: ScalarClass::Float },
            ]
        );
        assert_eq!(r.outputs, vec![InterfaceVar { name: "color".into(), location: 0, scalar: ScalarClass::Float }]);
        assert_eq!(
            r.uniforms,
            vec![UniformDecl { name: "u_resolution".into(), binding: 0, kind: Some(UniformKind::Vec2), size: 8 }]
        );
    }

    #[test]
    fn syntax_error_produces_a_log() {
        let err = reflect_stage(ShaderKind::Vertex, "@vertex fn vs_main( -> {").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn wrong_stage_has_no_entry_point() {
        let err = reflect_stage(ShaderKind::Vertex, FS).unwrap_err();
        assert!(err.contains("no @vertex entry point"), "{err}");
    }

    #[test]
    fn uniforms_outside_group_zero_are_rejected() {
        let src = r#"
            @group(1) @binding(0) var<uniform> u_offset: vec2<f32>;
            @vertex
            fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p + u_offset, 0.0, 1.0);
            }
        "#;
        let err = reflect_stage(ShaderKind::Vertex, src).unwrap_err();
        assert!(err.contains("group 1"), "{err}");
    }

    #[test]
    fn unsupported_uniform_type_has_no_kind() {
        let src = r#"
            @group(0) @binding(0) var<uniform> u_scale: f32;
            @vertex
            fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p * u_scale, 0.0, 1.0);
            }
        "#;
        let r = reflect_stage(ShaderKind::Vertex, src).unwrap();
        assert_eq!(r.uniforms[0].kind, None);
    }

    #[test]
    fn integer_inputs_keep_their_scalar_family() {
        let src = r#"
            @vertex
            fn vs_main(@location(0) p: vec2<f32>, @location(1) id: vec4<u32>, @location(2) k: i32) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p + vec2<f32>(f32(id.x), f32(k)), 0.0, 1.0);
            }
        "#;
        let r = reflect_stage(ShaderKind::Vertex, src).unwrap();
        let scalars: Vec<ScalarClass> = r.inputs.iter().map(|i| i.scalar).collect();
        assert_eq!(scalars, [ScalarClass::Float, ScalarClass::Uint, ScalarClass::Sint]);
    }

    #[test]
    fn link_merges_uniforms_of_both_stages() {
        let vs = reflect_stage(ShaderKind::Vertex, VS).unwrap();
        let fs = reflect_stage(ShaderKind::Fragment, FS).unwrap();
        let p = link_stages(&vs, &fs).unwrap();

        assert_eq!(p.attribute("a_color").map(|a| a.location), Some(1));
        assert_eq!(p.uniform("u_tint").map(|(i, _)| i), Some(1));
        assert_eq!(p.uniform("u_resolution").map(|(i, _)| i), Some(0));
        assert!(p.uniform("u_missing").is_none());
    }

    #[test]
    fn link_rejects_unwritten_fragment_inputs() {
        let vs_src = r#"
            @vertex
            fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p, 0.0, 1.0);
            }
        "#;
        let vs = reflect_stage(ShaderKind::Vertex, vs_src).unwrap();
        let fs = reflect_stage(ShaderKind::Fragment, FS).unwrap();
        let err = link_stages(&vs, &fs).unwrap_err();
        assert!(err.contains("v_color"), "{err}");
    }

    #[test]
    fn link_rejects_conflicting_bindings() {
        let fs_src = r#"
            @group(0) @binding(0) var<uniform> u_color: vec4<f32>;
            @fragment
            fn fs_main(@location(0) v_color: vec4<f32>) -> @location(0) vec4<f32> {
                return v_color * u_color;
            }
        "#;
        let vs = reflect_stage(ShaderKind::Vertex, VS).unwrap();
        let fs = reflect_stage(ShaderKind::Fragment, fs_src).unwrap();
        let err = link_stages(&vs, &fs).unwrap_err();
        assert!(err.contains("binding 0"), "{err}");
    }
}
