use crate::collect::collect_dependencies;
use crate::diagnostics::Diagnostic;
use crate::emit::{emit_initializer, emit_interface, emit_registrations, SourceUnit};
use crate::model::{DeclarationSet, TypeDecl};
use crate::registry::{build_registry, ServiceEntry};
use crate::synth::{synthesize_initializer, synthesize_interface, Initializer, SynthInterface};
use crate::validate::validate;
use rayon::prelude::*;

/// Knobs for one generation pass.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Simple name of the contextual marker type whose parameters are
    /// specialized with the constructed type as generic argument.
    pub contextual_type: String,
    /// Name of the zero-argument completion hook invoked at the end of
    /// every synthesized initializer.
    pub completion_hook: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            contextual_type: "Logger".to_string(),
            completion_hook: "OnActivated".to_string(),
        }
    }
}

/// Everything one pass produces: generated units for the code sink,
/// structured diagnostics for the build, and the service registry the
/// table was emitted from.
#[derive(Debug)]
pub struct GenerationOutput {
    pub units: Vec<SourceUnit>,
    pub diagnostics: Vec<Diagnostic>,
    pub entries: Vec<ServiceEntry>,
}

/// The whole-program generation pass.
///
/// Each stage is a pure function of the immutable declaration set, so
/// per-type synthesis fans out over rayon; ordered collection keeps the
/// output byte-identical to a serial run. Validation only runs once the
/// graph is complete for all types.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, set: &DeclarationSet) -> GenerationOutput {
        tracing::debug!(declarations = set.len(), "starting generation pass");
        let links = set.auto_interfaces();
        let collected = collect_dependencies(set);

        let initializers: Vec<Initializer> = collected
            .par_iter()
            .map(|deps| synthesize_initializer(set, deps, &self.config))
            .collect();

        let linked: Vec<&TypeDecl> = set.iter().filter(|d| links.is_auto_interfaced(d)).collect();
        let interfaces: Vec<SynthInterface> = linked
            .par_iter()
            .map(|decl| synthesize_interface(set, &links, decl))
            .collect();

        let entries = build_registry(set, &links, &collected);
        let diagnostics = validate(set, &collected, &initializers, &entries);

        let mut units: Vec<SourceUnit> = initializers
            .iter()
            .map(|init| emit_initializer(init, &self.config))
            .collect();
        units.extend(interfaces.iter().map(emit_interface));
        units.extend(emit_registrations(&entries));

        tracing::debug!(
            units = units.len(),
            diagnostics = diagnostics.len(),
            "generation pass finished"
        );
        GenerationOutput {
            units,
            diagnostics,
            entries,
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberDecl, Span, TypeRef, DEPENDENCY_MARKER};

    fn span(line: u32) -> Span {
        Span::new("test.src", line, 1)
    }

    fn sample() -> Vec<TypeDecl> {
        vec![
            TypeDecl::class("Demo", "A", span(1))
                .annotated("Transient")
                .with_base(TypeRef::named("IA"))
                .with_member(
                    MemberDecl::field("b", TypeRef::named("B"), span(2))
                        .annotated(DEPENDENCY_MARKER),
                ),
            TypeDecl::class("Demo", "B", span(3)).annotated("Transient"),
        ]
    }

    #[test]
    fn unit_order_is_initializers_then_interfaces_then_registrations() {
        let set = DeclarationSet::new(sample()).unwrap();
        let output = Generator::default().run(&set);
        let names: Vec<&str> = output.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Demo.A.Init.g",
                "Demo.B.Init.g",
                "Demo.IA.g",
                "Demo.ServiceRegistrations.g"
            ]
        );
    }

    #[test]
    fn two_runs_over_identical_input_are_byte_identical() {
        let set = DeclarationSet::new(sample()).unwrap();
        let generator = Generator::default();
        let first = generator.run(&set);
        let second = generator.run(&set);
        assert_eq!(first.units, second.units);
        assert_eq!(first.diagnostics, second.diagnostics);
    }
}
