use crate::generator::GeneratorConfig;
use crate::model::{Lifetime, MemberKind};
use crate::registry::ServiceEntry;
use crate::synth::{Initializer, SynthInterface};
use serde::Serialize;
use std::fmt::Write;

/// A named generated source unit, handed to the surrounding build's code
/// sink. Names are namespace-qualified so same-named types in different
/// namespaces never collide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceUnit {
    pub name: String,
    pub contents: String,
}

fn type_display(name: &str, generics: &[String]) -> String {
    if generics.is_empty() {
        name.to_string()
    } else {
        format!("{}<{}>", name, generics.join(", "))
    }
}

/// Render one synthesized initializer as a partial-class unit.
pub fn emit_initializer(init: &Initializer, config: &GeneratorConfig) -> SourceUnit {
    let hook = &config.completion_hook;
    let class_display = type_display(&init.type_name, &init.generics);
    let params: Vec<String> = init
        .params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect();

    let mut body = String::new();
    writeln!(body, "namespace {}", init.namespace).unwrap();
    writeln!(body, "{{").unwrap();
    writeln!(body, "    public partial class {class_display}").unwrap();
    writeln!(body, "    {{").unwrap();
    write!(body, "        public {}({})", init.type_name, params.join(", ")).unwrap();
    if init.chains_base() {
        let forwarded: Vec<&str> = init.base_params().iter().map(|p| p.name.as_str()).collect();
        write!(body, "\n            : base({})", forwarded.join(", ")).unwrap();
    }
    writeln!(body).unwrap();
    writeln!(body, "        {{").unwrap();
    for param in init.own_params() {
        writeln!(body, "            this.{} = {};", param.name, param.name).unwrap();
    }
    writeln!(body, "            {hook}();").unwrap();
    writeln!(body, "        }}").unwrap();
    writeln!(body).unwrap();
    writeln!(body, "        partial void {hook}();").unwrap();
    writeln!(body, "    }}").unwrap();
    writeln!(body, "}}").unwrap();

    SourceUnit {
        name: format!("{}.{}.Init.g", init.namespace, init.type_name),
        contents: body,
    }
}

/// Render one synthesized interface unit: properties, then methods, then
/// events, in declaration order within each group.
pub fn emit_interface(iface: &SynthInterface) -> SourceUnit {
    let mut header = format!("public interface {}", type_display(&iface.name, &iface.generics));
    if !iface.parents.is_empty() {
        let parents: Vec<String> = iface.parents.iter().map(|p| p.to_string()).collect();
        write!(header, " : {}", parents.join(", ")).unwrap();
    }

    let mut lines: Vec<String> = Vec::new();
    for member in &iface.members {
        if member.kind == MemberKind::Property {
            lines.push(format!("{} {} {{ get; }}", member.ty, member.name));
        }
    }
    for member in &iface.members {
        if matches!(member.kind, MemberKind::Method { .. }) {
            lines.push(format!("{};", member.signature()));
        }
    }
    for member in &iface.members {
        if member.kind == MemberKind::Event {
            lines.push(format!("event {} {};", member.ty, member.name));
        }
    }

    let mut body = String::new();
    writeln!(body, "namespace {}", iface.namespace).unwrap();
    writeln!(body, "{{").unwrap();
    writeln!(body, "    {header}").unwrap();
    writeln!(body, "    {{").unwrap();
    for line in &lines {
        writeln!(body, "        {line}").unwrap();
    }
    writeln!(body, "    }}").unwrap();
    writeln!(body, "}}").unwrap();

    SourceUnit {
        name: format!("{}.{}.g", iface.namespace, iface.name),
        contents: body,
    }
}

fn registration_call(entry: &ServiceEntry) -> String {
    let method = match entry.lifetime {
        Lifetime::Transient => "AddTransient",
        Lifetime::Scoped => "AddScoped",
        Lifetime::Singleton => "AddSingleton",
    };
    if entry.open_generic {
        format!(
            ".{method}(typeof({}), typeof({}))",
            entry.service.unbound(),
            entry.implementation.unbound()
        )
    } else {
        format!(".{method}<{}, {}>()", entry.service, entry.implementation)
    }
}

/// Render the registration tables, one unit per consuming namespace, in
/// first-appearance order. A malformed entry is skipped and reported
/// rather than poisoning its whole unit.
pub fn emit_registrations(entries: &[ServiceEntry]) -> Vec<SourceUnit> {
    let mut namespaces: Vec<&str> = Vec::new();
    for entry in entries {
        let ns = namespace_of(entry);
        if !namespaces.contains(&ns) {
            namespaces.push(ns);
        }
    }

    let mut units = Vec::new();
    for ns in namespaces {
        let mut calls: Vec<String> = Vec::new();
        for entry in entries.iter().filter(|e| namespace_of(e) == ns) {
            if entry.service.name.is_empty() || entry.implementation.name.is_empty() {
                tracing::warn!(
                    implementation = %entry.implementation_name,
                    "skipping malformed registration entry"
                );
                continue;
            }
            calls.push(registration_call(entry));
        }

        let mut body = String::new();
        writeln!(body, "namespace {ns}").unwrap();
        writeln!(body, "{{").unwrap();
        writeln!(body, "    public static class ServiceRegistrations").unwrap();
        writeln!(body, "    {{").unwrap();
        write!(
            body,
            "        public static IServiceCollection AddGenerated(this IServiceCollection services) => services"
        )
        .unwrap();
        for call in &calls {
            write!(body, "\n            {call}").unwrap();
        }
        writeln!(body, ";").unwrap();
        writeln!(body, "    }}").unwrap();
        writeln!(body, "}}").unwrap();

        units.push(SourceUnit {
            name: format!("{ns}.ServiceRegistrations.g"),
            contents: body,
        });
    }
    units
}

fn namespace_of(entry: &ServiceEntry) -> &str {
    entry
        .implementation
        .namespace
        .as_deref()
        .unwrap_or("Generated")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Span, TypeRef};
    use crate::synth::CtorParam;

    fn param(name: &str, ty: &str) -> CtorParam {
        CtorParam {
            name: name.into(),
            ty: TypeRef::named(ty),
            contextual: false,
        }
    }

    #[test]
    fn initializer_assigns_own_and_forwards_base() {
        let init = Initializer {
            namespace: "Demo".into(),
            type_name: "E".into(),
            generics: vec![],
            params: vec![param("g", "G"), param("f", "F"), param("b", "B")],
            own: 1,
        };
        let unit = emit_initializer(&init, &GeneratorConfig::default());
        assert_eq!(unit.name, "Demo.E.Init.g");
        assert!(unit.contents.contains("public E(G g, F f, B b)"));
        assert!(unit.contents.contains(": base(f, b)"));
        assert!(unit.contents.contains("this.g = g;"));
        assert!(!unit.contents.contains("this.f"));
        assert!(unit.contents.contains("OnActivated();"));
        assert!(unit.contents.contains("partial void OnActivated();"));
    }

    #[test]
    fn zero_dependency_initializers_still_call_the_hook() {
        let init = Initializer {
            namespace: "Demo".into(),
            type_name: "B".into(),
            generics: vec![],
            params: vec![],
            own: 0,
        };
        let unit = emit_initializer(&init, &GeneratorConfig::default());
        assert!(unit.contents.contains("public B()"));
        assert!(!unit.contents.contains(": base("));
        assert!(unit.contents.contains("OnActivated();"));
    }

    #[test]
    fn registration_unit_chains_one_call_per_entry() {
        let entry = |service: &str, lifetime| ServiceEntry {
            service: TypeRef::named(service),
            implementation: TypeRef::qualified("Demo", "A"),
            implementation_name: "Demo.A".into(),
            lifetime,
            open_generic: false,
            span: Span::new("test.src", 1, 1),
        };
        let units = emit_registrations(&[
            entry("A", Lifetime::Transient),
            entry("IA", Lifetime::Transient),
        ]);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "Demo.ServiceRegistrations.g");
        assert!(units[0].contents.contains(".AddTransient<A, Demo.A>()"));
        assert!(units[0].contents.contains(".AddTransient<IA, Demo.A>()"));
    }

    #[test]
    fn open_generic_entries_use_unbound_syntax() {
        let service = TypeRef::qualified("Demo", "Repo").with_args(vec![TypeRef::named("T")]);
        let units = emit_registrations(&[ServiceEntry {
            service: service.clone(),
            implementation: service,
            implementation_name: "Demo.Repo".into(),
            lifetime: Lifetime::Singleton,
            open_generic: true,
            span: Span::new("test.src", 1, 1),
        }]);
        assert!(units[0]
            .contents
            .contains(".AddSingleton(typeof(Demo.Repo<>), typeof(Demo.Repo<>))"));
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let units = emit_registrations(&[
            ServiceEntry {
                service: TypeRef::named(""),
                implementation: TypeRef::qualified("Demo", "A"),
                implementation_name: "Demo.A".into(),
                lifetime: Lifetime::Scoped,
                open_generic: false,
                span: Span::new("test.src", 1, 1),
            },
            ServiceEntry {
                service: TypeRef::named("B"),
                implementation: TypeRef::qualified("Demo", "B"),
                implementation_name: "Demo.B".into(),
                lifetime: Lifetime::Scoped,
                open_generic: false,
                span: Span::new("test.src", 2, 1),
            },
        ]);
        assert_eq!(units.len(), 1);
        assert!(!units[0].contents.contains("<, "));
        assert!(units[0].contents.contains(".AddScoped<B, Demo.B>()"));
    }

    #[test]
    fn namespaces_emit_separate_units_in_first_appearance_order() {
        let entry = |ns: &str, name: &str| ServiceEntry {
            service: TypeRef::qualified(ns, name),
            implementation: TypeRef::qualified(ns, name),
            implementation_name: format!("{ns}.{name}"),
            lifetime: Lifetime::Transient,
            open_generic: false,
            span: Span::new("test.src", 1, 1),
        };
        let units = emit_registrations(&[
            entry("Beta", "A"),
            entry("Alpha", "B"),
            entry("Beta", "C"),
        ]);
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Beta.ServiceRegistrations.g",
                "Alpha.ServiceRegistrations.g"
            ]
        );
        assert!(units[0].contents.contains("Beta.A"));
        assert!(units[0].contents.contains("Beta.C"));
    }
}
