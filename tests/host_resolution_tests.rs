use scsc::codegen::{CallTarget, FieldHandle, Instr, Storage};
use scsc::common::types::{HostType, Type};
use scsc::{check, compile, compile_with_host, Config, HostRegistry};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn geometry_host() -> HostRegistry {
    let mut host = HostRegistry::new();
    let shapes = HostType::new("Geo.Shapes");
    host.add_type(shapes.clone());
    host.add_field(&shapes, "Unit", Type::Double);
    host.add_method(&shapes, "Area", vec![Type::Double], Type::Double);
    host.add_method(&shapes, "Area", vec![Type::Double, Type::Double], Type::Double);
    host
}

#[test]
fn qualified_host_method_call() {
    init_logger();
    let module = compile("{ double d; d = System.Math.Sqrt(2.0); }", &Config::default()).unwrap();
    let calls: Vec<_> = module
        .entry()
        .code
        .iter()
        .filter_map(|i| match i {
            Instr::Call(CallTarget::External(method)) => Some(method),
            _ => None,
        })
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].owner, "System.Math");
    assert_eq!(calls[0].name, "Sqrt");
}

#[test]
fn using_namespace_shortens_host_names() {
    init_logger();
    let source = "{ double d; d = Math.Max(1.0, Math.PI); }";
    assert!(check(source, &Config::default()).has_errors());

    let config = Config::default().with_using_namespace("System");
    let module = compile(source, &config).unwrap();
    let reads_pi = module.entry().code.iter().any(|i| {
        matches!(i, Instr::Read(Storage::Field(FieldHandle::Host { owner, name }))
            if owner == "System.Math" && name == "PI")
    });
    assert!(reads_pi);
}

#[test]
fn overload_picks_exact_match() {
    init_logger();
    let config = Config::default().with_using_namespace("System");
    let module = compile("{ Console.WriteLine(42); Console.WriteLine(\"hi\"); }", &config).unwrap();
    let params: Vec<Vec<Type>> = module
        .entry()
        .code
        .iter()
        .filter_map(|i| match i {
            Instr::Call(CallTarget::External(method)) => Some(method.params.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(params, vec![vec![Type::Int], vec![Type::String]]);
}

#[test]
fn no_applicable_overload_is_an_error() {
    init_logger();
    let config = Config::default().with_using_namespace("System");
    let diagnostics = check("{ Math.Sqrt(true); }", &config);
    assert_eq!(diagnostics.errors().count(), 1);
    let message = &diagnostics.errors().next().unwrap().message;
    assert!(message.contains("no overload of 'Math.Sqrt'"), "{}", message);
}

#[test]
fn custom_host_metadata() {
    init_logger();
    let source = "{ double a; a = Geo.Shapes.Area(Geo.Shapes.Unit, 2.0); }";
    let module = compile_with_host(source, &Config::default(), Box::new(geometry_host())).unwrap();
    let arity = module.entry().code.iter().find_map(|i| match i {
        Instr::Call(CallTarget::External(method)) => Some(method.params.len()),
        _ => None,
    });
    assert_eq!(arity, Some(2));

    // The standard registry knows nothing about Geo
    assert!(compile(source, &Config::default()).is_err());
}

#[test]
fn host_type_as_declared_type() {
    init_logger();
    let config = Config::default().with_using_namespace("System.Text");
    let diagnostics = check("StringBuilder sb; { StringBuilder local; }", &config);
    assert!(!diagnostics.has_errors(), "{}", diagnostics);
}

#[test]
fn local_shadows_host_name() {
    init_logger();
    // A scoped binding is found before the host is consulted
    let module = compile("{ int Math; Math = 1; }", &Config::default().with_using_namespace("System")).unwrap();
    assert_eq!(module.entry().locals.len(), 1);
}
