mod common;

use std::collections::BTreeMap;

use tokensjar::test_utils::{init_test_logging, salut_jar};
use tokensjar::{ResolveMode, TokenStore, TokensJarError};

use common::{jar_with_init, raw_jar};

#[test]
fn test_interpret_raw_tokens() {
    init_test_logging(None);
    let jar = salut_jar();

    let cases = [
        ("$(TEST)", "TestValue"),
        ("Coucou$(TEST)Hello", "CoucouTestValueHello"),
        ("Coucou$(SALUT)Hello", "CoucouTestValue/AdiosHello"),
    ];
    for (challenge, expected) in cases {
        assert_eq!(jar.interpret(challenge).unwrap(), expected, "challenge: {challenge}");
    }
}

#[test]
fn test_tokens_interpreted_raw() {
    init_test_logging(None);
    let jar = salut_jar();

    let expected = BTreeMap::from([
        ("TEST".to_string(), "TestValue".to_string()),
        ("ADIOS".to_string(), "Adios".to_string()),
        ("SALUT".to_string(), "TestValue/Adios".to_string()),
    ]);
    assert_eq!(jar.tokens_interpreted().unwrap(), expected);
}

#[test]
fn test_last_raw_value_is_interpreted() {
    let mut jar = raw_jar(&[("NAME", "first")]);
    jar.add_raw_value("NAME", "second");
    jar.add_raw_value("NAME", "third");

    assert_eq!(jar.interpret("$(NAME)").unwrap(), "third");
}

#[test]
fn test_tokens_interpreted_prepend() {
    let mut jar = jar_with_init(&[("TOKEN", "PreValue")]);
    jar.add_prepend_value("TOKEN", "Yolo1");
    jar.add_prepend_value("TOKEN", "Yolo2");

    let expected = BTreeMap::from([("TOKEN".to_string(), "Yolo2:Yolo1:PreValue".to_string())]);
    assert_eq!(jar.tokens_interpreted().unwrap(), expected);
}

#[test]
fn test_tokens_interpreted_append() {
    let mut jar = jar_with_init(&[("TOKEN", "PreValue")]);
    jar.add_append_value("TOKEN", "Yolo1");
    jar.add_append_value("TOKEN", "Yolo2");

    let expected = BTreeMap::from([("TOKEN".to_string(), "PreValue:Yolo1:Yolo2".to_string())]);
    assert_eq!(jar.tokens_interpreted().unwrap(), expected);
}

#[test]
fn test_path_list_with_references() {
    let mut jar = jar_with_init(&[("PATH", "/usr/bin:/bin")]);
    jar.add_raw_value("PREFIX", "/opt/tool");
    jar.add_prepend_value("PATH", "$(PREFIX)/bin");
    jar.add_append_value("LD_LIBRARY_PATH", "$(PREFIX)/lib");

    let tokens = jar.tokens_interpreted().unwrap();
    assert_eq!(tokens["PATH"], "/opt/tool/bin:/usr/bin:/bin");
    assert_eq!(tokens["LD_LIBRARY_PATH"], "/opt/tool/lib");
    assert!(!tokens.contains_key("HOME"));
}

#[test]
fn test_nested_references_several_levels() {
    let jar = raw_jar(&[
        ("ROOT", "/srv"),
        ("APP", "$(ROOT)/app"),
        ("BIN", "$(APP)/bin"),
        ("CMD", "$(BIN)/run --root=$(ROOT)"),
    ]);

    assert_eq!(jar.interpret("exec $(CMD)").unwrap(), "exec /srv/app/bin/run --root=/srv");
}

#[test]
fn test_idempotent_on_resolved_text() {
    let jar = salut_jar();

    let resolved = jar.interpret("$(SALUT) and $(TEST)").unwrap();
    assert_eq!(jar.interpret(&resolved).unwrap(), resolved);
    assert_eq!(jar.interpret("").unwrap(), "");
}

#[test]
fn test_deep_reference_chain() {
    init_test_logging(None);
    let length = 100_000;
    let mut jar = TokenStore::new();
    for i in 0..length {
        jar.add_raw_value(format!("T{i}"), format!("$(T{})", i + 1));
    }
    jar.add_raw_value(format!("T{length}"), "end");

    assert_eq!(jar.interpret("$(T0)").unwrap(), "end");

    let tree = jar.dependency_tree("T0").unwrap();
    assert!(tree.starts_with("T0\n└── T1\n"));
    assert!(tree.ends_with("└── ...\n"));
}

#[test]
fn test_unbalanced_reference_hides_nothing() {
    let jar = raw_jar(&[("T", "pre $(X and $(Y)"), ("Y", "y")]);

    assert_eq!(jar.interpret_with("$(T)", ResolveMode::Relaxed).unwrap(), "pre $(X and y");
    assert_eq!(jar.tokens_interpreted_with(ResolveMode::Relaxed).unwrap()["T"], "pre $(X and y");
}

#[test]
fn test_token_not_declared_strict() {
    let jar = raw_jar(&[("X", "$(TOKEN)_coucou")]);

    let err = jar.interpret("$(X)").unwrap_err();
    assert!(matches!(err, TokensJarError::TokenNotDeclared { ref name, .. } if name == "TOKEN"));

    let err = jar.interpret("$(UNKNOWN)").unwrap_err();
    assert!(matches!(err, TokensJarError::TokenNotDeclared { ref name, .. } if name == "UNKNOWN"));
}

#[test]
fn test_token_not_declared_relaxed() {
    let jar = raw_jar(&[("X", "$(TOKEN)_coucou")]);

    assert_eq!(jar.interpret_with("$(X)", ResolveMode::Relaxed).unwrap(), "$(TOKEN)_coucou");
    assert_eq!(jar.interpret_with("$(UNKNOWN)", ResolveMode::Relaxed).unwrap(), "$(UNKNOWN)");
}

#[test]
fn test_tokens_interpreted_strict_reports_undeclared() {
    let jar = raw_jar(&[("X", "$(TOKEN)_coucou"), ("Y", "y")]);

    assert!(jar.tokens_interpreted().is_err());

    let relaxed = jar.tokens_interpreted_with(ResolveMode::Relaxed).unwrap();
    assert_eq!(relaxed["X"], "$(TOKEN)_coucou");
    assert_eq!(relaxed["Y"], "y");
}

#[test]
fn test_cyclic_dependency() {
    let jar = raw_jar(&[("A", "$(B)"), ("B", "$(A)")]);

    for expression in ["$(A)", "$(B)", "nothing"] {
        match jar.interpret(expression) {
            Err(TokensJarError::CyclicDependency {
                cycle,
            }) => {
                assert!(cycle.contains(&"A".to_string()));
                assert!(cycle.contains(&"B".to_string()));
            }
            other => panic!("expected a cycle for {expression}, got {other:?}"),
        }
    }
    assert!(matches!(jar.tokens_interpreted(), Err(TokensJarError::CyclicDependency { .. })));
}

#[test]
fn test_cycle_reported_in_relaxed_mode() {
    let jar = raw_jar(&[("A", "$(A)")]);

    assert!(matches!(
        jar.interpret_with("$(A)", ResolveMode::Relaxed),
        Err(TokensJarError::CyclicDependency { .. })
    ));
}

#[test]
fn test_dependency_tree() {
    let jar = salut_jar();

    let tree = jar.dependency_tree("SALUT").unwrap();
    assert_eq!(tree, "SALUT\n├── ADIOS\n└── TEST\n");
}
