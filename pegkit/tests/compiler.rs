use pegkit::compiler::*;
use pegkit::runtime::*;
use rstest::rstest;

fn bind(source: &str) -> RuleSet<Value> {
    parse_peg(source)
        .unwrap_or_else(|err| panic!("Failed to compile grammar: {}", err))
        .bind(&Actions::new())
        .unwrap_or_else(|err| panic!("Failed to bind grammar: {}", err))
}

fn run(parser: &RuleSet<Value>, input: &str) -> Result<Value, ParseError> {
    parser.parse(input, &Extensions::new())
}

fn int_label(captures: &Captures, name: &str) -> Result<i64, RuntimeError> {
    captures
        .value(name)?
        .concat_text()
        .parse()
        .map_err(|_| RuntimeError::action(format!("[{}] is not a number", name)))
}

fn texts(items: &[&str]) -> Value {
    Value::List(items.iter().map(|item| Value::from(*item)).collect())
}

#[test]
fn digits_are_captured() {
    let parser = bind("Digit = [0-9]+");
    assert_eq!(run(&parser, "42"), Ok(texts(&["4", "2"])));

    let parser = bind("Digit = $[0-9]+");
    assert_eq!(run(&parser, "42"), Ok(Value::from("42")));
    assert_eq!(run(&parser, ""), Err(ParseError::Syntax));
}

#[test]
fn sum_action_binds_labels() {
    let grammar = parse_peg(
        r#"
        Sum = a:Digit "+" b:Digit { a + b }
        Digit = [0-9]
        "#,
    )
    .unwrap();

    let actions = Actions::new().with("a + b", |captures, _| {
        Ok(Value::Int(int_label(captures, "a")? + int_label(captures, "b")?))
    });

    let parser = grammar.bind(&actions).unwrap();

    assert_eq!(run(&parser, "2+3"), Ok(Value::Int(5)));
    assert_eq!(run(&parser, "2+"), Err(ParseError::Syntax));
}

#[test]
fn partial_match_is_a_syntax_error() {
    let parser = bind("Digit = [0-9]");

    assert_eq!(run(&parser, "2"), Ok(Value::from("2")));
    assert_eq!(run(&parser, "2x"), Err(ParseError::Syntax));
}

#[test]
fn mutual_recursion() {
    let parser = bind(
        r#"
        A = "(" B ")"
        B = A?
        "#,
    );

    for depth in 1..50 {
        let input = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
        assert!(run(&parser, &input).is_ok(), "failed at depth {}", depth);
    }

    assert_eq!(run(&parser, "(()"), Err(ParseError::Syntax));
    assert_eq!(run(&parser, "())"), Err(ParseError::Syntax));
    assert_eq!(run(&parser, ""), Err(ParseError::Syntax));
}

#[test]
fn negated_class_is_the_complement() {
    let parser = bind("NotLower = [^a-z]");

    assert_eq!(run(&parser, "A"), Ok(Value::from("A")));
    assert_eq!(run(&parser, "é"), Ok(Value::from("é")));
    assert_eq!(run(&parser, "a"), Err(ParseError::Syntax));
    assert_eq!(run(&parser, "z"), Err(ParseError::Syntax));
    assert_eq!(run(&parser, ""), Err(ParseError::Syntax));
}

#[test]
fn first_rule_is_the_entry_point() {
    let parser = bind(
        r#"
        B = "b" A
        A = "a"
        "#,
    );

    assert!(run(&parser, "ba").is_ok());
    assert_eq!(run(&parser, "a"), Err(ParseError::Syntax));
}

#[test]
fn comments_are_ignored() {
    let parser = bind(
        r#"
        // Line comment
        /* Block
           comment */
        A = "a" /* inline */ B // trailing
        B = "b"
        "#,
    );

    assert_eq!(run(&parser, "ab"), Ok(texts(&["a", "b"])));
}

#[test]
fn operators_values() {
    assert_eq!(run(&bind(r#"A = "a"?"#), ""), Ok(Value::Null));
    assert_eq!(run(&bind(r#"A = "a"*"#), "aa"), Ok(texts(&["a", "a"])));
    assert_eq!(run(&bind(r#"A = "a"+"#), ""), Err(ParseError::Syntax));
    assert_eq!(run(&bind(r#"A = $("a" "b")"#), "ab"), Ok(Value::from("ab")));
    assert_eq!(
        run(&bind(r#"A = &"a" . "a""#), "aa"),
        Ok(Value::List(vec![Value::Null, "a".into(), "a".into()]))
    );
    assert_eq!(
        run(&bind(r#"A = !"b" ."#), "a"),
        Ok(Value::List(vec![Value::Null, "a".into()]))
    );
    assert_eq!(run(&bind(r#"A = !"b" ."#), "b"), Err(ParseError::Syntax));
}

#[test]
fn choice_is_ordered() {
    let parser = bind(r#"A = "a" / "a" "b""#);

    assert_eq!(run(&parser, "a"), Ok(Value::from("a")));
    assert_eq!(run(&parser, "ab"), Err(ParseError::Syntax));

    let parser = bind(r#"A = "a" "b" / "a""#);

    assert_eq!(run(&parser, "ab"), Ok(texts(&["a", "b"])));
    assert_eq!(run(&parser, "a"), Ok(Value::from("a")));
}

#[test]
fn empty_repetitions_terminate() {
    let parser = bind(r#"A = ("x"?)* "y""#);

    assert!(run(&parser, "y").is_ok());
    assert!(run(&parser, "xxy").is_ok());
}

#[test]
fn precedence() {
    let grammar = parse_peg(r#"A = "a" "b"* / !"c" ("d" / "e")"#).unwrap();

    let literal = |text: &str| PegExpr::Literal {
        raw: format!("\"{}\"", text),
        value: text.to_string(),
    };

    assert_eq!(
        grammar.entry().expr(),
        &PegExpr::Choice(vec![
            PegExpr::Sequence(vec![literal("a"), PegExpr::Many(Box::new(literal("b")))]),
            PegExpr::Sequence(vec![
                PegExpr::Not(Box::new(literal("c"))),
                PegExpr::Choice(vec![literal("d"), literal("e")]),
            ]),
        ])
    );
}

#[test]
fn preamble_is_kept_verbatim() {
    let grammar = parse_peg("{ use std::fmt; }\n\nA = \"a\"").unwrap();
    assert_eq!(grammar.preamble(), Some(" use std::fmt; "));

    let grammar = parse_peg("A = \"a\"").unwrap();
    assert_eq!(grammar.preamble(), None);
}

#[test]
fn code_blocks_keep_nested_braces() {
    let grammar = parse_peg(r#"A = "a" { if x { y } else { z } }"#).unwrap();

    match grammar.entry().expr() {
        PegExpr::Action { code, .. } => assert_eq!(code, " if x { y } else { z } "),
        other => panic!("Expected an action, found {:?}", other),
    }
}

#[rstest]
#[case(r#"A = x:"a" { code }"#, Bindings::Whole("x".to_string()))]
#[case(
    r#"A = x:"a" "-" y:"b" { code }"#,
    Bindings::Positional(vec![("x".to_string(), 0), ("y".to_string(), 2)])
)]
#[case(
    r#"A = (x:"a" y:"b") { code }"#,
    Bindings::Positional(vec![("x".to_string(), 0), ("y".to_string(), 1)])
)]
#[case(r#"A = (x:"a")* { code }"#, Bindings::None)]
#[case(r#"A = "a" "b" { code }"#, Bindings::None)]
#[case(r#"A = pair:("a" b:"b") { code }"#, Bindings::Whole("pair".to_string()))]
fn label_bindings(#[case] source: &str, #[case] expected: Bindings) {
    let grammar = parse_peg(source).unwrap();

    match grammar.entry().expr() {
        PegExpr::Action { bindings, .. } => assert_eq!(bindings, &expected),
        other => panic!("Expected an action, found {:?}", other),
    }
}

#[test]
fn handlers_see_labels_and_extensions() {
    let grammar = parse_peg(r#"Scaled = value:$[0-9]+ { scale }"#).unwrap();

    let actions = Actions::new().with("scale", |captures, ctx| {
        let factor = ctx.extension("factor").and_then(Value::as_int).unwrap_or(1);
        Ok(Value::Int(int_label(captures, "value")? * factor))
    });

    let parser = grammar.bind(&actions).unwrap();

    let mut extensions = Extensions::new();
    extensions.insert("factor".to_string(), Value::Int(10));

    assert_eq!(parser.parse("12", &extensions), Ok(Value::Int(120)));
    assert_eq!(parser.parse("12", &Extensions::new()), Ok(Value::Int(12)));
}

#[test]
fn handler_faults_abort_the_parse() {
    let grammar = parse_peg(r#"A = "a" { fail } / "a""#).unwrap();
    let actions = Actions::new().with("fail", |_, _| Err(RuntimeError::action("refused")));
    let parser = grammar.bind(&actions).unwrap();

    assert_eq!(
        run(&parser, "a"),
        Err(ParseError::Runtime(RuntimeError::Action("refused".to_string())))
    );
}

#[test]
fn missing_handler_is_reported_at_bind() {
    let grammar = parse_peg(
        r#"
        A = B
        B = "b" {  nothing  }
        "#,
    )
    .unwrap();

    assert_eq!(
        grammar.bind(&Actions::new()).unwrap_err(),
        BindError::MissingAction {
            rule: "B".to_string(),
            code: "nothing".to_string(),
        }
    );
}

#[test]
fn unresolved_rules_fault_only_when_reached() {
    let parser = bind(r#"A = "a" / Missing"#);

    assert_eq!(run(&parser, "a"), Ok(Value::from("a")));
    assert_eq!(
        run(&parser, "b"),
        Err(ParseError::Runtime(RuntimeError::UnresolvedRule(
            "Missing".to_string()
        )))
    );
}

#[test]
fn duplicate_rules_are_rejected() {
    let err = parse_peg("A = \"a\"\nB = \"b\"\nA = \"c\"").unwrap_err();

    match err {
        CompileError::DuplicateRule(name) => assert_eq!(name, "A"),
        other => panic!("Expected a duplicate rule error, found {:?}", other),
    }
}

#[test]
fn duplicate_labels_are_rejected() {
    let err = parse_peg(
        r#"
        A = "(" B ")"
        B = a:"x" "-" a:"y" { pair }
        "#,
    )
    .unwrap_err();

    match err {
        CompileError::DuplicateLabel { rule, label } => {
            assert_eq!(rule, "B");
            assert_eq!(label, "a");
        }
        other => panic!("Expected a duplicate label error, found {:?}", other),
    }

    // Each action has its own labels
    assert!(parse_peg(r#"A = (a:"x" b:"y" { inner }) a:"z" { outer }"#).is_ok());
}

#[test]
fn escapes() {
    let parser = bind(r#"A = "\t\"\\" 'it\'s' "\q""#);
    assert_eq!(run(&parser, "\t\"\\it'sq"), Ok(texts(&["\t\"\\", "it's", "q"])));

    let parser = bind(r#"A = [\]\-\n^]+"#);
    assert_eq!(run(&parser, "]-\n^"), Ok(texts(&["]", "-", "\n", "^"])));
    assert_eq!(run(&parser, "a"), Err(ParseError::Syntax));
}

#[test]
fn code_point_escapes() {
    let parser = bind(r#"A = "\x41""#);
    assert_eq!(run(&parser, "A"), Ok(Value::from("A")));
    assert_eq!(run(&parser, "x41"), Err(ParseError::Syntax));

    let parser = bind(r#"A = "\u00e9" '\u{1F600}'"#);
    assert_eq!(run(&parser, "é\u{1F600}"), Ok(texts(&["é", "\u{1F600}"])));
    assert_eq!(run(&parser, "u00e9u{1F600}"), Err(ParseError::Syntax));
}

#[rstest]
#[case(r#"A = "\xZZ""#)]
#[case(r#"A = "\x4""#)]
#[case(r#"A = "\u12""#)]
#[case(r#"A = "\u{}""#)]
#[case(r#"A = "\uD800""#)]
#[case(r#"A = "\u{110000}""#)]
fn invalid_code_point_escapes(#[case] source: &str) {
    assert!(
        matches!(parse_peg(source), Err(CompileError::Runtime(RuntimeError::Action(_)))),
        "{:?} should not compile",
        source
    );
}

#[rstest]
#[case("")]
#[case("   // only a comment")]
#[case("A =")]
#[case("= \"a\"")]
#[case("A = (\"a\"")]
#[case("A = [a-z")]
#[case("A = []")]
#[case("A = \"unterminated")]
#[case("A = \"a\" {")]
#[case("A = \"a\" /")]
#[case("A = x: \"a\" y:")]
#[case("A = \"a\" B = \"b\" =")]
#[case("{ preamble only }")]
fn malformed_grammars(#[case] source: &str) {
    assert!(
        matches!(parse_peg(source), Err(CompileError::Syntax)),
        "{:?} should not compile",
        source
    );
}

#[test]
fn compile_produces_in_memory_grammars_by_default() {
    match compile("A = \"a\"", &CompileOptions::new()) {
        Ok(Compiled::Grammar(grammar)) => {
            assert!(!grammar.is_module());
            assert_eq!(grammar.rules().len(), 1);
        }
        other => panic!("Expected an in-memory grammar, found {:?}", other),
    }
}

#[cfg(feature = "rustgen")]
#[test]
fn compile_produces_modules_on_request() {
    match compile("A = \"a\"", &CompileOptions { module: true }) {
        Ok(Compiled::Module(source)) => {
            assert!(source.contains("pub fn parse"));
            assert!(source.contains(&rule_symbol("A")));
        }
        other => panic!("Expected a module, found {:?}", other),
    }
}

#[cfg(not(feature = "rustgen"))]
#[test]
fn module_output_requires_rustgen() {
    assert!(matches!(
        compile("A = \"a\"", &CompileOptions { module: true }),
        Err(CompileError::ModuleOutputUnavailable)
    ));
}

#[test]
fn bound_parsers_are_shareable() {
    let parser = std::sync::Arc::new(bind("Digits = $[0-9]+"));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let parser = std::sync::Arc::clone(&parser);
            std::thread::spawn(move || run(&parser, &i.to_string().repeat(3)))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Ok(Value::from(i.to_string().repeat(3))));
    }
}
