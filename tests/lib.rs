use anyhow::Result;
use pretty_assertions::assert_eq;
use scanner_fa::{
    compile, parse, tokenize, BitSet128, ClosureKind, CompileError, Compiler,
    MatchResult, Matcher, NodeKind, ParseErrorKind, TokenKind,
};

#[test]
fn tree_of_closure_over_alternation() -> Result<()> {
    let tree = parse("(ab|b)*")?;
    let root = tree.root();

    assert_eq!(tree.kind(root), NodeKind::Closure(ClosureKind::Star));
    let alt = tree.children(root)[0];
    assert_eq!(tree.kind(alt), NodeKind::Alternation);

    let branches = tree.children(alt);
    assert_eq!(branches.len(), 2);
    assert_eq!(tree.kind(branches[0]), NodeKind::Concatenation);
    assert_eq!(
        tree.children(branches[0])
            .iter()
            .map(|&c| tree.kind(c))
            .collect::<Vec<_>>(),
        vec![NodeKind::Literal('a'), NodeKind::Literal('b')]
    );
    assert_eq!(tree.kind(branches[1]), NodeKind::Literal('b'));
    assert_eq!(tree.parent(branches[1]), Some(alt));

    Ok(())
}

#[test]
fn tokens_and_tree_agree() -> Result<()> {
    let pattern = "\"if\"|[a-z]+";
    let tokens = tokenize(pattern)?;

    assert_eq!(
        tokens.iter().collect::<Vec<_>>(),
        vec![
            (TokenKind::Literal, "if"),
            (TokenKind::Alternation, "|"),
            (TokenKind::Range, "[a-z]"),
            (TokenKind::PosClosure, "+"),
        ]
    );

    let tree = parse(pattern)?;
    assert_eq!(tree.kind(tree.root()), NodeKind::Alternation);

    Ok(())
}

#[test]
fn keywords_and_identifiers() -> Result<()> {
    let fa = compile("[a-z]([a-z]|[0-9]|_)*")?;
    let matcher = Matcher::new(&fa);
    let input = "fn main_2() { let x = 1; }";

    let words: Vec<&str> =
        matcher.find_all(input).iter().map(|m| m.as_str(input)).collect();
    assert_eq!(words, vec!["fn", "main_2", "let", "x"]);

    Ok(())
}

#[test]
fn maximal_munch() -> Result<()> {
    let fa = compile("=|==|=>")?;
    let matcher = Matcher::new(&fa);

    assert_eq!(matcher.longest_match("==>"), Some(2));
    assert_eq!(matcher.longest_match("=>="), Some(2));
    assert_eq!(matcher.longest_match("=a"), Some(1));
    assert_eq!(
        matcher.find_all("a==b=>c"),
        vec![MatchResult { start: 1, end: 3 }, MatchResult { start: 4, end: 6 }]
    );

    Ok(())
}

#[test]
fn quoted_special_characters() -> Result<()> {
    let fa = compile("\"(*)\"+")?;
    let matcher = Matcher::new(&fa);

    assert!(matcher.is_match("(*)"));
    assert!(matcher.is_match("(*))"));
    assert!(!matcher.is_match("(*"));

    Ok(())
}

#[test]
fn escapes() -> Result<()> {
    let fa = compile("a\\s*\\\"\\\\\\e\\n")?;
    let matcher = Matcher::new(&fa);

    assert!(matcher.is_match("a\"\\\n"));
    assert!(matcher.is_match("a \t\r\"\\\n"));
    assert!(!matcher.is_match("a\"\\"));

    Ok(())
}

#[test]
fn single_accepting_state() -> Result<()> {
    for pattern in ["a", "ab", "a|b", "a*", "(ab|b)*c?", "[0-9]+\".\"[0-9]*"] {
        let fa = compile(pattern)?;
        assert_eq!(fa.accepting().len(), 1, "{}", pattern);

        let end = fa.accepting().smallest().unwrap();
        assert!(fa.transitions_of(end as usize).is_empty(), "{}", pattern);
        assert!(fa.transitions_of(0).is_empty(), "{}", pattern);
    }

    Ok(())
}

#[test]
fn errors() {
    let err = compile("(a|b").unwrap_err();
    match &err {
        CompileError::Parse(parse_err) => {
            assert_eq!(parse_err.kind, ParseErrorKind::UnmatchedOpeningParen);
            assert_eq!(parse_err.offset, 4);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().starts_with("parse error: "));

    assert!(matches!(
        compile("[a-"),
        Err(CompileError::Parse(e)) if e.kind == ParseErrorKind::MalformedRange
    ));
    assert_eq!(compile(&"x".repeat(100)).unwrap_err(), CompileError::TooComplex);
}

#[test]
fn deeply_nested_patterns() -> Result<()> {
    let n = 10_000;

    let fa = compile(&format!("{}ab{}", "(".repeat(n), ")".repeat(n)))?;
    assert!(Matcher::new(&fa).is_match("ab"));

    let tree = parse(&format!("{}a{}", "(".repeat(n), ")*".repeat(n)))?;
    assert_eq!(Compiler::new().compile(&tree).unwrap_err(), CompileError::TooComplex);

    Ok(())
}

#[test]
fn errors_work_with_anyhow() {
    fn run() -> Result<usize> {
        Ok(compile("a)")?.n_states())
    }

    let err = run().unwrap_err();
    assert!(err.downcast_ref::<CompileError>().is_some());
}

#[test]
fn compiler_options() -> Result<()> {
    let tree = parse("\".\"|.")?;

    let fa = Compiler::new().dot_matches_newline(false).compile(&tree)?;
    let matcher = Matcher::new(&fa);
    assert!(matcher.is_match("."));
    assert!(matcher.is_match("x"));
    assert!(!matcher.is_match("\n"));

    let fa = Compiler::default().compile(&tree)?;
    assert!(Matcher::new(&fa).is_match("\n"));

    Ok(())
}

#[test]
fn accepting_states_are_a_bitset() -> Result<()> {
    let fa = compile("a|b")?;
    let accepting: BitSet128 = fa.accepting().iter().collect();

    assert_eq!(accepting, fa.accepting());
    assert!(fa.is_accepting(accepting.smallest().unwrap() as usize));

    Ok(())
}
