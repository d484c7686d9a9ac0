use anyhow::{bail, Context};
use scanner_fa::{tokenize, Compiler, Matcher, Parser};

const DEMO_PATTERNS: &[&str] = &[
    "ab",
    "a*",
    "a+",
    "a?",
    "a|b",
    "(ab|b)*",
    "[0-9]+",
    "\"if\"|\"else\"",
    "[a-z]([a-z]|[0-9])*",
    "\\s+",
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let patterns: Vec<&str> = if args.is_empty() {
        DEMO_PATTERNS.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    let mut failed = 0;
    for pattern in &patterns {
        println!("\n=== Pattern: {:?} ===", pattern);
        if let Err(err) = dump(pattern) {
            println!("error: {:#}", err);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} patterns failed", failed, patterns.len());
    }

    Ok(())
}

fn dump(pattern: &str) -> anyhow::Result<()> {
    let tokens = tokenize(pattern).context("failed to tokenize")?;
    println!("Tokens:");
    for (kind, lexeme) in tokens.iter() {
        println!("  {:<18} {:?}", kind.name(), lexeme);
    }

    let tree = Parser::new(pattern).parse().context("failed to parse")?;
    // Trees that compile are shallow enough to be rendered.
    let fa = Compiler::new().compile(&tree).context("failed to compile")?;

    let mut rendered = String::new();
    ascii_tree::write_tree(&mut rendered, &tree.ascii_tree())?;
    println!("Tree:\n{}", rendered);

    println!(
        "Automaton ({} states, {} transitions, {}):",
        fa.n_states(),
        fa.n_transitions(),
        if Matcher::new(&fa).is_match("") {
            "matches the empty string"
        } else {
            "doesn't match the empty string"
        }
    );
    print!("{}", fa);

    Ok(())
}
