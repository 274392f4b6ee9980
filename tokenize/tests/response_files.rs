use std::fs;
use std::path::Path;

use cmdopt_tokenize::{ExpansionContext, ExpansionFailure, Token, Tokenizer, expand_response_files};

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create dir");
    }
    fs::write(path, content).expect("failed to write response file");
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ----- Nesting and relative names

#[test]
fn test_nested_response_file_relative_to_containing_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sub/inner.rsp", "-I inc");
    write(dir.path(), "outer.rsp", "@sub/inner.rsp -c");

    let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
    let (expanded, outcome) = ctx.expand_strings(args(&["cc", "@outer.rsp", "main.c"]));

    assert!(outcome.is_complete());
    assert_eq!(outcome.expanded, 2);
    assert_eq!(expanded, args(&["cc", "-I", "inc", "-c", "main.c"]));
}

#[test]
fn test_nested_names_resolve_against_current_dir_when_not_relative() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sub/inner.rsp", "-g");
    write(dir.path(), "sub/outer.rsp", "@inner.rsp");

    let relative = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
    let (expanded, outcome) = relative.expand_strings(args(&["@sub/outer.rsp"]));
    assert!(outcome.is_complete());
    assert_eq!(expanded, args(&["-g"]));

    let plain = ExpansionContext::new(Tokenizer::Gnu)
        .with_relative_names(false)
        .with_current_dir(dir.path());
    let (expanded, outcome) = plain.expand_strings(args(&["@sub/outer.rsp"]));
    assert!(!outcome.is_complete());
    assert_eq!(expanded, args(&["@inner.rsp"]));
}

// ----- Recursion

#[test]
fn test_self_recursive_file_terminates() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.rsp", "-x @a.rsp");

    let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
    let (expanded, outcome) = ctx.expand_strings(args(&["prog", "@a.rsp"]));

    assert_eq!(outcome.expanded, 1);
    assert!(matches!(
        outcome.failures.as_slice(),
        [ExpansionFailure::Recursive { .. }]
    ));
    assert_eq!(expanded.len(), 3);
    assert_eq!(&expanded[..2], &args(&["prog", "-x"])[..]);
    assert!(expanded[2].starts_with('@') && expanded[2].ends_with("a.rsp"));
}

#[test]
fn test_mutually_recursive_files_expand_partially() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.rsp", "-x @b.rsp");
    write(dir.path(), "b.rsp", "-y @a.rsp");

    let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
    let (expanded, outcome) = ctx.expand_strings(args(&["prog", "@a.rsp", "-z"]));

    assert!(!outcome.is_complete());
    assert_eq!(outcome.expanded, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].path().ends_with("a.rsp"));
    assert_eq!(&expanded[..3], &args(&["prog", "-x", "-y"])[..]);
    assert!(expanded[3].ends_with("a.rsp"));
    assert_eq!(expanded[4], "-z");
}

#[test]
fn test_file_can_be_expanded_again_after_leaving_it() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "leaf.rsp", "-l");
    write(dir.path(), "both.rsp", "@leaf.rsp @leaf.rsp");

    let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
    let (expanded, outcome) = ctx.expand_strings(args(&["@both.rsp", "@leaf.rsp"]));

    assert!(outcome.is_complete());
    assert_eq!(expanded, args(&["-l", "-l", "-l"]));
}

// ----- Encodings and syntaxes

#[test]
fn test_utf16_response_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "-DNAME=caf\u{e9} -O2".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(dir.path().join("wide.rsp"), bytes).unwrap();

    let ctx = ExpansionContext::new(Tokenizer::Gnu).with_current_dir(dir.path());
    let (expanded, outcome) = ctx.expand_strings(args(&["@wide.rsp"]));
    assert!(outcome.is_complete());
    assert_eq!(expanded, args(&["-DNAME=caf\u{e9}", "-O2"]));
}

#[test]
fn test_config_syntax_with_line_markers() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "opts.cfg", "# defaults\n-a -b\n\n-c \\\n-d\n");

    let ctx = ExpansionContext::new(Tokenizer::Config)
        .with_mark_eols(true)
        .with_current_dir(dir.path());
    let mut argv = vec![Token::text("tool"), Token::text("@opts.cfg")];
    let outcome = ctx.expand(&mut argv);

    assert!(outcome.is_complete());
    assert_eq!(
        argv,
        vec![
            Token::text("tool"),
            Token::text("-a"),
            Token::text("-b"),
            Token::EndOfLine,
            Token::text("-c"),
            Token::text("-d"),
            Token::EndOfLine,
        ]
    );
}

#[test]
fn test_windows_syntax_response_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "win.rsp", r#""C:\Program Files\inc" /Fo"out dir\\" /c"#);

    let ctx = ExpansionContext::new(Tokenizer::Windows).with_current_dir(dir.path());
    let (expanded, outcome) = ctx.expand_strings(args(&["cl", "@win.rsp"]));

    assert!(outcome.is_complete());
    assert_eq!(
        expanded,
        args(&["cl", r"C:\Program Files\inc", r"/Foout dir\", "/c"])
    );
}

#[test]
fn test_absolute_path_ignores_current_dir() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "abs.rsp", "-q");
    let at = format!("@{}", dir.path().join("abs.rsp").display());

    let (expanded, outcome) = expand_response_files(vec!["p".into(), at], Tokenizer::Gnu);
    assert!(outcome.is_complete());
    assert_eq!(expanded, args(&["p", "-q"]));
}
