use jack_analyzer::{compile_source, dump_tokens, CompilerError, Expected, Kind, SourceFile, XmlWriter};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::thread;

fn fixture(name: &str) -> SourceFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name);
    SourceFile::load(&path).unwrap()
}

fn inline(text: &str) -> SourceFile {
    SourceFile::from_bytes("Inline.jack", text.as_bytes().to_vec())
}

fn compile(source: &SourceFile) -> (String, Result<(), CompilerError>) {
    let mut writer = XmlWriter::new(Vec::new());
    let result = compile_source(source, &mut writer);
    (String::from_utf8(writer.into_inner()).unwrap(), result)
}

/// Walks the rendered trace and checks that every element closes at the
/// indentation it was opened at.
fn assert_well_nested(trace: &str) {
    let mut stack: Vec<String> = Vec::new();
    for line in trace.lines() {
        let depth = line.len() - line.trim_start_matches('\t').len();
        let line = line.trim_start();

        if let Some(tag) = line.strip_prefix("</") {
            let tag = tag.trim_end_matches('>');
            assert_eq!(stack.pop().as_deref(), Some(tag));
            assert_eq!(depth, stack.len());
        } else if line.ends_with(&format!("</{}>", leaf_tag(line))) {
            assert_eq!(depth, stack.len());
        } else {
            assert_eq!(depth, stack.len());
            stack.push(line.trim_start_matches('<').trim_end_matches('>').to_string());
        }
    }
    assert!(stack.is_empty(), "unclosed: {:?}", stack);
}

fn leaf_tag(line: &str) -> &str {
    line.trim_start_matches('<').split('>').next().unwrap_or("")
}

#[test]
fn minimal_class_trace() {
    let (trace, result) = compile(&inline("class Main { }"));
    result.unwrap();
    assert_eq!(
        trace,
        "<class>\n\t<keyword> class </keyword>\n\t<identifier> Main </identifier>\n\t<symbol> { </symbol>\n\t<symbol> } </symbol>\n</class>\n"
    );
}

#[test]
fn unreadable_input_after_class_is_ignored() {
    let (trace, result) = compile(&inline("class M { } #"));
    result.unwrap();
    assert!(trace.ends_with("\t<symbol> } </symbol>\n</class>\n"), "got:\n{}", trace);
}

#[test]
fn statements_and_calls_have_elements() {
    let (trace, result) = compile(&inline("class M { function void f() { do g(); return; } }"));
    result.unwrap();
    assert_well_nested(&trace);

    let expected = [
        "\t\t\t<statement>",
        "\t\t\t\t<doStatement>",
        "\t\t\t\t\t<keyword> do </keyword>",
        "\t\t\t\t\t<subroutineCall>",
        "\t\t\t\t\t\t<identifier> g </identifier>",
        "\t\t\t\t\t\t<symbol> ( </symbol>",
        "\t\t\t\t\t\t<expressionList>",
        "\t\t\t\t\t\t</expressionList>",
        "\t\t\t\t\t\t<symbol> ) </symbol>",
        "\t\t\t\t\t</subroutineCall>",
        "\t\t\t\t\t<symbol> ; </symbol>",
        "\t\t\t\t</doStatement>",
        "\t\t\t</statement>",
    ]
    .join("\n");
    assert!(trace.contains(&expected), "do statement not found in:\n{}", trace);
}

#[test]
fn fixtures_compile_and_nest() {
    for name in ["Main.jack", "Square.jack"] {
        let (trace, result) = compile(&fixture(name));
        result.unwrap_or_else(|e| panic!("{} failed: {}", name, e));
        assert!(trace.starts_with("<class>\n"));
        assert!(trace.ends_with("</class>\n"));
        assert_well_nested(&trace);
    }
}

#[test]
fn array_read_in_expression() {
    let (trace, result) = compile(&fixture("Main.jack"));
    result.unwrap();

    // class > subroutineDec > subroutineBody > statement > whileStatement
    // > statement > letStatement > expression > term
    let pad = |depth: usize| "\t".repeat(depth);
    let expected = [
        format!("{}<term>", pad(8)),
        format!("{}<identifier> a </identifier>", pad(9)),
        format!("{}<symbol> [ </symbol>", pad(9)),
        format!("{}<expression>", pad(9)),
        format!("{}<term>", pad(10)),
        format!("{}<identifier> i </identifier>", pad(11)),
        format!("{}</term>", pad(10)),
        format!("{}</expression>", pad(9)),
        format!("{}<symbol> ] </symbol>", pad(9)),
        format!("{}</term>", pad(8)),
    ]
    .join("\n");
    assert!(trace.contains(&expected), "array term not found in:\n{}", trace);
}

#[test]
fn failed_parse_keeps_partial_trace() {
    let (trace, result) = compile(&inline("class 123 { }"));

    match result {
        Err(CompilerError::Syntax(err)) => {
            assert_eq!(err.expected(), &Expected::Identifier);
            assert_eq!(err.found().kind, Kind::IntegerConstant);
            assert_eq!(err.found().lexeme, "123");
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
    assert_eq!(trace, "<class>\n\t<keyword> class </keyword>\n");
}

#[test]
fn diagnostic_names_location() {
    let source = inline("class Main {\n  field int x\n}");
    let (_, result) = compile(&source);
    let message = result.unwrap_err().to_string();
    assert_eq!(
        message,
        "SyntaxError: expected symbol ',', found symbol '}'\n  --> Inline.jack:3:1"
    );
}

#[test]
fn unterminated_string_is_a_syntax_error() {
    let (_, result) = compile(&inline("class Main { function void f() { do Output.printString(\"abc"));
    assert!(matches!(result, Err(CompilerError::Syntax(_))));
}

#[test]
fn token_dump() {
    let mut writer = XmlWriter::new(Vec::new());
    dump_tokens(&inline("let s = \"a<b\"; // done\n"), &mut writer).unwrap();

    assert_eq!(
        String::from_utf8(writer.into_inner()).unwrap(),
        "<tokens>\n\
         \t<keyword> let </keyword>\n\
         \t<identifier> s </identifier>\n\
         \t<symbol> = </symbol>\n\
         \t<stringConstant> a&lt;b </stringConstant>\n\
         \t<symbol> ; </symbol>\n\
         </tokens>\n"
    );
}

#[test]
fn token_dump_stops_at_bad_character() {
    let mut writer = XmlWriter::new(Vec::new());
    let result = dump_tokens(&inline("let $x"), &mut writer);

    assert!(matches!(result, Err(CompilerError::LexingError(_))));
    assert_eq!(
        String::from_utf8(writer.into_inner()).unwrap(),
        "<tokens>\n\t<keyword> let </keyword>\n"
    );
}

#[test]
fn independent_parses_run_in_parallel() {
    let expected = compile(&fixture("Square.jack")).0;

    let handles: Vec<_> = (0..4)
        .map(|_| thread::spawn(|| compile(&fixture("Square.jack")).0))
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
