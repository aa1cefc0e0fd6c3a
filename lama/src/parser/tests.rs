//! Parser tests for Lama surface syntax

use crate::ast::{BinOp, Definition, Expr, Pattern, Program, Shape};
use crate::lexer::tokenize;
use crate::parser::parse;

/// Helper to parse a Lama program and return the AST
fn parse_program(source: &str) -> crate::Result<Program> {
    let tokens = tokenize(source)?;
    parse("test.lama", source, tokens)
}

/// Helper to parse and expect success
fn parse_ok(source: &str) -> Program {
    parse_program(source).expect("Parse should succeed")
}

/// Helper to check if parsing fails
fn parse_fails(source: &str) -> bool {
    parse_program(source).is_err()
}

/// Trailing expression of the top-level scope
fn body_expr(source: &str) -> Expr {
    let prog = parse_ok(source);
    prog.body.expr.expect("Expected trailing expression").node
}

// ============================================
// Literals and names
// ============================================

#[test]
fn test_parse_int_literal() {
    assert!(matches!(body_expr("42"), Expr::IntLit(42)));
}

#[test]
fn test_parse_bool_and_skip() {
    assert!(matches!(body_expr("true"), Expr::BoolLit(true)));
    assert!(matches!(body_expr("false"), Expr::BoolLit(false)));
    assert!(matches!(body_expr("skip"), Expr::Skip));
}

#[test]
fn test_parse_string_and_char() {
    if let Expr::StringLit(bytes) = &body_expr(r#""a""b""#) {
        assert_eq!(bytes, b"a\"b");
    } else {
        panic!("Expected StringLit");
    }
    assert!(matches!(body_expr("'x'"), Expr::CharLit(b'x')));
}

#[test]
fn test_parse_empty_program() {
    let prog = parse_ok("");
    assert!(prog.body.defs.is_empty());
    assert!(prog.body.expr.is_none());
}

// ============================================
// Operators
// ============================================

#[test]
fn test_parse_precedence() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    if let Expr::Binary { op, right, .. } = &body_expr("1 + 2 * 3") {
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(right.node, Expr::Binary { op: BinOp::Mul, .. }));
    } else {
        panic!("Expected Binary");
    }
}

#[test]
fn test_parse_left_associative_subtraction() {
    if let Expr::Binary { op, left, .. } = &body_expr("10 - 3 - 2") {
        assert_eq!(*op, BinOp::Sub);
        assert!(matches!(left.node, Expr::Binary { op: BinOp::Sub, .. }));
    } else {
        panic!("Expected Binary");
    }
}

#[test]
fn test_parse_cons_is_right_associative() {
    if let Expr::Binary { op, right, .. } = &body_expr("1 : 2 : 0") {
        assert_eq!(*op, BinOp::Cons);
        assert!(matches!(right.node, Expr::Binary { op: BinOp::Cons, .. }));
    } else {
        panic!("Expected Binary");
    }
}

#[test]
fn test_parse_logical_operators() {
    if let Expr::Binary { op, left, .. } = &body_expr("a && b !! c") {
        assert_eq!(*op, BinOp::Or);
        assert!(matches!(left.node, Expr::Binary { op: BinOp::And, .. }));
    } else {
        panic!("Expected Binary");
    }
}

#[test]
fn test_parse_comparison_not_chained() {
    assert!(parse_fails("1 < 2 < 3"));
}

#[test]
fn test_parse_unary_minus_rejected() {
    let err = parse_program("-1").unwrap_err();
    assert!(err.message().contains("unary minus"));
    assert!(parse_fails("x := 2 * -1"));
}

#[test]
fn test_parse_assign_is_right_associative() {
    if let Expr::Assign { target, value } = &body_expr("x := y := 3") {
        assert!(matches!(target.node, Expr::Var(ref n) if n == "x"));
        assert!(matches!(value.node, Expr::Assign { .. }));
    } else {
        panic!("Expected Assign");
    }
}

// ============================================
// Postfix forms
// ============================================

#[test]
fn test_parse_call_and_subscript() {
    if let Expr::Subscript { value, .. } = &body_expr("f(1, 2)[0]") {
        if let Expr::Call { args, .. } = &value.node {
            assert_eq!(args.len(), 2);
        } else {
            panic!("Expected Call");
        }
    } else {
        panic!("Expected Subscript");
    }
}

#[test]
fn test_parse_dot_call() {
    if let Expr::DotCall { func, args, .. } = &body_expr("xs.length") {
        assert_eq!(func.node, "length");
        assert!(args.is_empty());
    } else {
        panic!("Expected DotCall");
    }
    if let Expr::DotCall { args, .. } = &body_expr("x.add(1)") {
        assert_eq!(args.len(), 1);
    } else {
        panic!("Expected DotCall");
    }
}

// ============================================
// Definitions and scopes
// ============================================

#[test]
fn test_parse_var_definitions() {
    let prog = parse_ok("var x = 1, y; var z; x");
    assert_eq!(prog.body.defs.len(), 2);
    if let Definition::Var(items) = &prog.body.defs[0].node {
        assert_eq!(items.len(), 2);
        assert!(items[0].init.is_some());
        assert!(items[1].init.is_none());
    } else {
        panic!("Expected Var");
    }
}

#[test]
fn test_parse_fun_definition_vs_lambda() {
    let prog = parse_ok("fun f (a, b) { a + b } fun (x) { x }");
    assert_eq!(prog.body.defs.len(), 1);
    if let Definition::Fun(def) = &prog.body.defs[0].node {
        assert_eq!(def.name.node, "f");
        assert_eq!(def.params.len(), 2);
    } else {
        panic!("Expected Fun");
    }
    assert!(matches!(prog.body.expr.unwrap().node, Expr::Fun { .. }));
}

#[test]
fn test_parse_sequence_with_trailing_semicolon() {
    if let Expr::Seq(items) = &body_expr("write(1); write(2);") {
        assert_eq!(items.len(), 2);
    } else {
        panic!("Expected Seq");
    }
}

#[test]
fn test_parse_parenthesized_scope() {
    assert!(matches!(body_expr("(1 + 2)"), Expr::Binary { .. }));
    if let Expr::Scope(block) = &body_expr("(var t = 1; t)") {
        assert_eq!(block.defs.len(), 1);
    } else {
        panic!("Expected Scope");
    }
}

#[test]
fn test_parse_definitions_after_expression_rejected() {
    assert!(parse_fails("1; var x = 2; x"));
}

// ============================================
// Compound data
// ============================================

#[test]
fn test_parse_array_list_sexp() {
    assert!(matches!(body_expr("[1, 2, 3]"), Expr::Array(ref xs) if xs.len() == 3));
    assert!(matches!(body_expr("{}"), Expr::List(ref xs) if xs.is_empty()));
    if let Expr::Sexp { tag, args } = &body_expr("Pair (1, 2)") {
        assert_eq!(tag, "Pair");
        assert_eq!(args.len(), 2);
    } else {
        panic!("Expected Sexp");
    }
    assert!(matches!(body_expr("Nil"), Expr::Sexp { ref args, .. } if args.is_empty()));
}

// ============================================
// Control flow
// ============================================

#[test]
fn test_parse_if_without_else() {
    if let Expr::If { else_branch, .. } = &body_expr("if x then 1 fi") {
        assert!(else_branch.is_none());
    } else {
        panic!("Expected If");
    }
}

#[test]
fn test_parse_elif_desugars_to_nested_if() {
    if let Expr::If { else_branch, .. } = &body_expr("if a then 1 elif b then 2 else 3 fi") {
        let else_block = else_branch.as_ref().expect("Expected else");
        let inner = else_block.expr.as_ref().expect("Expected nested if");
        if let Expr::If { else_branch, .. } = &inner.node {
            assert!(else_branch.is_some());
        } else {
            panic!("Expected nested If");
        }
    } else {
        panic!("Expected If");
    }
}

#[test]
fn test_parse_loops() {
    assert!(matches!(body_expr("while i < 10 do i := i + 1 od"), Expr::While { .. }));
    assert!(matches!(body_expr("do i := i + 1 while i < 10 od"), Expr::Do { .. }));
    if let Expr::For { init, .. } = &body_expr("for var i = 0; skip, i < 3, i := i + 1 do write(i) od") {
        assert_eq!(init.defs.len(), 1);
    } else {
        panic!("Expected For");
    }
}

#[test]
fn test_parse_missing_terminator() {
    assert!(parse_fails("while 1 do skip"));
    assert!(parse_fails("if 1 then 2 else 3"));
}

// ============================================
// Case and patterns
// ============================================

fn case_patterns(source: &str) -> Vec<Pattern> {
    match &body_expr(source) {
        Expr::Case { branches, .. } => branches.iter().map(|b| b.pattern.node.clone()).collect(),
        other => panic!("Expected Case, got {other:?}"),
    }
}

#[test]
fn test_parse_case_branches() {
    let pats = case_patterns("case x of 0 -> 1 | _ -> 2 esac");
    assert_eq!(pats.len(), 2);
    assert!(matches!(pats[0], Pattern::Int(0)));
    assert!(matches!(pats[1], Pattern::Wildcard));
}

#[test]
fn test_parse_cons_pattern() {
    let pats = case_patterns("case xs of h : t -> h esac");
    if let Pattern::Cons { head, tail } = &pats[0] {
        assert!(matches!(head.node, Pattern::Named { .. }));
        assert!(matches!(tail.node, Pattern::Named { .. }));
    } else {
        panic!("Expected Cons");
    }
}

#[test]
fn test_parse_named_and_shape_patterns() {
    let pats = case_patterns("case v of p@Pair (a, _) -> a | #str -> 1 | {a, b} -> 2 | [x] -> x esac");
    if let Pattern::Named { name, pattern } = &pats[0] {
        assert_eq!(name.node, "p");
        assert!(matches!(pattern.as_ref().unwrap().node, Pattern::Sexp { .. }));
    } else {
        panic!("Expected Named");
    }
    assert!(matches!(pats[1], Pattern::Shape(Shape::Str)));
    assert!(matches!(pats[2], Pattern::List(ref ps) if ps.len() == 2));
    assert!(matches!(pats[3], Pattern::Array(ref ps) if ps.len() == 1));
}

#[test]
fn test_parse_literal_patterns() {
    let pats = case_patterns(r#"case c of 'a' -> 1 | true -> 2 | "s" -> 3 esac"#);
    assert!(matches!(pats[0], Pattern::Int(97)));
    assert!(matches!(pats[1], Pattern::Int(1)));
    assert!(matches!(pats[2], Pattern::Str(ref s) if s == b"s"));
}

#[test]
fn test_parse_case_branch_body_is_scope() {
    if let Expr::Case { branches, .. } = &body_expr("case 1 of x -> var y = x; y esac") {
        assert_eq!(branches[0].body.defs.len(), 1);
    } else {
        panic!("Expected Case");
    }
}

#[test]
fn test_parse_spans_cover_expression() {
    let source = "  1 + 2";
    let prog = parse_ok(source);
    let expr = prog.body.expr.unwrap();
    assert_eq!(&source[expr.span.start..expr.span.end], "1 + 2");
}

#[test]
fn test_parse_error_points_at_token() {
    let source = "if 1 then 2 od";
    let err = parse_program(source).unwrap_err();
    assert!(err.message().starts_with("unexpected `od`"));
    assert_eq!(&source[err.span().start..err.span().end], "od");
}

#[test]
fn test_parse_error_at_end_of_input() {
    let err = parse_program("f(1,").unwrap_err();
    assert!(err.message().starts_with("unexpected end of input"));
}

#[test]
fn test_parse_do_body_needs_expression() {
    assert!(matches!(body_expr("do var i = 1; i while 0 od"), Expr::Do { .. }));
    assert!(parse_fails("do while 0 od"));
    assert!(parse_fails("do skip; while 0 od"));
}

#[test]
fn test_parse_paren_pattern_and_bare_tag_call() {
    let pats = case_patterns("case v of (h : t) -> h | Nil -> 0 esac");
    assert!(matches!(pats[0], Pattern::Parens(_)));
    assert!(matches!(pats[1], Pattern::Sexp { ref args, .. } if args.is_empty()));
    assert!(matches!(body_expr("Nil[0]"), Expr::Subscript { .. }));
}

#[test]
fn test_parse_long_left_associative_chain() {
    let source = format!("0{}", " + 1".repeat(50_000));
    let prog = parse_ok(&source);
    assert!(matches!(prog.body.expr.unwrap().node, Expr::Binary { op: BinOp::Add, .. }));
}
