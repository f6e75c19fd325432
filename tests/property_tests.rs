//! Property-based tests for the Quipu front end
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use proptest::prelude::*;
use quipu::frontend::ast::{BinaryOp, Class, Expr, Program, TypeDecl};
use quipu::frontend::lexer::{self, TokenKind, KEYWORDS};
use quipu::frontend::parser;

fn first_class(program: &Program) -> &Class {
    match &program.types[0] {
        TypeDecl::Class(class) => class,
        other => panic!("expected a class, got {:?}", other),
    }
}

/// Lowercase identifiers that are not keywords (and, being lowercase,
/// cannot collide with the built-in generic class names).
fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}".prop_filter("not a keyword", |s| !KEYWORDS.contains_key(s.as_str()))
}

proptest! {
    /// Property: any non-keyword identifier lexes as a single Id token.
    #[test]
    fn generated_identifiers_lex_as_identifiers(name in ident_strategy()) {
        let tokens = lexer::lex("prop.qp", &name).expect("lex failed");
        prop_assert_eq!(tokens.len(), 2);
        prop_assert!(matches!(&tokens[0], TokenKind::Id(s) if *s == name));
        prop_assert!(matches!(tokens[1], TokenKind::Eof));
    }

    /// Property: decimal integer literals round-trip through the lexer.
    #[test]
    fn decimal_literals_round_trip(value in 0i64..=i64::MAX) {
        let source = value.to_string();
        let tokens = lexer::lex("prop.qp", &source).expect("lex failed");
        prop_assert!(matches!(tokens[0], TokenKind::LiteralLong(v) if v == value));
    }

    /// Property: underscore separators do not change the decoded value.
    #[test]
    fn underscore_separators_are_ignored(value in 1_000i64..=9_999_999i64) {
        let digits = value.to_string();
        let (head, tail) = digits.split_at(digits.len() - 3);
        let source = format!("{}_{}", head, tail);
        let tokens = lexer::lex("prop.qp", &source).expect("lex failed");
        prop_assert!(matches!(tokens[0], TokenKind::LiteralLong(v) if v == value));
    }

    /// Property: `List<...<int>...>` of any depth parses to the same
    /// nesting, however the closing `>` tokens group into `>>`.
    #[test]
    fn nested_generics_parse_to_matching_depth(depth in 1usize..=6) {
        let ty = format!("{}int{}", "List<".repeat(depth), ">".repeat(depth));
        let source = format!("class T {{ {} x; }}", ty);
        let program = parser::parse("prop.qp", &source).expect("parse failed");
        let mut ty = &first_class(&program).fields[0].ty;
        for _ in 0..depth {
            match ty {
                Expr::Symbol { name, type_args, .. } if name == "List" => {
                    prop_assert_eq!(type_args.len(), 1);
                    ty = &type_args[0];
                }
                other => panic!("expected List, got {:?}", other),
            }
        }
        let is_int = matches!(ty, Expr::Symbol { name, .. } if name == "int");
        prop_assert!(is_int);
    }

    /// Property: multiplication groups tighter than addition for arbitrary
    /// operands.
    #[test]
    fn mul_groups_tighter_than_add(
        a in ident_strategy(),
        b in ident_strategy(),
        c in ident_strategy(),
    ) {
        let source = format!("class T {{ int F() => {} + {} * {}; }}", a, b, c);
        let program = parser::parse("prop.qp", &source).expect("parse failed");
        let class = first_class(&program);
        let body = class.methods[0].body.as_ref().expect("expected a body");
        let quipu::frontend::ast::Stmt::Return { value: Some(expr), .. } = body else {
            panic!("expected an expression body");
        };
        let Expr::Binary { op: BinaryOp::Add, right, .. } = expr else {
            panic!("expected '+' at the root, got {:?}", expr);
        };
        let is_mul = matches!(right.as_ref(), Expr::Binary { op: BinaryOp::Mul, .. });
        prop_assert!(is_mul);
    }

    /// Property: every node produced from a one-line source is on line 1.
    #[test]
    fn single_line_sources_stay_on_line_one(name in ident_strategy()) {
        let source = format!("class T {{ int {}; }}", name);
        let program = parser::parse("prop.qp", &source).expect("parse failed");
        let class = first_class(&program);
        prop_assert_eq!(class.line, 1);
        prop_assert_eq!(class.fields[0].line, 1);
    }
}
