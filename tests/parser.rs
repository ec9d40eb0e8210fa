#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;

    use rox::ast::{ExprKind, Stmt};
    use rox::ast_printer::AstPrinter;
    use rox::parser::Parser;
    use rox::scanner::scan_tokens;

    /// Parse `source` and return the printed statements and the rendered
    /// parse errors, in order.
    fn parse(source: &str) -> (Vec<String>, Vec<String>) {
        let (tokens, lex_errors) = scan_tokens(source);
        assert!(lex_errors.is_empty(), "unexpected lex errors: {:?}", lex_errors);

        let mut printed = Vec::new();
        let mut errors = Vec::new();

        for result in Parser::new(&tokens).parse() {
            match result {
                Ok(stmt) => printed.push(AstPrinter::print_stmt(&stmt)),
                Err(e) => errors.push(e.to_string()),
            }
        }

        (printed, errors)
    }

    fn assert_parses(source: &str, expected: &[&str]) {
        let (printed, errors) = parse(source);

        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        assert_eq!(printed, expected);
    }

    #[test]
    fn test_precedence_multiplication_binds_tighter() {
        assert_parses("1 + 2 * 3;", &["(; (+ 1.0 (* 2.0 3.0)))"]);
    }

    #[test]
    fn test_binary_levels_are_left_associative() {
        assert_parses("1 - 2 - 3;", &["(; (- (- 1.0 2.0) 3.0))"]);
        assert_parses("a == b != c;", &["(; (!= (== a b) c))"]);
    }

    #[test]
    fn test_unary_and_grouping() {
        assert_parses("!!true;", &["(; (! (! true)))"]);
        assert_parses("-(1 + 2);", &["(; (- (group (+ 1.0 2.0))))"]);
    }

    #[test]
    fn test_logical_or_is_weaker_than_and() {
        assert_parses("a or b and c;", &["(; (or a (and b c)))"]);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_parses("a = b = 1;", &["(; (= a (= b 1.0)))"]);
    }

    #[test]
    fn test_chained_calls_nest() {
        assert_parses("f(1)(2, x);", &["(; (call (call f 1.0) 2.0 x))"]);
    }

    #[test]
    fn test_declarations() {
        assert_parses(
            "var a; var b = \"s\"; fun add(x, y) { return x + y; }",
            &[
                "(var a)",
                "(var b s)",
                "(fun add (x y) (return (+ x y)))",
            ],
        );
    }

    #[test]
    fn test_if_else_binds_to_nearest_if() {
        assert_parses(
            "if (a) if (b) print 1; else print 2;",
            &["(if a (if b (print 1.0) (print 2.0)))"],
        );
    }

    #[test]
    fn test_for_loop_is_lowered_to_while() {
        assert_parses(
            "for (var i = 0; i < 3; i = i + 1) print i;",
            &["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"],
        );

        assert_parses("for (;;) print 1;", &["(while true (print 1.0))"]);
    }

    #[test]
    fn test_class_syntax_is_parsed() {
        assert_parses(
            "class B < A { m() { return this.x; } }",
            &["(class B < A (fun m () (return (. this x))))"],
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (_, errors) = parse("a + b = 1;");

        assert_eq!(
            errors,
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_recovery_reports_every_bad_declaration() {
        let (printed, errors) = parse("var = 1;\nprint 2;\nprint ;\nvar ok = 3;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expected variable name.",
                "[line 3] Error at ';': Expected expression.",
            ]
        );
        assert_eq!(printed, vec!["(print 2.0)", "(var ok 3.0)"]);
    }

    #[test]
    fn test_error_at_end_of_input() {
        let (_, errors) = parse("print 1");

        assert_eq!(errors, vec!["[line 1] Error at end: Expected ';' after value."]);
    }

    #[test]
    fn test_error_inside_block_keeps_rest_of_block_inside() {
        let (printed, errors) = parse("{ var x = ; print 1; }\nprint 2;");

        assert_eq!(errors, vec!["[line 1] Error at ';': Expected expression."]);
        assert_eq!(printed, vec!["(print 2.0)"]);
    }

    #[test]
    fn test_only_first_error_of_a_declaration_is_reported() {
        let (printed, errors) = parse(
            "fun f() {\n  print ;\n  { var = 1; }\n  print 3;\n}\nprint 4;\nprint ;",
        );

        assert_eq!(
            errors,
            vec![
                "[line 2] Error at ';': Expected expression.",
                "[line 7] Error at ';': Expected expression.",
            ]
        );
        assert_eq!(printed, vec!["(print 4.0)"]);
    }

    #[test]
    fn test_unclosed_block_reports_only_inner_error() {
        let (printed, errors) = parse("{ print ; print 1;");

        assert_eq!(errors, vec!["[line 1] Error at ';': Expected expression."]);
        assert!(printed.is_empty());
    }

    #[test]
    fn test_recovery_inside_block_keeps_closing_brace() {
        let (printed, errors) = parse("{ var x = 1 }\nprint 2;");

        assert_eq!(
            errors,
            vec!["[line 1] Error at '}': Expected ';' after variable declaration."]
        );
        assert_eq!(printed, vec!["(print 2.0)"]);
    }

    #[test]
    fn test_token_slice_without_eof() {
        assert!(Parser::new(&[]).parse().is_empty());

        let (mut tokens, _) = scan_tokens("print 1");
        tokens.pop();

        let errors: Vec<String> = Parser::new(&tokens)
            .filter_map(Result::err)
            .map(|e| e.to_string())
            .collect();

        assert_eq!(errors, vec!["[line 0] Error at end: Expected ';' after value."]);
    }

    #[test]
    fn test_deeply_nested_grouping() {
        let depth = 20_000;
        let source = format!("{}1{};", "(".repeat(depth), ")".repeat(depth));

        let (tokens, _) = scan_tokens(&source);
        let results = Parser::new(&tokens).parse();

        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());

        // Dropping a tree this deep recurses too.
        std::mem::forget(results);
    }

    #[test]
    fn test_argument_limit() {
        let args = vec!["1"; 256].join(", ");
        let (_, errors) = parse(&format!("f({});", args));

        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 255 arguments."));

        let args = vec!["1"; 255].join(", ");
        let (_, errors) = parse(&format!("f({});", args));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_every_expression_has_distinct_id() {
        let (tokens, _) = scan_tokens("x; x;");
        let statements: Vec<Stmt<'_>> = Parser::new(&tokens).filter_map(Result::ok).collect();

        let ids: Vec<_> = statements
            .iter()
            .map(|stmt| match stmt {
                Stmt::Expression(expr) => {
                    assert!(matches!(expr.kind, ExprKind::Variable(_)));
                    expr.id
                }
                other => panic!("unexpected statement {:?}", other),
            })
            .collect();

        assert_ne!(ids[0], ids[1]);
    }
}
