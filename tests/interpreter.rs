#[cfg(test)]
mod interpreter_tests {
    use pretty_assertions::assert_eq;

    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::scan_tokens;

    /// Run a program that is expected to scan, parse and resolve cleanly.
    /// Returns everything printed and, if execution failed, the runtime
    /// error as `(message, line)`.
    fn run(source: &str) -> (String, Option<(String, usize)>) {
        let (tokens, lex_errors) = scan_tokens(source);
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);

        let statements: Vec<_> = Parser::new(&tokens)
            .collect::<Result<_, _>>()
            .expect("test source should parse");

        let locals = Resolver::new()
            .resolve(&statements)
            .expect("test source should resolve");

        let mut interpreter = Interpreter::with_output(Vec::new());
        interpreter.resolve(locals);

        let error = interpreter
            .interpret(&statements)
            .err()
            .map(|e| (e.message, e.token.line));

        let output = String::from_utf8(interpreter.into_output()).expect("utf-8 output");

        (output, error)
    }

    fn assert_prints(source: &str, expected: &str) {
        let (output, error) = run(source);

        assert_eq!(error, None);
        assert_eq!(output, expected);
    }

    fn assert_runtime_error(source: &str, message: &str) {
        let (_, error) = run(source);

        assert_eq!(error.map(|(m, _)| m).as_deref(), Some(message));
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_prints("print 1 + 2 * 3;", "7\n");
        assert_prints("print (1 + 2) * 3;", "9\n");
        assert_prints("print 10 / 4;", "2.5\n");
        assert_prints("print -3 - -1;", "-2\n");
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_prints("print 1 / 0;", "inf\n");
        assert_prints("print -1 / 0;", "-inf\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_prints("print \"a\" + \"b\";", "ab\n");
        assert_prints("print \"a\" + \"b\" == \"ab\";", "true\n");
    }

    #[test]
    fn test_mixed_plus_names_both_operands() {
        let (_, error) = run("print \"a\" + 1;");

        assert_eq!(
            error,
            Some((
                "Operands must be two numbers or two strings, got \"a\" and 1.".to_string(),
                1
            ))
        );
    }

    #[test]
    fn test_operand_type_errors() {
        assert_runtime_error(
            "print 1 < \"a\";",
            "Operands must be numbers, got 1 and \"a\".",
        );
        assert_runtime_error("print -\"a\";", "Operand must be a number, got \"a\".");
        assert_runtime_error("print nil * 2;", "Operands must be numbers, got nil and 2.");
    }

    #[test]
    fn test_equality() {
        assert_prints(
            "print nil == nil; print nil == false; print 1 == 1; print \"a\" == \"a\"; print 1 == \"1\"; print 1 != 2;",
            "true\nfalse\ntrue\ntrue\nfalse\ntrue\n",
        );
    }

    #[test]
    fn test_truthiness_and_negation() {
        assert_prints(
            "print !nil; print !0; print !\"\"; print !false;",
            "true\nfalse\nfalse\ntrue\n",
        );
    }

    #[test]
    fn test_logical_operators_yield_operands() {
        assert_prints(
            "print nil or \"x\"; print 1 and 2; print false and undefined(); print 1 or undefined();",
            "x\n2\nfalse\n1\n",
        );
    }

    #[test]
    fn test_block_shadowing() {
        assert_prints(
            "var a = \"global\"; { var a = \"local\"; print a; } print a;",
            "local\nglobal\n",
        );
    }

    #[test]
    fn test_assignment_reaches_enclosing_scope() {
        assert_prints("var a = 1; { a = a + 1; { a = a * 10; } } print a;", "20\n");
        assert_prints("var a; print a = 3; print a;", "3\n3\n");
    }

    #[test]
    fn test_for_loop() {
        assert_prints("for (var i = 0; i < 3; i = i + 1) print i;", "0\n1\n2\n");
    }

    #[test]
    fn test_while_and_if() {
        assert_prints(
            "var n = 0; while (n < 5) { if (n == 2) print \"two\"; else print n; n = n + 1; }",
            "0\n1\ntwo\n3\n4\n",
        );
    }

    #[test]
    fn test_closure_counter() {
        assert_prints(
            r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }

            var counter = makeCounter();
            counter();
            counter();
            "#,
            "1\n2\n",
        );
    }

    #[test]
    fn test_closure_binding_is_fixed_by_resolution() {
        assert_prints(
            r#"
            var a = "global";
            {
                fun showA() { print a; }
                showA();
                var a = "block";
                showA();
            }
            "#,
            "global\nglobal\n",
        );
    }

    #[test]
    fn test_recursion() {
        assert_prints(
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(15);",
            "610\n",
        );
    }

    #[test]
    fn test_mutual_recursion_through_globals() {
        assert_prints(
            r#"
            fun isEven(n) { if (n == 0) return true; return isOdd(n - 1); }
            fun isOdd(n) { if (n == 0) return false; return isEven(n - 1); }
            print isEven(10);
            "#,
            "true\n",
        );
    }

    #[test]
    fn test_return_unwinds_nested_loops() {
        assert_prints(
            "fun f() { while (true) { for (;;) { return 3; } } } print f();",
            "3\n",
        );
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_prints("fun f() {} print f(); fun g() { return; } print g();", "nil\nnil\n");
    }

    #[test]
    fn test_callable_display() {
        assert_prints("fun f() {} print f; print clock;", "<fn f>\n<native fn clock>\n");
    }

    #[test]
    fn test_clock_is_positive() {
        assert_prints("print clock() > 0;", "true\n");
    }

    #[test]
    fn test_arity_mismatch_fails_before_body_runs() {
        let (output, error) = run("fun f(a) { print \"body\"; }\nf();");

        assert_eq!(output, "");
        assert_eq!(
            error,
            Some(("Can only call functions and classes.".to_string(), 2))
        );
    }

    #[test]
    fn test_calling_non_callable() {
        assert_runtime_error("\"x\"();", "Can only call functions and classes.");
        assert_runtime_error("var n = 1; n(2);", "Can only call functions and classes.");
    }

    #[test]
    fn test_undefined_variable() {
        let (_, error) = run("print 1;\n\nprint y;");

        assert_eq!(error, Some(("Undefined variable 'y'.".to_string(), 3)));
        assert_runtime_error("y = 1;", "Undefined variable 'y'.");
    }

    #[test]
    fn test_runtime_error_stops_remaining_statements() {
        let (output, error) = run("print 1; nil(); print 2;");

        assert_eq!(output, "1\n");
        assert!(error.is_some());
    }

    #[test]
    fn test_unbounded_recursion_is_a_runtime_error() {
        let (_, error) = run("fun f(n) {\n  return f(n + 1);\n}\nf(0);");

        assert_eq!(error, Some(("Stack overflow.".to_string(), 2)));
    }

    #[test]
    fn test_deep_but_bounded_recursion() {
        assert_prints(
            "fun depth(n) { if (n == 0) return 0; return 1 + depth(n - 1); } print depth(1000);",
            "1000\n",
        );
    }

    #[test]
    fn test_classes_are_rejected_at_runtime() {
        assert_runtime_error("class A {}", "Classes are not supported yet.");
    }
}
