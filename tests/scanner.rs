#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;

    use rox::scanner::*;
    use rox::token::*;

    /// Compare the semantic tokens of `source` with `expected`.
    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let (tokens, errors) = scan_tokens(source);

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

        let actual: Vec<(TokenType, &str)> =
            tokens.iter().map(|t| (t.token_type, t.lexeme)).collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_maximal_munch_operators() {
        assert_token_sequence(
            "!= == <= >= ! = < > /",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL, "="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "var fun_ci = classy or _x1;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "fun_ci"),
                (TokenType::EQUAL, "="),
                (TokenType::IDENTIFIER, "classy"),
                (TokenType::OR, "or"),
                (TokenType::IDENTIFIER, "_x1"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_numbers_need_digit_after_dot() {
        assert_token_sequence(
            "12.5 7. 3",
            &[
                (TokenType::NUMBER, "12.5"),
                (TokenType::NUMBER, "7"),
                (TokenType::DOT, "."),
                (TokenType::NUMBER, "3"),
                (TokenType::EOF, ""),
            ],
        );

        let (tokens, _) = scan_tokens("12.5");
        assert_eq!(tokens[0].literal, Some(Literal::Number(12.5)));
    }

    #[test]
    fn test_scanner_05_string_literal_spans_lines() {
        let (tokens, errors) = scan_tokens("\"a\nb\" x");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].token_type, TokenType::STRING);
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb")));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let messages: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.message.clone())
            .collect();

        assert_eq!(
            messages,
            vec!["Unexpected character: $", "Unexpected character: #"]
        );
    }

    #[test]
    fn test_multibyte_character_is_one_error() {
        let (tokens, errors) = scan_tokens("a é b");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unexpected character: é");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_unterminated_string_reports_and_finishes() {
        let (tokens, errors) = scan_tokens("print \"oops\nmore");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unterminated string.");
        assert_eq!(errors[0].line, 2);
        assert_eq!(tokens.last().map(|t| t.token_type), Some(TokenType::EOF));
    }

    #[test]
    fn test_comment_is_emitted_then_filtered() {
        let raw: Vec<TokenType> = Scanner::new("1 // note\n2")
            .filter_map(Result::ok)
            .map(|t| t.token_type)
            .collect();

        assert_eq!(
            raw,
            vec![
                TokenType::NUMBER,
                TokenType::WHITESPACE,
                TokenType::COMMENT,
                TokenType::NEWLINE,
                TokenType::NUMBER,
                TokenType::EOF,
            ]
        );

        let (tokens, _) = scan_tokens("1 // note\n2");
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 2]);
    }

    /// Every semantic lexeme, EOF excluded, glued back together.
    fn joined_lexemes(source: &str) -> String {
        let (tokens, errors) = scan_tokens(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

        tokens
            .iter()
            .filter(|t| t.token_type != TokenType::EOF)
            .map(|t| t.lexeme)
            .collect()
    }

    #[test]
    fn test_lexemes_cover_source_minus_trivia() {
        let cases = [
            (
                "var s = \"a b\"; // note\nprint 1.5 >= 1.;",
                "vars=\"a b\";print1.5>=1.;",
            ),
            (
                "if (a != b and c == d) { x = -1; } // tail",
                "if(a!=bandc==d){x=-1;}",
            ),
            (
                "while (i <= 10)\n\tprint \"// not a comment\";",
                "while(i<=10)print\"// not a comment\";",
            ),
            ("1..2 / 3 // trailing\n", "1..2/3"),
            ("", ""),
        ];

        for (source, expected) in cases {
            assert_eq!(joined_lexemes(source), expected, "source: {:?}", source);
        }

        // Without strings or comments the join is the source minus whitespace.
        let source = "fun add(a, b) {\n  return a + b * 2.25;\n}\nprint add(1, 2) > 3 or !nil;";
        let stripped: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(joined_lexemes(source), stripped);
    }

    #[test]
    fn test_eof_emitted_exactly_once() {
        let mut scanner = Scanner::new("");

        assert_token_matches(&scanner.next().unwrap(), TokenType::EOF, "");
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_token_display() {
        let (tokens, _) = scan_tokens("x 42 \"hi\"");
        let printed: Vec<String> = tokens.iter().map(ToString::to_string).collect();

        assert_eq!(
            printed,
            vec![
                "IDENTIFIER x null",
                "NUMBER 42 42.0",
                "STRING \"hi\" hi",
                "EOF  null",
            ]
        );
    }

    fn assert_token_matches(
        result: &Result<Token<'_>, rox::error::LexError>,
        expected_type: TokenType,
        expected_lexeme: &str,
    ) {
        match result {
            Ok(token) => {
                assert_eq!(token.token_type, expected_type);
                assert_eq!(token.lexeme, expected_lexeme);
            }
            Err(e) => panic!("Expected token {:?}, got error: {}", expected_type, e),
        }
    }
}
