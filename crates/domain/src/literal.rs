use std::fmt::{Display, Formatter};

use solvane_core::{AppError, AppResult};
use tracing::warn;

/// One `key: value` pair of a parsed dict literal.
///
/// Both sides hold canonical source text, never evaluated values: keys and
/// values may reference names that only resolve at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    /// Canonical source text of the key expression.
    pub key: String,
    /// Canonical source text of the value expression.
    pub value: String,
}

/// A parsed attribute expression fragment.
///
/// The parser recognizes the bracketed literal shapes used in view
/// attributes and captures everything inside them as opaque sub-expression
/// text. Text that is not a single bracketed literal parses as a bare
/// tuple or one opaque expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionLiteral {
    /// `{key: value, ...}` mapping with entries in source order.
    Dict(Vec<DictEntry>),
    /// `[item, ...]` sequence of item source texts.
    List(Vec<String>),
    /// `(item, ...)` sequence of item source texts.
    Tuple(Vec<String>),
    /// Any other expression, kept as canonical source text.
    Expression(String),
}

impl ExpressionLiteral {
    /// Parses attribute text into a literal shape.
    ///
    /// Surrounding whitespace and line breaks are insignificant. Duplicate
    /// dict keys keep the last value at the first occurrence's position.
    pub fn parse(text: &str) -> AppResult<Self> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(AppError::Validation("empty literal expression".to_owned()));
        }

        let mut parser = Parser::new(tokens);
        let parsed = parser.parse_literal()?;
        if parser.at_end() {
            return Ok(parsed);
        }

        // Trailing tokens mean the text is not a single bracketed literal;
        // re-read it as a bare tuple or one opaque expression.
        parser.index = 0;
        parser.parse_bare_sequence()
    }

    /// Serializes the literal back to canonical source text.
    #[must_use]
    pub fn to_source(&self) -> String {
        match self {
            Self::Dict(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|entry| format!("{}: {}", entry.key, entry.value))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Self::List(items) => format!("[{}]", items.join(", ")),
            Self::Tuple(items) if items.len() == 1 => format!("({},)", items[0]),
            Self::Tuple(items) => format!("({})", items.join(", ")),
            Self::Expression(text) => text.clone(),
        }
    }
}

impl Display for ExpressionLiteral {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.to_source())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Symbol(&'static str),
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn consume_symbol(&mut self, symbol: &str) -> bool {
        if let Some(Token::Symbol(current)) = self.peek()
            && *current == symbol
        {
            self.index += 1;
            return true;
        }

        false
    }

    fn expect_symbol(&mut self, symbol: &str) -> AppResult<()> {
        if self.consume_symbol(symbol) {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "expected '{symbol}' in literal expression"
        )))
    }

    fn parse_literal(&mut self) -> AppResult<ExpressionLiteral> {
        match self.peek() {
            Some(Token::Symbol("{")) => Ok(ExpressionLiteral::Dict(self.parse_dict()?)),
            Some(Token::Symbol("[")) => Ok(ExpressionLiteral::List(self.parse_list()?)),
            Some(Token::Symbol("(")) => self.parse_group(),
            _ => Ok(ExpressionLiteral::Expression(self.capture_fragment()?)),
        }
    }

    fn parse_dict(&mut self) -> AppResult<Vec<DictEntry>> {
        self.expect_symbol("{")?;
        let mut entries: Vec<DictEntry> = Vec::new();

        loop {
            if self.consume_symbol("}") {
                break;
            }

            let key = self.capture_fragment()?;
            self.expect_symbol(":")?;
            let value = self.capture_fragment()?;

            if let Some(existing) = entries.iter_mut().find(|entry| entry.key == key) {
                warn!(
                    key = key.as_str(),
                    "duplicate key in dict literal, keeping the last value"
                );
                existing.value = value;
            } else {
                entries.push(DictEntry { key, value });
            }

            if self.consume_symbol(",") {
                continue;
            }
            self.expect_symbol("}")?;
            break;
        }

        Ok(entries)
    }

    fn parse_list(&mut self) -> AppResult<Vec<String>> {
        self.expect_symbol("[")?;
        let mut items = Vec::new();

        loop {
            if self.consume_symbol("]") {
                break;
            }

            items.push(self.capture_fragment()?);

            if self.consume_symbol(",") {
                continue;
            }
            self.expect_symbol("]")?;
            break;
        }

        Ok(items)
    }

    fn parse_group(&mut self) -> AppResult<ExpressionLiteral> {
        self.expect_symbol("(")?;
        let mut items = Vec::new();
        let mut saw_comma = false;

        loop {
            if self.consume_symbol(")") {
                break;
            }

            items.push(self.capture_fragment()?);

            if self.consume_symbol(",") {
                saw_comma = true;
                continue;
            }
            self.expect_symbol(")")?;
            break;
        }

        // A parenthesized group without commas is grouping, not a tuple.
        if !saw_comma && items.len() == 1 {
            return Ok(ExpressionLiteral::Expression(items.remove(0)));
        }

        Ok(ExpressionLiteral::Tuple(items))
    }

    fn parse_bare_sequence(&mut self) -> AppResult<ExpressionLiteral> {
        let mut items = vec![self.capture_fragment()?];
        let mut saw_comma = false;

        while self.consume_symbol(",") {
            saw_comma = true;
            if self.at_end() {
                break;
            }
            items.push(self.capture_fragment()?);
        }

        if !self.at_end() {
            return Err(AppError::Validation(
                "unbalanced brackets in literal expression".to_owned(),
            ));
        }

        if saw_comma {
            return Ok(ExpressionLiteral::Tuple(items));
        }

        Ok(ExpressionLiteral::Expression(items.remove(0)))
    }

    /// Consumes tokens up to the next `,`, `:`, or closing bracket at the
    /// current nesting depth and returns them as canonical text.
    fn capture_fragment(&mut self) -> AppResult<String> {
        let start = self.index;
        let mut depth = 0usize;

        while let Some(token) = self.tokens.get(self.index) {
            if let Token::Symbol(symbol) = token {
                match *symbol {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    "," | ":" if depth == 0 => break,
                    _ => {}
                }
            }
            self.index += 1;
        }

        let fragment = strip_redundant_parens(&self.tokens[start..self.index]);
        if fragment.is_empty() {
            return Err(AppError::Validation(
                "expected an expression in literal".to_owned(),
            ));
        }

        Ok(write_tokens(fragment))
    }
}

/// Drops parentheses that wrap a whole fragment and carry no tuple comma.
fn strip_redundant_parens(tokens: &[Token]) -> &[Token] {
    let mut current = tokens;

    loop {
        if current.len() < 3
            || !matches!(current.first(), Some(Token::Symbol("(")))
            || !matches!(current.last(), Some(Token::Symbol(")")))
        {
            return current;
        }

        let inner = &current[1..current.len() - 1];
        let mut depth = 0usize;
        let mut parens_are_structural = false;

        for token in inner {
            let Token::Symbol(symbol) = token else {
                continue;
            };
            match *symbol {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    if depth == 0 {
                        parens_are_structural = true;
                        break;
                    }
                    depth -= 1;
                }
                "," if depth == 0 => {
                    parens_are_structural = true;
                    break;
                }
                _ => {}
            }
        }

        if parens_are_structural || depth != 0 {
            return current;
        }

        current = inner;
    }
}

fn write_tokens(tokens: &[Token]) -> String {
    let mut output = String::new();
    let mut previous: Option<&Token> = None;

    for token in tokens {
        if let Some(previous) = previous
            && needs_space(previous, token)
        {
            output.push(' ');
        }

        match token {
            Token::Ident(name) => output.push_str(name),
            Token::Number(number) => output.push_str(number),
            Token::Str(content) => push_string_literal(&mut output, content),
            Token::Symbol(symbol) => output.push_str(symbol),
        }

        previous = Some(token);
    }

    output
}

fn needs_space(previous: &Token, next: &Token) -> bool {
    if let Token::Symbol(symbol) = next
        && matches!(*symbol, "," | ":" | ")" | "]" | "}" | ".")
    {
        return false;
    }

    if let Token::Symbol(symbol) = previous
        && matches!(*symbol, "(" | "[" | "{" | "." | "~")
    {
        return false;
    }

    // Keyword arguments stay tight: f(limit=80).
    if matches!(previous, Token::Symbol("=")) || matches!(next, Token::Symbol("=")) {
        return false;
    }

    // Calls and subscripts attach to their target.
    if let Token::Symbol(symbol) = next
        && matches!(*symbol, "(" | "[")
    {
        return !ends_operand(previous);
    }

    true
}

/// Whether a token can end an operand, making a following `(`/`[` a call
/// or subscript and a following sign a binary operator.
fn ends_operand(token: &Token) -> bool {
    match token {
        Token::Ident(name) => !is_keyword(name),
        Token::Number(_) | Token::Str(_) => true,
        Token::Symbol(symbol) => matches!(*symbol, ")" | "]" | "}"),
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "and" | "or" | "not" | "in" | "is" | "if" | "else" | "for" | "lambda"
    )
}

/// Re-emits string content with canonical quoting: single quotes unless the
/// content itself contains an unescaped single quote.
fn push_string_literal(output: &mut String, content: &str) {
    let mut has_single_quote = false;
    let mut has_double_quote = false;
    let mut characters = content.chars();

    while let Some(character) = characters.next() {
        match character {
            '\\' => {
                characters.next();
            }
            '\'' => has_single_quote = true,
            '"' => has_double_quote = true,
            _ => {}
        }
    }

    if !has_single_quote {
        output.push('\'');
        output.push_str(content);
        output.push('\'');
        return;
    }

    if !has_double_quote {
        output.push('"');
        output.push_str(content);
        output.push('"');
        return;
    }

    output.push('\'');
    let mut characters = content.chars();
    while let Some(character) = characters.next() {
        match character {
            '\\' => {
                output.push(character);
                if let Some(escaped) = characters.next() {
                    output.push(escaped);
                }
            }
            '\'' => output.push_str("\\'"),
            _ => output.push(character),
        }
    }
    output.push('\'');
}

const TWO_CHAR_SYMBOLS: &[(char, char, &str)] = &[
    ('*', '*', "**"),
    ('/', '/', "//"),
    ('<', '<', "<<"),
    ('>', '>', ">>"),
    ('<', '=', "<="),
    ('>', '=', ">="),
    ('=', '=', "=="),
    ('!', '=', "!="),
    ('-', '>', "->"),
    (':', '=', ":="),
];

const ONE_CHAR_SYMBOLS: &[(char, &str)] = &[
    ('(', "("),
    (')', ")"),
    ('[', "["),
    (']', "]"),
    ('{', "{"),
    ('}', "}"),
    (',', ","),
    (':', ":"),
    ('.', "."),
    ('+', "+"),
    ('-', "-"),
    ('*', "*"),
    ('/', "/"),
    ('%', "%"),
    ('&', "&"),
    ('|', "|"),
    ('^', "^"),
    ('~', "~"),
    ('<', "<"),
    ('>', ">"),
    ('=', "="),
    ('@', "@"),
];

fn tokenize(text: &str) -> AppResult<Vec<Token>> {
    let characters: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < characters.len() {
        let current = characters[index];

        if current.is_whitespace() {
            index += 1;
            continue;
        }

        if current == '\'' || current == '"' {
            let (content, next_index) = read_string(&characters, index, current)?;
            tokens.push(Token::Str(content));
            index = next_index;
            continue;
        }

        if current.is_ascii_digit() || starts_signed_number(&characters, index, &tokens) {
            let (number, next_index) = read_number(&characters, index);
            tokens.push(Token::Number(number));
            index = next_index;
            continue;
        }

        if current.is_alphabetic() || current == '_' {
            let (name, next_index) = read_identifier(&characters, index);
            tokens.push(Token::Ident(name));
            index = next_index;
            continue;
        }

        if let Some((symbol, next_index)) = read_symbol(&characters, index) {
            tokens.push(Token::Symbol(symbol));
            index = next_index;
            continue;
        }

        return Err(AppError::Validation(format!(
            "unexpected character '{current}' in literal expression"
        )));
    }

    Ok(tokens)
}

/// A `+`/`-` directly before a digit is a sign unless the previous token
/// ends an operand.
fn starts_signed_number(characters: &[char], index: usize, tokens: &[Token]) -> bool {
    if characters[index] != '-' && characters[index] != '+' {
        return false;
    }

    if !characters
        .get(index + 1)
        .is_some_and(|next| next.is_ascii_digit())
    {
        return false;
    }

    !tokens.last().is_some_and(ends_operand)
}

fn read_string(characters: &[char], start: usize, quote: char) -> AppResult<(String, usize)> {
    let mut content = String::new();
    let mut index = start + 1;

    while let Some(&current) = characters.get(index) {
        if current == '\\' {
            content.push(current);
            let Some(&escaped) = characters.get(index + 1) else {
                break;
            };
            content.push(escaped);
            index += 2;
            continue;
        }

        if current == quote {
            return Ok((content, index + 1));
        }

        content.push(current);
        index += 1;
    }

    Err(AppError::Validation(
        "unterminated string literal".to_owned(),
    ))
}

fn read_number(characters: &[char], start: usize) -> (String, usize) {
    let mut number = String::new();
    let mut index = start;

    if matches!(characters.get(index), Some('-') | Some('+')) {
        number.push(characters[index]);
        index += 1;
    }

    while let Some(&current) = characters.get(index) {
        if current.is_ascii_alphanumeric() || current == '.' || current == '_' {
            number.push(current);
            index += 1;
            continue;
        }
        break;
    }

    (number, index)
}

fn read_identifier(characters: &[char], start: usize) -> (String, usize) {
    let mut name = String::new();
    let mut index = start;

    while let Some(&current) = characters.get(index) {
        if current.is_alphanumeric() || current == '_' {
            name.push(current);
            index += 1;
            continue;
        }
        break;
    }

    (name, index)
}

fn read_symbol(characters: &[char], index: usize) -> Option<(&'static str, usize)> {
    let first = *characters.get(index)?;

    if let Some(&second) = characters.get(index + 1)
        && let Some((_, _, symbol)) = TWO_CHAR_SYMBOLS
            .iter()
            .find(|(left, right, _)| *left == first && *right == second)
    {
        return Some((symbol, index + 2));
    }

    let (_, symbol) = ONE_CHAR_SYMBOLS
        .iter()
        .find(|(character, _)| *character == first)?;

    Some((symbol, index + 1))
}

#[cfg(test)]
mod tests {
    use super::{DictEntry, ExpressionLiteral};

    fn parse(text: &str) -> ExpressionLiteral {
        ExpressionLiteral::parse(text).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn dict_entries_capture_source_text() {
        let parsed = parse("{'default_type': context.get('default_type'), 'journal_id': journal_id}");

        let ExpressionLiteral::Dict(entries) = parsed else {
            unreachable!()
        };
        assert_eq!(
            entries,
            vec![
                DictEntry {
                    key: "'default_type'".to_owned(),
                    value: "context.get('default_type')".to_owned(),
                },
                DictEntry {
                    key: "'journal_id'".to_owned(),
                    value: "journal_id".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn double_quoted_strings_re_emit_single_quoted() {
        let parsed = parse(r#"{"default_company_id": company_id}"#);
        assert_eq!(parsed.to_source(), "{'default_company_id': company_id}");
    }

    #[test]
    fn string_content_with_single_quote_keeps_double_quotes() {
        let parsed = parse(r#"["can't stop"]"#);
        assert_eq!(parsed.to_source(), r#"["can't stop"]"#);
    }

    #[test]
    fn multi_line_dict_collapses_to_one_line() {
        let parsed = parse(
            "{\n    'default_currency_id': (\n        currency_id != company_currency_id and currency_id or False\n    ),\n    'default_name': 'The company name',\n}",
        );
        assert_eq!(
            parsed.to_source(),
            "{'default_currency_id': currency_id != company_currency_id and currency_id or False, 'default_name': 'The company name'}"
        );
    }

    #[test]
    fn tuple_items_inside_lists_keep_their_parens() {
        let parsed = parse("[('state', '=', 'confirm')]");
        assert_eq!(
            parsed,
            ExpressionLiteral::List(vec!["('state', '=', 'confirm')".to_owned()])
        );
    }

    #[test]
    fn single_element_tuple_keeps_trailing_comma() {
        let parsed = parse("('draft',)");
        assert_eq!(parsed, ExpressionLiteral::Tuple(vec!["'draft'".to_owned()]));
        assert_eq!(parsed.to_source(), "('draft',)");
    }

    #[test]
    fn parenthesized_expression_unwraps_to_bare_expression() {
        let parsed = parse("(journal_id)");
        assert_eq!(
            parsed,
            ExpressionLiteral::Expression("journal_id".to_owned())
        );
    }

    #[test]
    fn bare_comma_sequence_parses_as_tuple() {
        let parsed = parse("journal_id, company_id");
        assert_eq!(parsed.to_source(), "(journal_id, company_id)");
    }

    #[test]
    fn call_and_subscript_stay_attached() {
        let parsed = parse("{'default_company_id': allowed_company_ids[0], 'uid': user.id}");
        assert_eq!(
            parsed.to_source(),
            "{'default_company_id': allowed_company_ids[0], 'uid': user.id}"
        );
    }

    #[test]
    fn unary_minus_stays_attached_to_number() {
        let parsed = parse("[-1, limit - 1]");
        assert_eq!(parsed.to_source(), "[-1, limit - 1]");
    }

    #[test]
    fn keyword_argument_equals_stays_tight() {
        let parsed = parse("{'records': records.filtered(active=True)}");
        assert_eq!(
            parsed.to_source(),
            "{'records': records.filtered(active=True)}"
        );
    }

    #[test]
    fn duplicate_keys_keep_last_value_at_first_position() {
        let parsed = parse("{'a': 1, 'b': 2, 'a': 3}");
        assert_eq!(parsed.to_source(), "{'a': 3, 'b': 2}");
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(ExpressionLiteral::parse("   ").is_err());
    }

    #[test]
    fn unterminated_string_is_rejected() {
        assert!(ExpressionLiteral::parse("{'a': 'oops}").is_err());
    }

    #[test]
    fn unbalanced_brackets_are_rejected() {
        assert!(ExpressionLiteral::parse("[('state', '=', 'confirm')").is_err());
        assert!(ExpressionLiteral::parse("('state'))").is_err());
    }

    #[test]
    fn stray_character_is_rejected() {
        assert!(ExpressionLiteral::parse("{'a': $1}").is_err());
    }

    #[test]
    fn dict_with_trailing_comma_parses() {
        let parsed = parse("{'required': [('state', '!=', 'draft')],}");
        assert_eq!(parsed.to_source(), "{'required': [('state', '!=', 'draft')]}");
    }

    #[test]
    fn empty_collections_serialize_bare() {
        assert_eq!(parse("{}").to_source(), "{}");
        assert_eq!(parse("[]").to_source(), "[]");
        assert_eq!(parse("()").to_source(), "()");
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::ExpressionLiteral;

    fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,8}"
    }

    fn arb_string_literal() -> impl Strategy<Value = String> {
        "'[a-z0-9 @.]{0,10}'"
    }

    fn arb_integer() -> impl Strategy<Value = String> {
        "-?[0-9]{1,4}"
    }

    fn arb_value() -> impl Strategy<Value = String> {
        prop_oneof![arb_identifier(), arb_string_literal(), arb_integer()]
    }

    fn arb_dict_text() -> impl Strategy<Value = String> {
        proptest::collection::vec((arb_string_literal(), arb_value()), 0..6).prop_map(|entries| {
            let parts: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!(" {key} :  {value}"))
                .collect();
            format!("{{{}}}", parts.join(" , "))
        })
    }

    proptest! {
        #[test]
        fn canonical_serialization_is_a_fixpoint(text in arb_dict_text()) {
            let canonical = ExpressionLiteral::parse(&text)
                .unwrap_or_else(|_| unreachable!())
                .to_source();
            let reparsed = ExpressionLiteral::parse(&canonical)
                .unwrap_or_else(|_| unreachable!())
                .to_source();
            prop_assert_eq!(reparsed, canonical);
        }

        #[test]
        fn whitespace_never_changes_canonical_output(
            value in arb_value(),
            padding in "[ \t\n]{0,4}",
        ) {
            let spaced = format!("[{padding}{value}{padding}]");
            let tight = format!("[{value}]");
            let left = ExpressionLiteral::parse(&spaced)
                .unwrap_or_else(|_| unreachable!())
                .to_source();
            let right = ExpressionLiteral::parse(&tight)
                .unwrap_or_else(|_| unreachable!())
                .to_source();
            prop_assert_eq!(left, right);
        }
    }
}
