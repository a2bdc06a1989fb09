//! Recursive-descent parser producing the `ast::Expr`/`ast::Stmt` shapes the
//! resolver and evaluator consume.
//!
//! Not part of the core under specification, but the core needs *something*
//! upstream of it to exercise end-to-end in tests, so it is written in the
//! same idiom as the rest of the crate rather than stubbed out.

use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, FunctionDecl, LogicalOp, Name, Stmt, UnaryOp};
use crate::config::MAX_PARAMETERS;
use crate::exception::{Diagnostic, Report};
use crate::intern::Interns;
use crate::token::{Literal, Token, TokenType};

struct ParseError;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    interns: &'a Interns,
    report: Report,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(tokens: Vec<Token>, interns: &'a Interns) -> Self {
        Self { tokens, current: 0, interns, report: Report::new() }
    }

    #[must_use]
    pub fn parse(mut self) -> (Vec<Stmt>, Report) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(ParseError) => self.synchronize(),
            }
        }
        (statements, self.report)
    }

    // -- Token stream helpers ---------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenType::Eof
    }

    fn check(&self, kind: TokenType) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn matches(&mut self, kinds: &[TokenType]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenType, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(self.error(self.peek().clone(), message))
    }

    fn error(&mut self, token: Token, message: impl Into<String>) -> ParseError {
        let location = if token.kind == TokenType::Eof { " at end".to_owned() } else { format!(" at '{}'", self.interns.get(token.lexeme)) };
        self.report.push(Diagnostic { line: token.line, location, message: message.into() });
        ParseError
    }

    /// Errors without raising a `ParseError`, used for the arity-cap rules
    /// which are reported but must not abort parsing.
    fn warn(&mut self, token: &Token, message: impl Into<String>) {
        let location = if token.kind == TokenType::Eof { " at end".to_owned() } else { format!(" at '{}'", self.interns.get(token.lexeme)) };
        self.report.push(Diagnostic { line: token.line, location, message: message.into() });
    }

    /// Discards tokens until a likely statement boundary, so one parse error
    /// doesn't cascade into unrelated diagnostics.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenType::Semicolon {
                return;
            }
            if matches!(
                self.peek().kind,
                TokenType::Class
                    | TokenType::Fun
                    | TokenType::Var
                    | TokenType::For
                    | TokenType::If
                    | TokenType::While
                    | TokenType::Print
                    | TokenType::Return
            ) {
                return;
            }
            self.advance();
        }
    }

    // -- Declarations ------------------------------------------------------

    fn declaration(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(&[TokenType::Class]) {
            return self.class_declaration();
        }
        if self.matches(&[TokenType::Fun]) {
            return Ok(Stmt::Function(Rc::new(self.function("function")?)));
        }
        if self.matches(&[TokenType::Var]) {
            return self.var_declaration();
        }
        self.statement()
    }

    fn class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenType::Identifier, "Expect class name.")?;

        let superclass = if self.matches(&[TokenType::Less]) {
            let superclass_name = self.consume(TokenType::Identifier, "Expect superclass name.")?;
            Some(Name::new(superclass_name))
        } else {
            None
        };

        self.consume(TokenType::LeftBrace, "Expect '{' before class body.")?;
        let mut methods = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            methods.push(Rc::new(self.function("method")?));
        }
        self.consume(TokenType::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class { name, name_resolution: None, superclass, methods })
    }

    fn function(&mut self, kind: &str) -> Result<FunctionDecl, ParseError> {
        let name = self.consume(TokenType::Identifier, &format!("Expect {kind} name."))?;
        self.consume(TokenType::LeftParen, &format!("Expect '(' after {kind} name."))?;
        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                if params.len() >= MAX_PARAMETERS {
                    let token = self.peek().clone();
                    self.warn(&token, format!("Cannot have more than {MAX_PARAMETERS} parameters."));
                }
                params.push(self.consume(TokenType::Identifier, "Expect parameter name.")?);
                if !self.matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenType::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenType::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;
        Ok(FunctionDecl { name, params, body: Rc::new(body) })
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenType::Identifier, "Expect variable name.")?;
        let initializer = if self.matches(&[TokenType::Equal]) { Some(self.expression()?) } else { None };
        self.consume(TokenType::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    // -- Statements ------------------------------------------------------

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(&[TokenType::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenType::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenType::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenType::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenType::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenType::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    /// Desugars `for` into a `while` loop, wrapped in a block when there's an
    /// initializer, per the AST input contract's "for arrives pre-desugared".
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenType::Semicolon]) {
            None
        } else if self.matches(&[TokenType::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition =
            if self.check(TokenType::Semicolon) { None } else { Some(self.expression()?) };
        self.consume(TokenType::Semicolon, "Expect ';' after loop condition.")?;

        let increment =
            if self.check(TokenType::RightParen) { None } else { Some(self.expression()?) };
        self.consume(TokenType::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(Token::new(
            TokenType::True,
            self.previous().lexeme,
            Literal::None,
            self.previous().line,
            self.previous().span,
        )));
        body = Stmt::While { condition, body: Box::new(body) };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch =
            if self.matches(&[TokenType::Else]) { Some(Box::new(self.statement()?)) } else { None };
        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        let value = if self.check(TokenType::Semicolon) { None } else { Some(self.expression()?) };
        self.consume(TokenType::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume(TokenType::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // -- Expressions -----------------------------------------------------

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.or()?;

        if self.matches(&[TokenType::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign { name, value: Box::new(value) }),
                Expr::Get { object, name } => Ok(Expr::Set { object, name, value: Box::new(value) }),
                _ => Err(self.error(equals, "Invalid assignment target.")),
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.matches(&[TokenType::Or]) {
            let right = self.and()?;
            expr = Expr::Logical { left: Box::new(expr), op: LogicalOp::Or, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenType::And]) {
            let right = self.equality()?;
            expr = Expr::Logical { left: Box::new(expr), op: LogicalOp::And, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenType::BangEqual => BinaryOp::NotEqual,
                TokenType::EqualEqual => BinaryOp::Equal,
                _ => break,
            };
            let op_line = self.advance().line;
            let right = self.comparison()?;
            expr = Expr::Binary { left: Box::new(expr), op, op_line, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenType::Greater => BinaryOp::Greater,
                TokenType::GreaterEqual => BinaryOp::GreaterEqual,
                TokenType::Less => BinaryOp::Less,
                TokenType::LessEqual => BinaryOp::LessEqual,
                _ => break,
            };
            let op_line = self.advance().line;
            let right = self.term()?;
            expr = Expr::Binary { left: Box::new(expr), op, op_line, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenType::Minus => BinaryOp::Subtract,
                TokenType::Plus => BinaryOp::Add,
                _ => break,
            };
            let op_line = self.advance().line;
            let right = self.factor()?;
            expr = Expr::Binary { left: Box::new(expr), op, op_line, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenType::Slash => BinaryOp::Divide,
                TokenType::Star => BinaryOp::Multiply,
                _ => break,
            };
            let op_line = self.advance().line;
            let right = self.unary()?;
            expr = Expr::Binary { left: Box::new(expr), op, op_line, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenType::Bang => UnaryOp::Not,
            TokenType::Minus => UnaryOp::Negate,
            _ => return self.call(),
        };
        let op_line = self.advance().line;
        let right = self.unary()?;
        Ok(Expr::Unary { op, op_line, right: Box::new(right) })
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenType::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenType::Dot]) {
                let name = self.consume(TokenType::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get { object: Box::new(expr), name };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                if args.len() >= MAX_PARAMETERS {
                    self.warn(self.peek(), format!("Cannot have more than {MAX_PARAMETERS} arguments."));
                }
                args.push(self.expression()?);
                if !self.matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        let close_paren = self.consume(TokenType::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call { callee: Box::new(callee), close_paren_line: close_paren.line, args })
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenType::False, TokenType::True, TokenType::Nil, TokenType::Number, TokenType::String]) {
            return Ok(Expr::Literal(self.previous().clone()));
        }
        if self.matches(&[TokenType::Super]) {
            let keyword = self.previous().clone();
            self.consume(TokenType::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(TokenType::Identifier, "Expect superclass method name.")?;
            return Ok(Expr::Super { keyword, method, resolution: None });
        }
        if self.matches(&[TokenType::This]) {
            return Ok(Expr::This { keyword: self.previous().clone(), resolution: None });
        }
        if self.matches(&[TokenType::Identifier]) {
            return Ok(Expr::Variable(Name::new(self.previous().clone())));
        }
        if self.matches(&[TokenType::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenType::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        Err(self.error(self.peek().clone(), "Expect expression."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner;

    fn parse(source: &str) -> (Vec<Stmt>, Report) {
        let mut interns = Interns::new();
        let (tokens, scan_errors) = scanner::scan(source, &mut interns);
        assert!(scan_errors.is_empty());
        Parser::new(tokens, &interns).parse()
    }

    #[test]
    fn parses_a_print_statement() {
        let (statements, report) = parse("print 1 + 2;");
        assert!(!report.had_error());
        assert!(matches!(statements[0], Stmt::Print(_)));
    }

    #[test]
    fn for_loop_desugars_to_a_while_wrapped_in_a_block() {
        let (statements, report) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!report.had_error());
        let Stmt::Block(block) = &statements[0] else { panic!("expected desugared block") };
        assert!(matches!(block[0], Stmt::Var { .. }));
        assert!(matches!(block[1], Stmt::While { .. }));
    }

    #[test]
    fn missing_semicolon_is_a_parse_error() {
        let (_, report) = parse("print 1");
        assert!(report.had_error());
        assert_eq!(report.diagnostics()[0].message, "Expect ';' after value.");
    }

    #[test]
    fn invalid_assignment_target_is_reported_without_aborting() {
        let (_, report) = parse("1 = 2;");
        assert!(report.had_error());
        assert_eq!(report.diagnostics()[0].message, "Invalid assignment target.");
    }

    #[test]
    fn superclass_clause_is_parsed() {
        let (statements, report) = parse("class A {} class B < A {}");
        assert!(!report.had_error());
        let Stmt::Class { superclass, .. } = &statements[1] else { panic!("expected a class") };
        assert!(superclass.is_some());
    }
}
