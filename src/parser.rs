// ABOUTME: Recursive-descent parser turning a token stream into statement/expression trees

use crate::ast::{ExceptClause, Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::error::ParseError;
use crate::token::{Literal, Token, TokenKind};
use std::rc::Rc;

const MAX_PARAMS: usize = 255;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: ExprId,
    errors: Vec<ParseError>,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0, next_id: 0, errors: Vec::new() }
    }

    /// Parses the whole token stream, returning the statements parsed so
    /// far (a partial AST if errors occurred) and the accumulated errors.
    /// The driver must not run the resolver if `errors` is non-empty.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        (statements, self.errors)
    }

    fn fresh_id(&mut self) -> ExprId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---- token cursor ----

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> PResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error(message))
    }

    fn error(&self, message: &str) -> ParseError {
        let tok = self.peek();
        ParseError::UnexpectedToken {
            expected: message.to_string(),
            found: tok.lexeme.clone(),
            line: tok.line,
            column: tok.column,
        }
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            use TokenKind::*;
            if matches!(
                self.peek().kind,
                Class | Fun | Var | For | If | While | Print | Return | Throw
            ) {
                return;
            }
            self.advance();
        }
    }

    // ---- declarations ----

    fn declaration(&mut self) -> PResult<Stmt> {
        if self.matches(&[TokenKind::Var]) {
            return self.var_declaration();
        }
        if self.matches(&[TokenKind::Fun]) {
            return Ok(Stmt::Function(self.function("function")?));
        }
        if self.matches(&[TokenKind::Class]) {
            return self.class_declaration();
        }
        self.statement()
    }

    fn var_declaration(&mut self) -> PResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "variable name")?;
        let initializer = if self.matches(&[TokenKind::Equal]) { Some(self.expression()?) } else { None };
        self.consume(TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn function(&mut self, kind: &str) -> PResult<Rc<FunctionDecl>> {
        let name = self.consume(TokenKind::Identifier, &format!("{kind} name"))?;
        self.consume(TokenKind::LeftParen, &format!("'(' after {kind} name"))?;
        let params = self.parse_params()?;
        self.consume(TokenKind::RightParen, "')' after parameters")?;
        self.consume(TokenKind::LeftBrace, &format!("'{{' before {kind} body"))?;
        let body = self.block()?;
        Ok(Rc::new(FunctionDecl { name, params, body: Rc::new(body) }))
    }

    fn parse_params(&mut self) -> PResult<Vec<Token>> {
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_PARAMS {
                    let tok = self.peek();
                    self.errors.push(ParseError::TooManyParameters { line: tok.line, column: tok.column });
                    self.consume(TokenKind::Identifier, "parameter name")?;
                } else {
                    params.push(self.consume(TokenKind::Identifier, "parameter name")?);
                }
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        Ok(params)
    }

    fn class_declaration(&mut self) -> PResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "class name")?;
        let superclass = if self.matches(&[TokenKind::Less]) {
            let super_name = self.consume(TokenKind::Identifier, "superclass name")?;
            let id = self.fresh_id();
            Some(Expr::Variable { id, name: super_name })
        } else {
            None
        };

        self.consume(TokenKind::LeftBrace, "'{' before class body")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }
        self.consume(TokenKind::RightBrace, "'}' after class body")?;
        Ok(Stmt::Class { name, superclass, methods })
    }

    // ---- statements ----

    fn statement(&mut self) -> PResult<Stmt> {
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::Break]) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::Semicolon, "';' after 'break'")?;
            return Ok(Stmt::Break { keyword });
        }
        if self.matches(&[TokenKind::Continue]) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::Semicolon, "';' after 'continue'")?;
            return Ok(Stmt::Continue { keyword });
        }
        if self.matches(&[TokenKind::Throw]) {
            return self.throw_statement();
        }
        if self.matches(&[TokenKind::Try]) {
            return self.try_statement();
        }
        if self.matches(&[TokenKind::Import]) {
            return self.import_statement();
        }
        self.expression_statement()
    }

    fn print_statement(&mut self) -> PResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "';' after value")?;
        Ok(Stmt::Print(value))
    }

    fn block(&mut self) -> PResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration().unwrap_or_else(|e| {
                self.record_and_sync(e)
            }));
        }
        self.consume(TokenKind::RightBrace, "'}' after block")?;
        Ok(statements)
    }

    /// Records a declaration error and synchronizes, returning a harmless
    /// placeholder statement so block parsing can keep collecting further
    /// diagnostics instead of aborting the whole block.
    fn record_and_sync(&mut self, e: ParseError) -> Stmt {
        self.errors.push(e);
        self.synchronize();
        Stmt::Expression(Expr::Literal { id: self.next_id, value: LiteralValue::Nil })
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LeftParen, "'(' after 'if'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after if condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) { Some(Box::new(self.statement()?)) } else { None };
        Ok(Stmt::If { cond, then_branch, else_branch })
    }

    fn while_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LeftParen, "'(' after 'while'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after while condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { cond, body, is_for_desugared: false, increment: None })
    }

    /// Desugars `for (init; cond; incr) body` into
    /// `Block([init, While(cond, Block([body, incr]), isForDesugared=true, incr)])`
    /// so `continue` inside the body can still run `incr` before retesting.
    fn for_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LeftParen, "'(' after 'for'")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            self.expression()?
        } else {
            let id = self.fresh_id();
            Expr::Literal { id, value: LiteralValue::Bool(true) }
        };
        self.consume(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if !self.check(TokenKind::RightParen) { Some(self.expression()?) } else { None };
        self.consume(TokenKind::RightParen, "')' after for clauses")?;

        let body = self.statement()?;

        let while_stmt = Stmt::While {
            cond: condition,
            body: Box::new(body),
            is_for_desugared: true,
            increment,
        };

        let result = match initializer {
            Some(init) => Stmt::Block(vec![init, while_stmt]),
            None => while_stmt,
        };
        Ok(result)
    }

    fn return_statement(&mut self) -> PResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenKind::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(TokenKind::Semicolon, "';' after return value")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn throw_statement(&mut self) -> PResult<Stmt> {
        let keyword = self.previous().clone();
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "';' after thrown value")?;
        Ok(Stmt::Throw { keyword, value })
    }

    fn try_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LeftBrace, "'{' after 'try'")?;
        let try_block = self.block()?;

        let except = if self.matches(&[TokenKind::Except]) {
            self.consume(TokenKind::LeftParen, "'(' after 'except'")?;
            let name = self.consume(TokenKind::Identifier, "exception variable name")?;
            self.consume(TokenKind::RightParen, "')' after exception variable name")?;
            self.consume(TokenKind::LeftBrace, "'{' after 'except (...)'")?;
            let body = self.block()?;
            Some(ExceptClause { name, body })
        } else {
            None
        };

        let finally = if self.matches(&[TokenKind::Finally]) {
            self.consume(TokenKind::LeftBrace, "'{' after 'finally'")?;
            Some(self.block()?)
        } else {
            None
        };

        if except.is_none() && finally.is_none() {
            return Err(self.error("'except' or 'finally' after 'try' block"));
        }

        Ok(Stmt::Try { try_block, except, finally })
    }

    fn import_statement(&mut self) -> PResult<Stmt> {
        let path = self.consume(TokenKind::String, "module path string")?;
        self.consume(TokenKind::Semicolon, "';' after import path")?;
        Ok(Stmt::Import { path })
    }

    fn expression_statement(&mut self) -> PResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::Expression(expr))
    }

    // ---- expressions ----

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.logic_or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            let id = self.fresh_id();

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::Assign { id, name, value: Box::new(value) }),
                Expr::Get { object, name, .. } => Ok(Expr::Set { id, object, name, value: Box::new(value) }),
                Expr::Index { object, bracket, key, .. } => {
                    Ok(Expr::IndexSet { id, object, bracket, key, value: Box::new(value) })
                }
                _ => Err(ParseError::InvalidAssignmentTarget { line: equals.line, column: equals.column }),
            };
        }

        Ok(expr)
    }

    fn logic_or(&mut self) -> PResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let right = self.logic_and()?;
            let id = self.fresh_id();
            expr = Expr::Logical { id, left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> PResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            let id = self.fresh_id();
            expr = Expr::Logical { id, left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        let mut expr = self.comparison()?;
        while self.matches(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let op = self.previous().clone();
            let right = self.comparison()?;
            let id = self.fresh_id();
            expr = Expr::Binary { id, left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let mut expr = self.term()?;
        while self.matches(&[TokenKind::Greater, TokenKind::GreaterEqual, TokenKind::Less, TokenKind::LessEqual]) {
            let op = self.previous().clone();
            let right = self.term()?;
            let id = self.fresh_id();
            expr = Expr::Binary { id, left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn term(&mut self) -> PResult<Expr> {
        let mut expr = self.factor()?;
        while self.matches(&[TokenKind::Minus, TokenKind::Plus]) {
            let op = self.previous().clone();
            let right = self.factor()?;
            let id = self.fresh_id();
            expr = Expr::Binary { id, left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> PResult<Expr> {
        let mut expr = self.unary()?;
        while self.matches(&[TokenKind::Star, TokenKind::Slash, TokenKind::Backslash, TokenKind::Percent, TokenKind::Caret]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            let id = self.fresh_id();
            expr = Expr::Binary { id, left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            let id = self.fresh_id();
            return Ok(Expr::Unary { id, op, right: Box::new(right) });
        }
        self.call()
    }

    fn call(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenKind::Dot]) {
                let name = self.consume(TokenKind::Identifier, "property name after '.'")?;
                let id = self.fresh_id();
                expr = Expr::Get { id, object: Box::new(expr), name };
            } else if self.matches(&[TokenKind::LeftBracket]) {
                let key = self.expression()?;
                let bracket = self.consume(TokenKind::RightBracket, "']' after index")?;
                let id = self.fresh_id();
                expr = Expr::Index { id, object: Box::new(expr), bracket, key: Box::new(key) };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> PResult<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_PARAMS {
                    let tok = self.peek();
                    self.errors.push(ParseError::TooManyParameters { line: tok.line, column: tok.column });
                    self.expression()?;
                } else {
                    args.push(self.expression()?);
                }
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "')' after arguments")?;
        let id = self.fresh_id();
        Ok(Expr::Call { id, callee: Box::new(callee), paren, args })
    }

    fn primary(&mut self) -> PResult<Expr> {
        let id = self.fresh_id();

        if self.matches(&[TokenKind::False]) {
            return Ok(Expr::Literal { id, value: LiteralValue::Bool(false) });
        }
        if self.matches(&[TokenKind::True]) {
            return Ok(Expr::Literal { id, value: LiteralValue::Bool(true) });
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(Expr::Literal { id, value: LiteralValue::Nil });
        }
        if self.matches(&[TokenKind::Number]) {
            let n = match &self.previous().literal {
                Literal::Number(n) => *n,
                _ => unreachable!("number token without numeric literal"),
            };
            return Ok(Expr::Literal { id, value: LiteralValue::Number(n) });
        }
        if self.matches(&[TokenKind::String]) {
            let s = match &self.previous().literal {
                Literal::Str(s) => s.clone(),
                _ => unreachable!("string token without string literal"),
            };
            return Ok(Expr::Literal { id, value: LiteralValue::String(s) });
        }
        if self.matches(&[TokenKind::This]) {
            return Ok(Expr::This { id, keyword: self.previous().clone() });
        }
        if self.matches(&[TokenKind::Super]) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::Dot, "'.' after 'super'")?;
            let method = self.consume(TokenKind::Identifier, "superclass method name")?;
            return Ok(Expr::Super { id, keyword, method });
        }
        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable { id, name: self.previous().clone() });
        }
        if self.matches(&[TokenKind::LeftParen]) {
            let inner = self.expression()?;
            self.consume(TokenKind::RightParen, "')' after expression")?;
            return Ok(Expr::Grouping { id, inner: Box::new(inner) });
        }
        if self.matches(&[TokenKind::LeftBracket]) {
            return self.list_literal(id);
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return self.dict_literal(id);
        }
        if self.matches(&[TokenKind::Lambda]) {
            return self.lambda_literal(id);
        }

        Err(self.error("expression"))
    }

    fn list_literal(&mut self, id: ExprId) -> PResult<Expr> {
        let mut elements = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBracket, "']' after list elements")?;
        Ok(Expr::List { id, elements })
    }

    fn dict_literal(&mut self, id: ExprId) -> PResult<Expr> {
        let mut pairs = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                let key = self.expression()?;
                self.consume(TokenKind::Colon, "':' after dict key")?;
                let value = self.expression()?;
                pairs.push((key, value));
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBrace, "'}' after dict entries")?;
        Ok(Expr::Dict { id, pairs })
    }

    fn lambda_literal(&mut self, id: ExprId) -> PResult<Expr> {
        self.consume(TokenKind::LeftParen, "'(' after 'lambda'")?;
        let params = self.parse_params()?;
        self.consume(TokenKind::RightParen, "')' after lambda parameters")?;
        self.consume(TokenKind::LeftBrace, "'{' before lambda body")?;
        let body = self.block()?;
        Ok(Expr::Lambda { id, params, body: Rc::new(body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<ParseError>) {
        let (tokens, lex_errors) = Lexer::new(source).scan();
        assert!(lex_errors.is_empty(), "unexpected lex errors: {lex_errors:?}");
        Parser::new(tokens).parse()
    }

    fn parse_ok(source: &str) -> Vec<Stmt> {
        let (statements, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        statements
    }

    #[test]
    fn binary_precedence_groups_multiplication_before_addition() {
        let statements = parse_ok("1 + 2 * 3;");
        match &statements[0] {
            Stmt::Expression(Expr::Binary { op, right, .. }) => {
                assert_eq!(op.lexeme, "+");
                assert!(matches!(right.as_ref(), Expr::Binary { op, .. } if op.lexeme == "*"));
            }
            other => panic!("expected a binary expression statement, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_desugars_into_while_with_a_separate_increment() {
        let statements = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");
        match &statements[0] {
            Stmt::Block(block) => match &block[1] {
                Stmt::While { is_for_desugared, increment, .. } => {
                    assert!(is_for_desugared);
                    assert!(increment.is_some());
                }
                other => panic!("expected the desugared while loop, got {other:?}"),
            },
            other => panic!("expected a block wrapping the for-loop's initializer, got {other:?}"),
        }
    }

    #[test]
    fn more_than_255_parameters_is_a_parse_error() {
        let params = (0..256).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
        let source = format!("fun f({params}) {{}}");
        let (_, errors) = parse(&source);
        assert!(errors.iter().any(|e| matches!(e, ParseError::TooManyParameters { .. })));
    }

    #[test]
    fn too_many_parameters_does_not_swallow_later_statements() {
        let params = (0..256).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
        let source = format!("fun f({params}) {{}} print 1;");
        let (statements, errors) = parse(&source);
        assert!(errors.iter().any(|e| matches!(e, ParseError::TooManyParameters { .. })));
        assert!(statements.iter().any(|s| matches!(s, Stmt::Print(_))), "expected the trailing print to survive, got {statements:?}");
    }

    #[test]
    fn too_many_call_arguments_does_not_swallow_later_statements() {
        let args = (0..256).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
        let source = format!("f({args}); print 1;");
        let (statements, errors) = parse(&source);
        assert!(errors.iter().any(|e| matches!(e, ParseError::TooManyParameters { .. })));
        assert!(statements.iter().any(|s| matches!(s, Stmt::Print(_))), "expected the trailing print to survive, got {statements:?}");
    }

    #[test]
    fn assigning_to_a_non_lvalue_is_a_parse_error() {
        let (_, errors) = parse("1 + 1 = 2;");
        assert!(errors.iter().any(|e| matches!(e, ParseError::InvalidAssignmentTarget { .. })));
    }

    #[test]
    fn class_declaration_with_superclass_and_methods() {
        let statements = parse_ok("class B < A { speak() { print \"hi\"; } }");
        match &statements[0] {
            Stmt::Class { name, superclass, methods } => {
                assert_eq!(name.lexeme, "B");
                assert!(superclass.is_some());
                assert_eq!(methods.len(), 1);
                assert_eq!(methods[0].name.lexeme, "speak");
            }
            other => panic!("expected a class declaration, got {other:?}"),
        }
    }

    #[test]
    fn try_without_except_or_finally_is_a_parse_error() {
        let (_, errors) = parse("try { 1; }");
        assert!(!errors.is_empty());
    }

    #[test]
    fn a_bad_statement_does_not_stop_later_statements_from_parsing() {
        let (statements, errors) = parse("var x = ; print 1;");
        assert!(!errors.is_empty());
        assert!(statements.iter().any(|s| matches!(s, Stmt::Print(_))));
    }

    #[test]
    fn list_and_dict_literals() {
        // A bare `{` at statement position is always a block (see
        // `statement()`'s dispatch order), so a dict literal only parses at
        // expression position — wrapped here in a `var` initializer.
        let statements = parse_ok("[1, 2, 3]; var d = {\"a\": 1};");
        assert!(matches!(statements[0], Stmt::Expression(Expr::List { .. })));
        assert!(matches!(&statements[1], Stmt::Var { initializer: Some(Expr::Dict { .. }), .. }));
    }
}
