//! Recursive-descent parser over the token stream of §6's grammar.

use vast_value::TypeTag;

use crate::ast::{ArithOp, BinaryQueryOp, Clause, Expr, Query, Tag, UnaryClause};
use crate::error::ParseError;
use crate::lexer::{tokenize, Token};

pub fn parse(input: &str) -> Result<Query, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let query = parser.parse_query()?;
    if parser.pos != parser.tokens.len() {
        return Err(ParseError::TrailingInput(format!("{:?}", &parser.tokens[parser.pos..])));
    }
    Ok(query)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: &Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(tok) if &tok == want => Ok(()),
            Some(tok) => Err(ParseError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token::Ident(s)) => Ok(s),
            Some(tok) => Err(ParseError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    // query := unary ( ( "&&" | "||" ) unary )*
    fn parse_query(&mut self) -> Result<Query, ParseError> {
        let mut query = Query::Unary(self.parse_unary()?);
        loop {
            let op = match self.peek() {
                Some(Token::AndAnd) => BinaryQueryOp::And,
                Some(Token::OrOr) => BinaryQueryOp::Or,
                _ => break,
            };
            self.advance();
            let rhs = Query::Unary(self.parse_unary()?);
            query = Query::Binary(Box::new(query), op, Box::new(rhs));
        }
        Ok(query)
    }

    // unary := ( "!" unary ) | clause
    fn parse_unary(&mut self) -> Result<UnaryClause, ParseError> {
        if matches!(self.peek(), Some(Token::Bang)) {
            self.advance();
            return Ok(UnaryClause::Not(Box::new(self.parse_unary()?)));
        }
        if matches!(self.peek(), Some(Token::LParen)) {
            self.advance();
            let query = self.parse_query()?;
            self.expect(&Token::RParen)?;
            return Ok(UnaryClause::Group(Box::new(query)));
        }
        self.parse_clause()
    }

    // clause := event_clause | type_clause | tag_clause
    fn parse_clause(&mut self) -> Result<UnaryClause, ParseError> {
        match self.peek() {
            Some(Token::At) => self.parse_type_clause(),
            Some(Token::Amp) => self.parse_tag_clause(),
            Some(Token::Ident(_)) => self.parse_event_clause(),
            Some(tok) => Err(ParseError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    // event_clause := ident ("." ident)+ rel_op expr
    fn parse_event_clause(&mut self) -> Result<UnaryClause, ParseError> {
        let mut path = self.expect_ident()?;
        while matches!(self.peek(), Some(Token::Dot)) {
            self.advance();
            path.push('.');
            path.push_str(&self.expect_ident()?);
        }
        let op = self.expect_rel_op()?;
        let expr = self.parse_expr()?;
        Ok(UnaryClause::Clause(Clause::Event { path, op, expr }))
    }

    // type_clause := "@" type_name rel_op expr
    fn parse_type_clause(&mut self) -> Result<UnaryClause, ParseError> {
        self.expect(&Token::At)?;
        let name = self.expect_ident()?;
        let type_name = parse_type_name(&name)?;
        let op = self.expect_rel_op()?;
        let expr = self.parse_expr()?;
        Ok(UnaryClause::Clause(Clause::Type { type_name, op, expr }))
    }

    // tag_clause := ("&name" | "&time" | "&id") rel_op expr
    fn parse_tag_clause(&mut self) -> Result<UnaryClause, ParseError> {
        self.expect(&Token::Amp)?;
        let name = self.expect_ident()?;
        let tag = match name.as_str() {
            "name" => Tag::Name,
            "time" => Tag::Time,
            "id" => Tag::Id,
            other => return Err(ParseError::UnexpectedToken(format!("tag '&{other}'"))),
        };
        let op = self.expect_rel_op()?;
        let expr = self.parse_expr()?;
        Ok(UnaryClause::Clause(Clause::Tag { tag, op, expr }))
    }

    fn expect_rel_op(&mut self) -> Result<vast_index::ClauseOp, ParseError> {
        match self.advance() {
            Some(Token::RelOp(op)) => Ok(op),
            Some(tok) => Err(ParseError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    // expr := term ( ("+" | "-") term )*
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    // term := factor ( ("*" | "/") factor )*
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    // factor := "-" factor | literal | "(" expr ")"
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some(Token::Minus) => Ok(Expr::Neg(Box::new(self.parse_factor()?))),
            Some(Token::Literal(v)) => Ok(Expr::Literal(v)),
            Some(Token::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(tok) => Err(ParseError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}

fn parse_type_name(s: &str) -> Result<TypeTag, ParseError> {
    Ok(match s {
        "bool" => TypeTag::Bool,
        "int" => TypeTag::Int,
        "uint" => TypeTag::UInt,
        "double" => TypeTag::Double,
        "duration" => TypeTag::Duration,
        "timepoint" => TypeTag::TimePoint,
        "string" => TypeTag::String,
        "pattern" => TypeTag::Pattern,
        "address" => TypeTag::Address,
        "prefix" => TypeTag::Subnet,
        "port" => TypeTag::Port,
        "vector" => TypeTag::Vector,
        "set" => TypeTag::Set,
        "table" => TypeTag::Table,
        "record" => TypeTag::Record,
        other => return Err(ParseError::UnexpectedToken(format!("type name '{other}'"))),
    })
}
