//! Arithmetic over a sanitized expression. Only digits, `+ - * / ( ) .`
//! and spaces ever reach the evaluator.

use super::{wrong_command, Handler};
use crate::context::HandlerContext;
use crate::error::HandlerError;
use crate::os::Platform;
use async_trait::async_trait;
use deskpilot_core::{Intent, ParseOutcome, ParsedCommand};
use deskpilot_memory::ChatHistory;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("no valid expression found")]
    Empty,
    #[error("unexpected '{0}' at position {1}")]
    Unexpected(char, usize),
    #[error("expression ends early")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Nesting bound for parentheses and unary signs.
pub const MAX_DEPTH: usize = 256;

/// Drops every character outside `[0-9+\-*/(). ]`.
pub fn sanitize(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| c.is_ascii_digit() || "+-*/(). ".contains(*c))
        .collect()
}

pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens: Vec<char> = sanitize(expression).chars().collect();
    if tokens.iter().all(|c| *c == ' ') {
        return Err(CalcError::Empty);
    }

    let mut parser = Evaluator {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if let Some(c) = parser.peek() {
        return Err(CalcError::Unexpected(c, parser.pos));
    }
    if !value.is_finite() {
        return Err(CalcError::NonFinite);
    }
    Ok(value)
}

/// Whole numbers print without a fractional part.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

// expression := term (('+' | '-') term)*
// term       := factor (('*' | '/') factor)*
// factor     := ('+' | '-') factor | number | '(' expression ')'
struct Evaluator {
    tokens: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Evaluator {
    /// Next non-space character.
    fn peek(&mut self) -> Option<char> {
        while self.tokens.get(self.pos) == Some(&' ') {
            self.pos += 1;
        }
        self.tokens.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == '*' {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = self.unary_or_atom();
        self.depth -= 1;
        value
    }

    fn unary_or_atom(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some('+') => {
                self.pos += 1;
                self.factor()
            }
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expression()?;
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(c) => Err(CalcError::Unexpected(c, self.pos)),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(CalcError::Unexpected(c, self.pos)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit() || *c == '.')
        {
            self.pos += 1;
        }
        let literal: String = self.tokens[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| CalcError::InvalidNumber(literal))
    }
}

fn calculator_app(platform: Platform) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Windows => ("calc.exe", Vec::new()),
        Platform::MacOs => ("open", vec!["-a".to_string(), "Calculator".to_string()]),
        Platform::Linux => ("gnome-calculator", Vec::new()),
    }
}

pub struct CalculatorHandler;

#[async_trait]
impl Handler for CalculatorHandler {
    fn intent(&self) -> Intent {
        Intent::Calculate
    }

    fn description(&self) -> &str {
        "Evaluate arithmetic such as 'calculate (3+5)*2'"
    }

    async fn execute(
        &self,
        ctx: &HandlerContext,
        _history: &ChatHistory,
        command: ParseOutcome<ParsedCommand>,
    ) -> Result<String, HandlerError> {
        let command = match command.into_value() {
            ParsedCommand::Calculate(cmd) => cmd,
            other => return Err(wrong_command(Intent::Calculate, &other)),
        };

        let value = evaluate(&command.expression)
            .map_err(|e| HandlerError::InvalidInput(format!("Calculation error: {}", e)))?;
        tracing::info!(expression = %command.expression, value, "Evaluated");

        if ctx.settings.open_calculator {
            let (program, args) = calculator_app(ctx.settings.platform);
            if let Err(e) = ctx.spawner.spawn(program, &args).await {
                tracing::warn!(error = %e, "Could not open the desktop calculator");
            }
        }

        Ok(format!(
            "Result: {} = {}",
            command.expression.trim(),
            format_value(value)
        ))
    }
}
