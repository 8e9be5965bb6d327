use log::{debug, trace};

use crate::{
    environment::Environment,
    error::RuntimeError,
    syntax::{
        expr::Expr,
        stmt::Stmt,
        token::{Token, TokenType},
    },
    utils::output::{Output, StdoutOutput},
    value::Value,
};

pub struct Interpreter {
    environment: Environment,
    output: Box<dyn Output>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_output(Box::new(StdoutOutput))
    }

    pub fn with_output(output: Box<dyn Output>) -> Interpreter {
        Interpreter {
            environment: Environment::new(),
            output,
        }
    }

    /// Executes statements in order, stopping at the first runtime error.
    /// Globals defined here stay visible to later calls on the same interpreter.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        debug!("interpreting {} statements", statements.len());
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => self.evaluate(expr).map(|_| ()),
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.output.print(format_args!("{}", value));
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                trace!("define {} = {}", name.lexeme, value);
                self.environment.define(&name.lexeme, value);
                Ok(())
            }
            Stmt::Block(statements) => self.execute_block(statements),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        self.environment.push_scope();
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        // popped on every path, including errors
        self.environment.pop_scope();
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(Value::from(value)),
            Expr::Grouping { expression } => self.evaluate(expression),
            Expr::Unary { operator, right } => self.unary(operator, right),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.binary(left, operator, right),
            Expr::Variable { name } => self.environment.get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
        }
    }

    fn unary(&mut self, operator: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::Minus => match right {
                Value::Number(value) => Ok(Value::Number(-value)),
                _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
            },
            TokenType::Bang => Ok(Value::Boolean(!right.is_truthy())),
            _ => Err(Self::unknown_operator(operator)),
        }
    }

    fn binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            // equality
            TokenType::EqualEqual => return Ok(Value::Boolean(left == right)),
            TokenType::BangEqual => return Ok(Value::Boolean(left != right)),

            TokenType::Plus => {
                return match (left, right) {
                    (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left + right)),
                    (Value::String(mut left), Value::String(right)) => {
                        left.push_str(&right);
                        Ok(Value::String(left))
                    }
                    _ => Err(RuntimeError::new(
                        operator,
                        "Operands must be two numbers or two strings.",
                    )),
                }
            }
            _ => {}
        }

        let (left, right) = match (left, right) {
            (Value::Number(left), Value::Number(right)) => (left, right),
            _ => return Err(RuntimeError::new(operator, "Operands must be numbers.")),
        };

        match operator.token_type {
            // arithmetic
            TokenType::Minus => Ok(Value::Number(left - right)),
            TokenType::Star => Ok(Value::Number(left * right)),
            TokenType::Slash => {
                if right == 0.0 {
                    return Err(RuntimeError::new(operator, "Division by zero."));
                }
                Ok(Value::Number(left / right))
            }

            // comparison
            TokenType::Greater => Ok(Value::Boolean(left > right)),
            TokenType::GreaterEqual => Ok(Value::Boolean(left >= right)),
            TokenType::Less => Ok(Value::Boolean(left < right)),
            TokenType::LessEqual => Ok(Value::Boolean(left <= right)),

            _ => Err(Self::unknown_operator(operator)),
        }
    }

    fn unknown_operator(operator: &Token) -> RuntimeError {
        RuntimeError::new(operator, format!("Unknown operator '{}'.", operator.lexeme))
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, fmt::Arguments, rc::Rc};

    use super::*;
    use crate::{parser::Parser, scanner::Scanner, syntax::token::Literal};

    struct MockOutput {
        logs: Rc<RefCell<Vec<String>>>,
    }
    impl MockOutput {
        fn new() -> MockOutput {
            MockOutput {
                logs: Rc::new(RefCell::new(vec![])),
            }
        }
    }
    impl Output for MockOutput {
        fn print(&mut self, value: Arguments) {
            self.logs.borrow_mut().push(value.to_string());
        }
    }

    fn mock_interpreter() -> (Interpreter, Rc<RefCell<Vec<String>>>) {
        let output = MockOutput::new();
        let logs = output.logs.clone();
        (Interpreter::with_output(Box::new(output)), logs)
    }

    fn parse(source: &str) -> Vec<Stmt> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "scan errors: {errors:?}");
        let (statements, errors) = Parser::new(&tokens).parse();
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        statements
    }

    fn run(source: &str) -> (Vec<String>, Result<(), RuntimeError>) {
        let (mut interpreter, logs) = mock_interpreter();
        let result = interpreter.interpret(&parse(source));
        let printed = logs.borrow().clone();
        (printed, result)
    }

    fn prints(source: &str) -> Vec<String> {
        let (printed, result) = run(source);
        assert_eq!(result, Ok(()));
        printed
    }

    fn fails(source: &str) -> RuntimeError {
        run(source).1.unwrap_err()
    }

    fn identifier(lexeme: &str, line: usize) -> Token {
        Token::new(TokenType::Identifier, lexeme, None, line)
    }

    #[test]
    fn variable_declaration_and_assignment() {
        let (mut interpreter, _) = mock_interpreter();
        let variable_token = identifier("x", 1);

        // declaration
        let var_stmt = Stmt::Var {
            name: variable_token.clone(),
            initializer: Some(Expr::literal(Literal::Number(10.0))),
        };
        assert!(interpreter.execute(&var_stmt).is_ok());

        let result = interpreter.environment.get(&variable_token);
        assert_eq!(result.unwrap().to_string(), "10");

        // assignment
        let assign_stmt = Stmt::Expression(Expr::Assign {
            name: variable_token.clone(),
            value: Box::new(Expr::literal(Literal::Number(20.5))),
        });
        assert!(interpreter.execute(&assign_stmt).is_ok());

        // check that variable got updated
        let result = interpreter.environment.get(&variable_token);
        assert_eq!(result.unwrap().to_string(), "20.5");
    }

    #[test]
    fn expression_evaluation() {
        let (mut interpreter, _) = mock_interpreter();

        let expr = Expr::binary(
            Expr::literal(Literal::Number(10.0)),
            Token::new(TokenType::Plus, "+", None, 1),
            Expr::literal(Literal::Number(5.0)),
        );

        let value = interpreter.evaluate(&expr).unwrap();
        assert_eq!(value.to_string(), "15");
    }

    #[test]
    fn block_shadowing() {
        assert_eq!(
            prints("var a = 1; { var a = 2; print a; } print a;"),
            vec!["2", "1"]
        );
    }

    #[test]
    fn variable_scoping() {
        let source = r#"
            var a = "global a";
            var b = "global b";
            var c = "global c";
            {
                var a = "outer a";
                var b = "outer b";
                {
                    var a = "inner a";
                    print a;
                    print b;
                    print c;
                }
                print a;
                print b;
                print c;
            }
            print a;
            print b;
            print c;
        "#;
        assert_eq!(
            prints(source),
            vec![
                "inner a", "outer b", "global c", "outer a", "outer b", "global c", "global a",
                "global b", "global c",
            ]
        );
    }

    #[test]
    fn assignment_in_block_updates_outer() {
        assert_eq!(prints("var a = 1; { a = 2; } print a;"), vec!["2"]);
    }

    #[test]
    fn assignment_to_undeclared_variable() {
        let error = fails("a = 5;");
        assert_eq!(error.message, "Undefined variable 'a'.");
        assert_eq!(error.token.lexeme, "a");

        assert_eq!(prints("var a; a = 5; print a;"), vec!["5"]);
    }

    #[test]
    fn uninitialized_variable_is_nil() {
        assert_eq!(prints("var a; print a;"), vec!["nil"]);
    }

    #[test]
    fn assignment_is_an_expression() {
        assert_eq!(
            prints("var a; var b; print a = b = 3; print a + b;"),
            vec!["3", "6"]
        );
    }

    #[test]
    fn comparison_and_equality() {
        assert_eq!(
            prints(r#"print 1 < 2; print "a" == "a"; print nil == false; print 1 != 1; print nil == nil;"#),
            vec!["true", "true", "false", "false", "true"]
        );
        assert_eq!(
            prints(r#"print 1 == "1"; print 2 >= 2; print 3 <= 2; print 3 > 2;"#),
            vec!["false", "true", "false", "true"]
        );
    }

    #[test]
    fn arithmetic() {
        assert_eq!(
            prints("print 1 + 3 * 2; print (1 + 3) * 2; print 7 / 2; print -(4 - 6);"),
            vec!["7", "8", "3.5", "2"]
        );
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(prints(r#"print "foo" + "bar";"#), vec!["foobar"]);
    }

    #[test]
    fn mixed_addition_is_an_error() {
        let error = fails(r#"print 1 + "a";"#);
        assert_eq!(error.message, "Operands must be two numbers or two strings.");
        assert_eq!(error.token.lexeme, "+");
    }

    #[test]
    fn arithmetic_requires_numbers() {
        assert_eq!(fails(r#"print "a" * 2;"#).message, "Operands must be numbers.");
        assert_eq!(fails("print true < 1;").message, "Operands must be numbers.");
        assert_eq!(fails(r#"print -"a";"#).message, "Operand must be a number.");
    }

    #[test]
    fn division_by_zero() {
        let error = fails("print 1 / 0;");
        assert_eq!(error.message, "Division by zero.");
    }

    #[test]
    fn truthiness_rules() {
        assert_eq!(
            prints(r#"print !nil; print !0; print !""; print !"x"; print !1; print !false;"#),
            vec!["true", "true", "true", "false", "false", "true"]
        );
        assert_eq!(
            prints(r#"if (0) print "yes"; else print "no"; if ("") print "yes"; else print "no";"#),
            vec!["no", "no"]
        );
    }

    #[test]
    fn if_without_else() {
        assert_eq!(prints("if (false) print 1; print 2;"), vec!["2"]);
    }

    #[test]
    fn while_loop() {
        assert_eq!(
            prints("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            vec!["0", "1", "2"]
        );
    }

    #[test]
    fn conditional_short_circuits() {
        assert_eq!(prints("print true ? 1 : (1/0);"), vec!["1"]);
        assert_eq!(prints("print false ? (1/0) : 2;"), vec!["2"]);
        assert_eq!(prints("print 0 ? 1 : 0 ? 2 : 3;"), vec!["3"]);
    }

    #[test]
    fn runtime_error_stops_execution() {
        let (printed, result) = run("print 1; print -nil; print 2;");
        assert_eq!(printed, vec!["1"]);
        let error = result.unwrap_err();
        assert_eq!(error.message, "Operand must be a number.");
        assert_eq!(error.token.line, 1);
    }

    #[test]
    fn scope_is_restored_after_error_in_block() {
        let (mut interpreter, logs) = mock_interpreter();
        let result = interpreter.interpret(&parse("var a = 1; { var a = 2; { print nope; } }"));
        assert!(result.is_err());
        assert_eq!(interpreter.environment.depth(), 1);

        interpreter.interpret(&parse("print a;")).unwrap();
        assert_eq!(*logs.borrow(), vec!["1"]);
    }

    #[test]
    fn globals_persist_between_calls() {
        let (mut interpreter, logs) = mock_interpreter();
        interpreter.interpret(&parse("var a = 41;")).unwrap();
        interpreter.interpret(&parse("a = a + 1; print a;")).unwrap();
        assert_eq!(*logs.borrow(), vec!["42"]);
    }
}
