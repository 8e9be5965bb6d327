use crate::syntax::{expr::Expr, stmt::Stmt};

/// Renders syntax trees as fully parenthesized prefix expressions.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Grouping { expression } => self.parenthesize("group", &[expression]),
            Expr::Unary { operator, right } => self.parenthesize(&operator.lexeme, &[right]),
            Expr::Literal { value } => value.to_string(),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[left, right]),
            Expr::Variable { name } => name.lexeme.clone(),
            Expr::Assign { name, value } => {
                self.parenthesize(&format!("= {}", name.lexeme), &[value])
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => self.parenthesize("?:", &[condition, then_branch, else_branch]),
        }
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => self.parenthesize(";", &[expr]),
            Stmt::Print(expr) => self.parenthesize("print", &[expr]),
            Stmt::Var { name, initializer } => match initializer {
                Some(initializer) => {
                    self.parenthesize(&format!("var {}", name.lexeme), &[initializer])
                }
                None => format!("(var {})", name.lexeme),
            },
            Stmt::Block(statements) => {
                let mut string = String::from("(block");
                for statement in statements {
                    string.push(' ');
                    string.push_str(&self.print_stmt(statement));
                }
                string.push(')');
                string
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut string = format!(
                    "(if {} {}",
                    self.print(condition),
                    self.print_stmt(then_branch)
                );
                if let Some(else_branch) = else_branch {
                    string.push(' ');
                    string.push_str(&self.print_stmt(else_branch));
                }
                string.push(')');
                string
            }
            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print(condition),
                self.print_stmt(body)
            ),
        }
    }

    fn parenthesize(&self, name: &str, exprs: &[&Expr]) -> String {
        let mut string = String::from("(");
        string.push_str(name);

        for expr in exprs {
            string.push(' ');
            string.push_str(&self.print(expr));
        }

        string.push(')');
        string
    }
}
