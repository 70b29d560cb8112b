use clap::{Args, ValueEnum};
use serde_json::Value;

use ohada_analysis_core::extraction::cell_map::{layout, statement_layout, StatementKind};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Statement {
    Assets,
    Liabilities,
    IncomeStatement,
    CashFlow,
}

impl From<Statement> for StatementKind {
    fn from(s: Statement) -> Self {
        match s {
            Statement::Assets => StatementKind::Assets,
            Statement::Liabilities => StatementKind::Liabilities,
            Statement::IncomeStatement => StatementKind::IncomeStatement,
            Statement::CashFlow => StatementKind::CashFlow,
        }
    }
}

/// Arguments for printing the template cell layout
#[derive(Args)]
pub struct LayoutArgs {
    /// Only this statement section
    #[arg(long)]
    pub statement: Option<Statement>,
}

pub fn run_layout(args: LayoutArgs) -> Result<Value, Box<dyn std::error::Error>> {
    match args.statement {
        Some(s) => Ok(serde_json::to_value(statement_layout(s.into()).rows)?),
        None => Ok(serde_json::to_value(layout())?),
    }
}
