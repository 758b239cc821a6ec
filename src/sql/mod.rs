pub mod ast;
pub mod classify;
pub mod deparse;
pub mod lexer;
pub mod parser;
