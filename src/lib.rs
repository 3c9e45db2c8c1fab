//! An interpreter for Ensemble, a small Lisp with macros and tail calls
#[macro_use]
extern crate gc;
#[macro_use]
extern crate log;

#[macro_use]
mod helpers;

pub mod interpreter;
pub mod lexer;
pub mod printer;
pub mod reader;
pub mod vm;
