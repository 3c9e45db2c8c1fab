#[macro_use]
extern crate log;

use ensemble::interpreter::{init_env, interpret, rep, ARGV};
use ensemble::printer::print_string;
use ensemble::vm::{Environment, GcShared, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env::args;
use std::process;

const PROMPT: &str = "user> ";

fn main() {
    env_logger::init();

    let environment = match init_env() {
        Ok(environment) => environment,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let mut arguments = args().skip(1);
    match arguments.next() {
        Some(file) => run_file(file, arguments.collect(), environment),
        None => run_repl(environment),
    }
}

fn run_file(file: String, script_args: Vec<String>, environment: GcShared<Environment>) {
    info!("loading {}", file);

    let argv = script_args.iter().map(|a| Value::string(a)).collect();
    environment.borrow_mut().set(ARGV.into(), Value::list(argv));

    let code = format!("(load-file {})", print_string(&Value::string(&file), true));
    if let Err(e) = interpret(&code, environment) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run_repl(environment: GcShared<Environment>) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(line.as_str()) {
            warn!("could not record history: {}", e);
        }

        match rep(&line, environment.clone()) {
            Ok(output) => println!("{}", output),
            Err(e) => println!("error: {}", e),
        }
    }
}
