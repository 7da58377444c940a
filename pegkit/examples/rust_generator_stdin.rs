//! Reads a grammar from STDIN and prints the source of the Rust module parsing its language

use io::Read;
use pegkit::compiler::{compile, CompileOptions, Compiled};
use std::io;

fn main() {
    // Read the input grammar
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .unwrap_or_else(|err| panic!("Failed to read from STDIN: {}", err));

    // Compile the grammar to a module
    let compiled = compile(&buffer, &CompileOptions { module: true })
        .unwrap_or_else(|err| panic!("Failed to compile grammar: {}", err));

    match compiled {
        Compiled::Module(source) => println!("{}", source),
        Compiled::Grammar(grammar) => println!("{}", grammar),
    }
}
