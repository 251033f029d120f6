use log::info;
use std::{error::Error, fs, io::Read, process};

use ll1_table_parser::{Grammar, ParseTree};

fn print_help() {
    println!("Usage: ll1-table-parser outputs [options] [grammar file]");
    println!("outputs:");
    println!("  prod: Productions");
    println!("  nff: Nullable first and follow");
    println!("  ll1: LL(1) parsing table");
    println!("  tree: Parse trees of the -i inputs (LaTeX output uses qtree)");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
    println!("  -i INPUT: Parse INPUT with the grammar (repeatable)");
    println!("The grammar is read from stdin when no file is given.");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

#[derive(Debug)]
struct Options {
    outputs: Vec<String>,
    format: OutputFormat,
    inputs: Vec<String>,
    grammar_file: Option<String>,
}

const OUTPUTS: [&str; 4] = ["prod", "nff", "ll1", "tree"];

/// `None` when help should be printed instead of running.
fn parse_args(args: &[String]) -> Option<Options> {
    let mut options = Options {
        outputs: Vec::new(),
        format: OutputFormat::Plain,
        inputs: Vec::new(),
        grammar_file: None,
    };

    let mut i: usize = 0;
    while i < args.len() && OUTPUTS.contains(&args[i].as_str()) {
        options.outputs.push(args[i].clone());
        i += 1;
    }

    while i < args.len() && ["-h", "--help", "-l", "-j", "-i"].contains(&args[i].as_str()) {
        match args[i].as_str() {
            "-l" => options.format = OutputFormat::LaTeX,
            "-j" => options.format = OutputFormat::JSON,
            "-i" => {
                i += 1;
                options.inputs.push(args.get(i)?.clone());
            }
            _ => return None,
        }
        i += 1;
    }

    if i + 1 < args.len() || options.outputs.is_empty() {
        return None;
    }
    options.grammar_file = args.get(i).cloned();

    Some(options)
}

fn render_tree(tree: &ParseTree, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => tree.to_plaintext(),
        OutputFormat::LaTeX => tree.to_latex(),
        OutputFormat::JSON => tree.to_json(),
    }
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let input: String = match &options.grammar_file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let parser = Grammar::parse(&input)?.compile()?;
    info!("compiled grammar starting at {}", parser.start_symbol());

    for output in &options.outputs {
        match output.as_str() {
            "prod" => {
                let t = parser.grammar().to_production_output_vec();
                println!(
                    "{}",
                    match options.format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => t.to_json(),
                    }
                );
            }
            "nff" => {
                let t = parser.grammar().to_non_terminal_output_vec();
                println!(
                    "{}",
                    match options.format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => t.to_json(),
                    }
                );
            }
            "ll1" => {
                let t = parser.to_ll1_parsing_table();
                println!(
                    "{}",
                    match options.format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => serde_json::to_string(&parser.dump_transition_table())
                            .unwrap_or_default(),
                    }
                );
            }
            "tree" => {
                for input in &options.inputs {
                    let tree = parser.parse(input)?;
                    println!("{}", render_tree(&tree, options.format));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let options = match parse_args(&args) {
        Some(options) => options,
        None => {
            print_help();
            return;
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
