use models_decode::decoder::decode;
use models_decode::graph::RelationGraph;
use models_decode::report::{render_relations, render_summary};
use models_decode::serializer::to_yaml;
use std::env;
use std::fs::{self, File};
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Summary,
    Relations,
    Yaml,
}

impl OutputFormat {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "summary" => Some(Self::Summary),
            "relations" => Some(Self::Relations),
            "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

struct Options {
    input_path: String,
    output_path: Option<String>,
    format: OutputFormat,
    models: Vec<String>,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <models.yml> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>   Output file (default: stdout)");
    eprintln!("  -f, --format <fmt>    Output format: summary, relations, yaml (default: summary)");
    eprintln!("  -m, --model <name>    Only list relations of this model (repeatable)");
    process::exit(1);
}

fn program_name(args: &[String]) -> &str {
    args.first().map_or("models-decode", String::as_str)
}

fn parse_args(args: &[String]) -> Options {
    let program = program_name(args);
    if args.len() < 2 {
        usage(program);
    }

    let mut options = Options {
        input_path: args[1].clone(),
        output_path: None,
        format: OutputFormat::Summary,
        models: Vec::new(),
    };

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let Some(value) = args.get(i) else {
            eprintln!("Missing value for {}", flag);
            usage(program);
        };
        match flag {
            "-o" | "--output" => options.output_path = Some(value.clone()),
            "-f" | "--format" => {
                options.format = OutputFormat::from_str(value).unwrap_or_else(|| {
                    eprintln!("Invalid format: {}", value);
                    process::exit(1);
                });
            }
            "-m" | "--model" => options.models.push(value.clone()),
            _ => {
                eprintln!("Unknown option: {}", flag);
                usage(program);
            }
        }
        i += 1;
    }

    options
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    let file = match File::open(&options.input_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to read {}: {}", options.input_path, e);
            process::exit(1);
        }
    };

    let schema = match decode(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", options.input_path, e);
            process::exit(1);
        }
    };

    let output = match options.format {
        OutputFormat::Summary => render_summary(&schema),
        OutputFormat::Relations => {
            let only: Vec<&str> = options.models.iter().map(String::as_str).collect();
            let filter = (!only.is_empty()).then_some(only.as_slice());
            render_relations(&RelationGraph::from_schema(&schema, filter))
        }
        OutputFormat::Yaml => match to_yaml(&schema) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to serialize: {}", e);
                process::exit(1);
            }
        },
    };

    match options.output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }
}
